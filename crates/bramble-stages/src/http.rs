//! Release-index queries and bounded health polling

use crate::error::Result;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout for API queries
const API_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-attempt timeout for health probes
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// One release from a GitHub-style release index
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// A downloadable artifact attached to a release
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Fetch the latest release from a release-index endpoint.
pub async fn latest_release(client: &reqwest::Client, url: &str) -> Result<Release> {
    let release = client
        .get(url)
        // GitHub's API rejects requests without a User-Agent
        .header(reqwest::header::USER_AGENT, "bramble")
        .timeout(API_TIMEOUT)
        .send()
        .await?
        .error_for_status()?
        .json::<Release>()
        .await?;

    debug!(tag = %release.tag_name, assets = release.assets.len(), "fetched release index");
    Ok(release)
}

/// Pick the first asset whose name contains `pattern`.
pub fn select_asset<'a>(release: &'a Release, pattern: &str) -> Option<&'a ReleaseAsset> {
    release.assets.iter().find(|a| a.name.contains(pattern))
}

/// Poll a health endpoint until it answers 2xx, up to `attempts` probes
/// spaced `interval` apart. Returns whether the service came up.
pub async fn wait_for_healthy(
    client: &reqwest::Client,
    url: &str,
    attempts: u32,
    interval: Duration,
) -> bool {
    for attempt in 1..=attempts {
        match client.get(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(url, attempt, "health endpoint answered");
                return true;
            }
            Ok(response) => {
                debug!(url, attempt, status = %response.status(), "health endpoint not ready");
            }
            Err(e) => {
                debug!(url, attempt, error = %e, "health endpoint unreachable");
            }
        }

        if attempt < attempts {
            tokio::time::sleep(interval).await;
        }
    }
    false
}
