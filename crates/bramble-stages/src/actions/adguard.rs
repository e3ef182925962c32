//! Filtering DNS stage
//!
//! Installs AdGuard Home as a system service. The artifact URL is resolved
//! from the project's release index at install time so a fresh node always
//! gets the current build; the download itself goes through curl like every
//! other file fetch.

use crate::context::StageContext;
use crate::error::{Result, StageError};
use crate::http::{latest_release, select_asset};
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

const RELEASE_INDEX_URL: &str =
    "https://api.github.com/repos/AdguardTeam/AdGuardHome/releases/latest";

/// Asset name fragment for 64-bit Pi OS builds
const ASSET_PATTERN: &str = "linux_arm64";

const DOWNLOAD_PATH: &str = "/tmp/adguardhome.tar.gz";
const INSTALL_PARENT: &str = "/opt";

pub struct AdguardStage;

#[async_trait]
impl StageAction for AdguardStage {
    fn name(&self) -> &str {
        "adguard"
    }

    fn description(&self) -> &str {
        "Install AdGuard Home as the filtering DNS service"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        let release = latest_release(ctx.http(), RELEASE_INDEX_URL).await?;
        let asset = select_asset(&release, ASSET_PATTERN).ok_or_else(|| {
            StageError::AssetNotFound {
                release: release.tag_name.clone(),
                pattern: ASSET_PATTERN.to_string(),
            }
        })?;

        info!(tag = %release.tag_name, asset = %asset.name, "downloading release artifact");
        ctx.run_checked(
            "curl",
            &[
                "-sfL",
                "--connect-timeout",
                "30",
                "--retry",
                "3",
                "-o",
                DOWNLOAD_PATH,
                &asset.browser_download_url,
            ],
        )
        .await?;

        ctx.run_root("tar", &["-C", INSTALL_PARENT, "-xzf", DOWNLOAD_PATH]).await?;

        info!("registering AdGuard Home service");
        ctx.run_root("/opt/AdGuardHome/AdGuardHome", &["-s", "install"]).await?;

        println!();
        println!("AdGuard Home is running. Finish the setup by hand:");
        println!("  1. Open http://<this-host>:3000 and walk through the wizard");
        println!("  2. Bind the DNS listener to port 53");
        println!("  3. Point your router's DHCP at this host as the DNS server");
        println!();

        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The release-index query and download need a network; what is worth
    // pinning here is the asset selection contract, covered in http.rs.
    // This test keeps the constants honest.
    #[test]
    fn test_platform_pattern_matches_published_naming() {
        assert!(RELEASE_INDEX_URL.contains("AdGuardHome"));
        assert!("AdGuardHome_linux_arm64.tar.gz".contains(ASSET_PATTERN));
    }
}
