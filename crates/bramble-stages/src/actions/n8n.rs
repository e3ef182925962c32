//! Workflow automation platform stage
//!
//! Launches n8n in a container with a persistent volume and waits for its
//! health endpoint. The poll is bounded: 30 one-second probes, then the
//! stage fails naming the container to inspect. Re-running replaces the
//! container but keeps the volume, so nothing is lost.

use crate::context::StageContext;
use crate::error::{Result, StageError};
use crate::http::wait_for_healthy;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

pub const CONTAINER_NAME: &str = "n8n";
const VOLUME_NAME: &str = "n8n_data";
const IMAGE: &str = "docker.n8n.io/n8nio/n8n";

const HEALTH_URL: &str = "http://127.0.0.1:5678/healthz";
const HEALTH_ATTEMPTS: u32 = 30;
const HEALTH_INTERVAL: Duration = Duration::from_secs(1);

pub struct N8nStage {
    health_attempts: u32,
    health_interval: Duration,
}

impl Default for N8nStage {
    fn default() -> Self {
        Self {
            health_attempts: HEALTH_ATTEMPTS,
            health_interval: HEALTH_INTERVAL,
        }
    }
}

impl N8nStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the health-poll budget (tests use a tiny one).
    pub fn with_health_budget(mut self, attempts: u32, interval: Duration) -> Self {
        self.health_attempts = attempts;
        self.health_interval = interval;
        self
    }
}

#[async_trait]
impl StageAction for N8nStage {
    fn name(&self) -> &str {
        "n8n"
    }

    fn description(&self) -> &str {
        "Install the n8n workflow automation platform"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        ctx.run_checked("docker", &["volume", "create", VOLUME_NAME]).await?;
        ctx.run_best_effort("docker", &["rm", "-f", CONTAINER_NAME]).await;

        let tz_generic = format!("GENERIC_TIMEZONE={}", ctx.timezone());
        let tz = format!("TZ={}", ctx.timezone());

        info!(image = IMAGE, timezone = %ctx.timezone(), "launching container");
        ctx.run_checked(
            "docker",
            &[
                "run",
                "-d",
                "--name",
                CONTAINER_NAME,
                "--restart=always",
                "-p",
                "5678:5678",
                "-e",
                &tz_generic,
                "-e",
                &tz,
                // Plain-HTTP LAN access; cookies cannot be Secure
                "-e",
                "N8N_SECURE_COOKIE=false",
                "-e",
                "N8N_RUNNERS_ENABLED=true",
                // Imports may only read from the data volume
                "-e",
                "N8N_RESTRICT_FILE_ACCESS_TO=/home/node/.n8n",
                "-v",
                "n8n_data:/home/node/.n8n",
                IMAGE,
            ],
        )
        .await?;

        info!(url = HEALTH_URL, "waiting for the service to come up");
        let healthy = wait_for_healthy(
            ctx.http(),
            HEALTH_URL,
            self.health_attempts,
            self.health_interval,
        )
        .await;

        if !healthy {
            return Err(StageError::NeverHealthy {
                service: CONTAINER_NAME.to_string(),
                attempts: self.health_attempts,
                remediation: Some(format!(
                    "inspect the container with `docker logs {}` and re-run this stage",
                    CONTAINER_NAME
                )),
            });
        }

        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_launch_failure_fails_before_health_poll() {
        let runner = Arc::new(ScriptedRunner::new().with_failure("docker run"));
        let ctx = StageContext::new("pi", "/home/pi").with_runner(runner.clone());

        let err = N8nStage::new().execute(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("docker run"));
        assert!(runner.ran("docker volume create n8n_data"));
    }

    #[tokio::test]
    async fn test_bounded_poll_fails_when_never_healthy() {
        // The scripted launch "succeeds" but nothing listens on the health
        // port, so every probe is refused and the bounded poll gives up.
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = StageContext::new("pi", "/home/pi")
            .with_runner(runner.clone())
            .with_timezone("Europe/Berlin");

        let stage = N8nStage::new().with_health_budget(2, Duration::from_millis(5));
        let err = stage.execute(&ctx).await.unwrap_err();

        assert!(matches!(err, StageError::NeverHealthy { attempts: 2, .. }));
        assert!(err.remediation().unwrap().contains("docker logs n8n"));
        assert!(runner.ran("GENERIC_TIMEZONE=Europe/Berlin"));
        assert!(runner.ran("N8N_RESTRICT_FILE_ACCESS_TO=/home/node/.n8n"));
    }
}
