//! Container management UI stage
//!
//! Launches Portainer as a long-running container. The readiness gate
//! checks that the invoking account can talk to the docker socket without
//! elevation — the proof that the re-login after the runtime install
//! actually happened.

use crate::context::StageContext;
use crate::error::{Result, StageError};
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

const CONTAINER_NAME: &str = "portainer";
const VOLUME_NAME: &str = "portainer_data";
const IMAGE: &str = "portainer/portainer-ce:latest";

pub struct PortainerStage;

#[async_trait]
impl StageAction for PortainerStage {
    fn name(&self) -> &str {
        "portainer"
    }

    fn description(&self) -> &str {
        "Install the Portainer container management UI"
    }

    async fn readiness(&self, ctx: &StageContext) -> Result<()> {
        // Deliberately not under sudo: this must work as the plain account
        let output = ctx.run("docker", &["ps"]).await?;
        if !output.success() {
            return Err(StageError::NotReady {
                reason: "this account cannot list containers without elevated privileges"
                    .to_string(),
                remediation: Some(
                    "log out and back in (new SSH session) so the docker group membership \
                     takes effect, then re-run"
                        .to_string(),
                ),
            });
        }
        Ok(())
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        ctx.run_checked("docker", &["volume", "create", VOLUME_NAME]).await?;

        // A leftover container from an interrupted run would block the name
        ctx.run_best_effort("docker", &["rm", "-f", CONTAINER_NAME]).await;

        info!(image = IMAGE, "launching container");
        ctx.run_checked(
            "docker",
            &[
                "run",
                "-d",
                "--name",
                CONTAINER_NAME,
                "--restart=always",
                "-p",
                "8000:8000",
                "-p",
                "9443:9443",
                "-v",
                "/var/run/docker.sock:/var/run/docker.sock",
                "-v",
                "portainer_data:/data",
                IMAGE,
            ],
        )
        .await?;

        println!();
        println!("Portainer is up. Create the admin account within a few minutes at");
        println!("https://<this-host>:9443 (the first-run token expires).");
        println!();

        Ok(Outcome::Success)
    }
}
