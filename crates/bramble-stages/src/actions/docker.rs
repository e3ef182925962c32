//! Container runtime stage
//!
//! Installs Docker Engine from the vendor's apt repository: clear out the
//! distro's conflicting packages (absence is fine), trust the signing key,
//! add the repo, install, and put the invoking account in the docker group.
//! Group membership only applies to new login sessions, so this stage
//! always ends in a re-auth request — the sequencer exits instead of
//! rebooting so the operator starts a fresh session.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

/// Distro packages that conflict with the vendor engine
const CONFLICTING_PACKAGES: &[&str] = &[
    "docker.io",
    "docker-doc",
    "docker-compose",
    "podman-docker",
    "containerd",
    "runc",
];

const ENGINE_PACKAGES: &[&str] = &[
    "docker-ce",
    "docker-ce-cli",
    "containerd.io",
    "docker-buildx-plugin",
    "docker-compose-plugin",
];

pub struct DockerStage;

#[async_trait]
impl StageAction for DockerStage {
    fn name(&self) -> &str {
        "docker"
    }

    fn description(&self) -> &str {
        "Install the Docker container runtime"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        info!("removing conflicting distro packages");
        for &pkg in CONFLICTING_PACKAGES {
            ctx.run_root_best_effort("apt-get", &["remove", "-y", pkg]).await;
        }

        info!("adding vendor package source");
        ctx.shell_root(
            "install -m 0755 -d /etc/apt/keyrings \
             && curl -fsSL https://download.docker.com/linux/debian/gpg \
                -o /etc/apt/keyrings/docker.asc \
             && chmod a+r /etc/apt/keyrings/docker.asc \
             && echo \"deb [arch=$(dpkg --print-architecture) \
                signed-by=/etc/apt/keyrings/docker.asc] \
                https://download.docker.com/linux/debian \
                $(. /etc/os-release && echo $VERSION_CODENAME) stable\" \
                > /etc/apt/sources.list.d/docker.list",
        )
        .await?;

        ctx.run_root("apt-get", &["update"]).await?;

        info!("installing engine packages");
        let mut install_args = vec!["install", "-y"];
        install_args.extend_from_slice(ENGINE_PACKAGES);
        ctx.run_root("apt-get", &install_args).await?;

        info!(user = %ctx.username(), "granting docker socket access");
        ctx.run_root("usermod", &["-aG", "docker", ctx.username()]).await?;

        // Smoke test under sudo; the group grant is not live in this session
        ctx.run_root("docker", &["run", "--rm", "hello-world"]).await?;

        println!();
        println!("Docker is installed. Your account was added to the docker group,");
        println!("which only takes effect in a new login session.");
        println!();

        Ok(Outcome::NeedsReauth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ScriptedRunner;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_always_ends_in_reauth() {
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = StageContext::new("pi", "/home/pi").with_runner(runner.clone());

        let outcome = DockerStage.execute(&ctx).await.unwrap();
        assert_eq!(outcome, Outcome::NeedsReauth);
        assert!(runner.ran("sudo usermod -aG docker pi"));
        assert!(runner.ran("sudo docker run --rm hello-world"));
    }

    #[tokio::test]
    async fn test_conflicting_package_removal_is_best_effort() {
        // A missing distro package must not fail the stage
        let runner = Arc::new(ScriptedRunner::new().with_failure("remove -y podman-docker"));
        let ctx = StageContext::new("pi", "/home/pi").with_runner(runner.clone());

        let outcome = DockerStage.execute(&ctx).await.unwrap();
        assert_eq!(outcome, Outcome::NeedsReauth);
        assert!(runner.ran("sudo apt-get remove -y podman-docker"));
    }

    #[tokio::test]
    async fn test_smoke_test_failure_fails_stage() {
        let runner = Arc::new(ScriptedRunner::new().with_failure("hello-world"));
        let ctx = StageContext::new("pi", "/home/pi").with_runner(runner);

        assert!(DockerStage.execute(&ctx).await.is_err());
    }
}
