//! Mesh VPN join stage
//!
//! Installs the Tailscale client and joins the tailnet with an auth key
//! the operator supplies interactively. The key is prompted for before any
//! side effect so an empty key aborts cleanly and the stage can simply be
//! re-run. On success, kernel forwarding is enabled so the node can later
//! advertise routes or act as an exit node.

use crate::context::StageContext;
use crate::error::{Result, StageError};
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

const INSTALL_SCRIPT_URL: &str = "https://tailscale.com/install.sh";

/// Where the forwarding settings are persisted
const SYSCTL_DROPIN: &str = "/etc/sysctl.d/99-tailscale.conf";

pub struct TailscaleStage;

#[async_trait]
impl StageAction for TailscaleStage {
    fn name(&self) -> &str {
        "tailscale"
    }

    fn description(&self) -> &str {
        "Join the Tailscale mesh VPN"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        let auth_key =
            ctx.prompt_line("Tailscale auth key (from the admin console, tskey-...): ")?;
        if auth_key.is_empty() {
            return Err(StageError::MissingInput {
                what: "Tailscale auth key".to_string(),
                remediation: Some(
                    "generate a key under Settings > Keys in the Tailscale admin console, \
                     then re-run this stage"
                        .to_string(),
                ),
            });
        }

        info!(url = INSTALL_SCRIPT_URL, "installing Tailscale client");
        ctx.shell(&format!("curl -fsSL {} | sh", INSTALL_SCRIPT_URL)).await?;

        info!("joining tailnet");
        ctx.run_root("tailscale", &["up", "--authkey", &auth_key]).await?;

        // Subnet routing and exit-node use need forwarding enabled
        ctx.shell_root(&format!(
            "printf 'net.ipv4.ip_forward = 1\\nnet.ipv6.conf.all.forwarding = 1\\n' > {dropin} \
             && sysctl -p {dropin}",
            dropin = SYSCTL_DROPIN
        ))
        .await?;

        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::CannedPrompter;
    use crate::runner::ScriptedRunner;
    use std::sync::Arc;

    fn context(runner: Arc<ScriptedRunner>, answers: &[&str]) -> StageContext {
        StageContext::new("pi", "/home/pi")
            .with_runner(runner)
            .with_prompter(Arc::new(CannedPrompter::new(answers)))
    }

    #[tokio::test]
    async fn test_empty_auth_key_fails_without_side_effects() {
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = context(runner.clone(), &[""]);

        let err = TailscaleStage.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, StageError::MissingInput { .. }));
        assert!(err.remediation().is_some());
        // Nothing may have run: the key is collected before any install
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_joins_and_enables_forwarding() {
        let runner = Arc::new(ScriptedRunner::new());
        let ctx = context(runner.clone(), &["tskey-auth-abc123"]);

        let outcome = TailscaleStage.execute(&ctx).await.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert!(runner.ran("curl -fsSL https://tailscale.com/install.sh | sh"));
        assert!(runner.ran("sudo tailscale up --authkey tskey-auth-abc123"));
        assert!(runner.ran("net.ipv4.ip_forward"));
    }
}
