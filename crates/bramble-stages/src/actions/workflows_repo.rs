//! Host-side repository mirror stage
//!
//! Keeps a working copy of the shared workflow collection on the host
//! itself, next to the operator's own edits. Clone-or-pull, so re-running
//! is always safe.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

const REPO_URL: &str = "https://github.com/bramble-homelab/workflows.git";

/// Checkout directory name under the operator's home
const CHECKOUT_DIR: &str = "workflows";

pub struct WorkflowsRepoStage;

#[async_trait]
impl StageAction for WorkflowsRepoStage {
    fn name(&self) -> &str {
        "workflows-repo"
    }

    fn description(&self) -> &str {
        "Mirror the workflow repository onto the host"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        let dest = ctx.home_dir().join(CHECKOUT_DIR);
        let dest_str = dest.to_string_lossy();

        if dest.join(".git").exists() {
            info!(dir = %dest_str, "updating existing checkout");
            ctx.run_checked("git", &["-C", &dest_str, "pull"]).await?;
        } else {
            info!(url = REPO_URL, dir = %dest_str, "cloning");
            ctx.run_checked("git", &["clone", REPO_URL, &dest_str]).await?;
        }

        Ok(Outcome::Success)
    }
}
