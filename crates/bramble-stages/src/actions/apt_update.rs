//! Operating system update stage
//!
//! Full apt synchronization: refresh indexes, upgrade everything, drop
//! packages nothing depends on anymore. A fresh image is usually weeks
//! behind the archive, so this stage asks for a reboot to pick up the new
//! kernel and firmware.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

pub struct AptUpdateStage;

#[async_trait]
impl StageAction for AptUpdateStage {
    fn name(&self) -> &str {
        "apt-update"
    }

    fn description(&self) -> &str {
        "Update and upgrade all operating system packages"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        info!("refreshing package indexes");
        ctx.run_root("apt-get", &["update"]).await?;

        info!("upgrading installed packages (this can take a while)");
        ctx.run_root("apt-get", &["full-upgrade", "-y"]).await?;

        ctx.run_root("apt-get", &["autoremove", "--purge", "-y"]).await?;

        Ok(Outcome::NeedsReboot)
    }
}
