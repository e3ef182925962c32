//! Bootloader EEPROM update stage
//!
//! Brings the Pi's boot EEPROM to the latest release channel version. The
//! new image is staged and only applied by the firmware on the next boot,
//! hence the reboot request.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

pub struct RpiEepromStage;

#[async_trait]
impl StageAction for RpiEepromStage {
    fn name(&self) -> &str {
        "rpi-eeprom"
    }

    fn description(&self) -> &str {
        "Update the bootloader EEPROM to the latest release"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        // The updater ships with the OS image but may have been trimmed
        // from lite spins; installing an already-present package is a no-op.
        ctx.run_root("apt-get", &["install", "-y", "rpi-eeprom"]).await?;

        info!("staging EEPROM update");
        let output = ctx.run_root("rpi-eeprom-update", &["-a"]).await?;
        if !output.stdout.trim().is_empty() {
            info!(report = %output.stdout.trim(), "rpi-eeprom-update");
        }

        Ok(Outcome::NeedsReboot)
    }
}
