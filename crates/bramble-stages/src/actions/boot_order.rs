//! Boot-order configuration stage
//!
//! Sets the firmware to try USB mass storage before the SD card, so a
//! cloned SSD can take over without reflashing. `B2` is the nonint code
//! for USB-first with SD fallback.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;

pub struct BootOrderStage;

#[async_trait]
impl StageAction for BootOrderStage {
    fn name(&self) -> &str {
        "boot-order"
    }

    fn description(&self) -> &str {
        "Configure USB-first boot order"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        ctx.run_root("raspi-config", &["nonint", "do_boot_order", "B2"])
            .await?;

        Ok(Outcome::NeedsReboot)
    }
}
