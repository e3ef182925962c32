//! Case fan and power-button driver stage
//!
//! The Argon ONE case needs the vendor's setup script for fan-curve and
//! power-button support. The script is fetched over HTTPS and piped to a
//! shell, exactly as the vendor documents; it loads a kernel overlay, so a
//! reboot follows.

use crate::context::StageContext;
use crate::error::Result;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

/// Vendor setup script, as documented on the product page
const VENDOR_SCRIPT_URL: &str = "https://download.argon40.com/argon1.sh";

pub struct ArgonFanStage;

#[async_trait]
impl StageAction for ArgonFanStage {
    fn name(&self) -> &str {
        "argon-fan"
    }

    fn description(&self) -> &str {
        "Install the case fan and power-button driver"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        info!(url = VENDOR_SCRIPT_URL, "running vendor setup script");
        ctx.shell(&format!("curl -sfL {} | sh", VENDOR_SCRIPT_URL)).await?;

        Ok(Outcome::NeedsReboot)
    }
}
