//! Disk-clone tooling and final report stage
//!
//! Installs rpi-clone from its repository, looks for a secondary disk to
//! clone onto, and prints the consolidated summary of everything the
//! pipeline set up. This is the terminal stage: after it the sequencer
//! clears its saved position entirely.

use crate::context::StageContext;
use crate::error::Result;
use crate::net::local_ip;
use crate::traits::{Outcome, StageAction};
use async_trait::async_trait;
use tracing::info;

const REPO_URL: &str = "https://github.com/geerlingguy/rpi-clone.git";

/// Checkout directory name under the operator's home
const CHECKOUT_DIR: &str = "rpi-clone";

const BIN_DIR: &str = "/usr/local/bin";

pub struct RpiCloneStage;

#[async_trait]
impl StageAction for RpiCloneStage {
    fn name(&self) -> &str {
        "rpi-clone"
    }

    fn description(&self) -> &str {
        "Install disk-clone tooling and print the final report"
    }

    async fn execute(&self, ctx: &StageContext) -> Result<Outcome> {
        let checkout = ctx.home_dir().join(CHECKOUT_DIR);
        let checkout_str = checkout.to_string_lossy();

        if checkout.join(".git").exists() {
            ctx.run_checked("git", &["-C", &checkout_str, "pull"]).await?;
        } else {
            info!(url = REPO_URL, "cloning clone-tool repository");
            ctx.run_checked("git", &["clone", REPO_URL, &checkout_str]).await?;
        }

        let script = format!("{}/rpi-clone", checkout_str);
        let setup_script = format!("{}/rpi-clone-setup", checkout_str);
        ctx.run_root("install", &["-m", "0755", &script, &setup_script, BIN_DIR])
            .await?;

        let devices = ctx.run_checked("lsblk", &["-ndo", "NAME"]).await?;
        match first_clone_target(&devices.stdout) {
            Some(device) => {
                println!();
                println!("Secondary disk detected: /dev/{}", device);
                println!("Clone the running system onto it with: sudo rpi-clone {}", device);
            }
            None => {
                println!();
                println!("No secondary disk detected. Attach a USB SSD and run: sudo rpi-clone sda");
            }
        }

        println!("{}", render_summary(local_ip().as_deref()));

        Ok(Outcome::Success)
    }
}

/// Pick the first whole disk that looks like an attached USB drive
/// (sda, sdb, ...) from `lsblk -ndo NAME` output.
fn first_clone_target(lsblk_output: &str) -> Option<String> {
    lsblk_output
        .lines()
        .map(str::trim)
        .find(|name| {
            name.len() == 3
                && name.starts_with("sd")
                && name.ends_with(|c: char| c.is_ascii_lowercase())
        })
        .map(str::to_string)
}

/// Consolidated endpoint summary printed once at the end of the pipeline.
fn render_summary(ip: Option<&str>) -> String {
    let host = ip.unwrap_or("<this-host>");
    let mut out = String::new();
    out.push('\n');
    out.push_str("Provisioning complete. Installed endpoints:\n");
    out.push_str(&format!("  AdGuard Home   http://{}:3000  (setup wizard)\n", host));
    out.push_str(&format!("  Portainer      https://{}:9443\n", host));
    out.push_str(&format!("  n8n            http://{}:5678\n", host));
    out.push_str("  rpi-clone      /usr/local/bin/rpi-clone\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{CommandOutput, ScriptedRunner};
    use std::sync::Arc;

    #[test]
    fn test_first_clone_target_picks_usb_disk() {
        let out = "mmcblk0\nsda\nsdb\n";
        assert_eq!(first_clone_target(out).as_deref(), Some("sda"));
    }

    #[test]
    fn test_first_clone_target_ignores_sd_card_and_partitions() {
        // mmcblk0 is the boot SD card; sda1 is a partition, not a disk
        assert_eq!(first_clone_target("mmcblk0\nmmcblk0p1\nsda1\n"), None);
        assert_eq!(first_clone_target(""), None);
    }

    #[test]
    fn test_render_summary_names_all_endpoints() {
        let summary = render_summary(Some("192.168.1.50"));
        assert!(summary.contains("http://192.168.1.50:3000"));
        assert!(summary.contains("https://192.168.1.50:9443"));
        assert!(summary.contains("http://192.168.1.50:5678"));

        let summary = render_summary(None);
        assert!(summary.contains("<this-host>"));
    }

    #[tokio::test]
    async fn test_installs_scripts_and_scans_disks() {
        let home = tempfile::tempdir().unwrap();
        let runner = Arc::new(
            ScriptedRunner::new().with_output("lsblk", CommandOutput::ok("mmcblk0\nsda\n")),
        );
        let ctx = StageContext::new("pi", home.path()).with_runner(runner.clone());

        let outcome = RpiCloneStage.execute(&ctx).await.unwrap();
        assert_eq!(outcome, Outcome::Success);
        assert!(runner.ran("git clone https://github.com/geerlingguy/rpi-clone.git"));
        assert!(runner.ran("sudo install -m 0755"));
        assert!(runner.ran("lsblk -ndo NAME"));
    }
}
