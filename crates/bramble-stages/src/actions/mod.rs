//! Stage action implementations
//!
//! One module per provisioning stage, in pipeline order. Each is an opaque
//! unit of work behind the [`StageAction`](crate::traits::StageAction)
//! trait; the sequencer decides ordering and what happens after success.
//!
//! # Stages
//!
//! - `apt_update` - operating system package synchronization
//! - `rpi_eeprom` - bootloader EEPROM update
//! - `argon_fan` - case fan / power-button vendor script
//! - `boot_order` - USB-first boot order
//! - `tailscale` - mesh VPN join
//! - `adguard` - filtering DNS service
//! - `docker` - container runtime
//! - `portainer` - container management UI
//! - `n8n` - workflow automation platform
//! - `n8n_import` - workflow import into the platform
//! - `workflows_repo` - host-side repository mirror
//! - `rpi_clone` - disk-clone tooling and final report

mod adguard;
mod apt_update;
mod argon_fan;
mod boot_order;
mod docker;
mod n8n;
mod n8n_import;
mod portainer;
mod rpi_clone;
mod rpi_eeprom;
mod tailscale;
mod workflows_repo;

pub use adguard::AdguardStage;
pub use apt_update::AptUpdateStage;
pub use argon_fan::ArgonFanStage;
pub use boot_order::BootOrderStage;
pub use docker::DockerStage;
pub use n8n::N8nStage;
pub use n8n_import::N8nImportStage;
pub use portainer::PortainerStage;
pub use rpi_clone::RpiCloneStage;
pub use rpi_eeprom::RpiEepromStage;
pub use tailscale::TailscaleStage;
pub use workflows_repo::WorkflowsRepoStage;
