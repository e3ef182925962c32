//! Stage catalog
//!
//! The ordered, fixed pipeline: which stages exist, in what order, and
//! what happens to the saved position and the process after each one
//! succeeds. Built once at startup and never mutated.

use bramble_stages::actions::{
    AdguardStage, AptUpdateStage, ArgonFanStage, BootOrderStage, DockerStage, N8nImportStage,
    N8nStage, PortainerStage, RpiCloneStage, RpiEepromStage, TailscaleStage, WorkflowsRepoStage,
};
use bramble_stages::StageAction;
use std::sync::Arc;

/// What happens after a stage succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancePolicy {
    /// Persist the next position, then reboot the machine.
    Reboot,
    /// Persist the next position, then exit; the operator must start a new
    /// login session before continuing.
    Relogin,
    /// Persist the next position, then exit normally; the operator re-runs
    /// to continue.
    Continue,
    /// The pipeline is complete: clear the saved position entirely.
    Finish,
}

/// One stage in the pipeline
pub struct StageDescriptor {
    pub index: usize,
    /// Human-readable label, display-only
    pub name: &'static str,
    pub action: Arc<dyn StageAction>,
    pub advance: AdvancePolicy,
}

/// The ordered pipeline of stages
pub struct StageCatalog {
    stages: Vec<StageDescriptor>,
}

impl StageCatalog {
    /// The standard provisioning pipeline for a fresh node.
    pub fn standard() -> Self {
        let mut catalog = Self { stages: Vec::new() };
        catalog.push("Operating system update", Arc::new(AptUpdateStage), AdvancePolicy::Reboot);
        catalog.push("Bootloader EEPROM update", Arc::new(RpiEepromStage), AdvancePolicy::Reboot);
        catalog.push("Case fan driver", Arc::new(ArgonFanStage), AdvancePolicy::Reboot);
        catalog.push("USB-first boot order", Arc::new(BootOrderStage), AdvancePolicy::Reboot);
        catalog.push("Tailscale mesh VPN join", Arc::new(TailscaleStage), AdvancePolicy::Continue);
        catalog.push("AdGuard Home DNS filter", Arc::new(AdguardStage), AdvancePolicy::Continue);
        catalog.push("Docker container runtime", Arc::new(DockerStage), AdvancePolicy::Relogin);
        catalog.push("Portainer management UI", Arc::new(PortainerStage), AdvancePolicy::Continue);
        catalog.push("n8n workflow platform", Arc::new(N8nStage::new()), AdvancePolicy::Continue);
        catalog.push("n8n workflow import", Arc::new(N8nImportStage), AdvancePolicy::Continue);
        catalog.push("Workflow repository mirror", Arc::new(WorkflowsRepoStage), AdvancePolicy::Continue);
        catalog.push("Disk-clone tooling & report", Arc::new(RpiCloneStage), AdvancePolicy::Finish);
        catalog
    }

    /// Build a catalog from (name, action, policy) rows; indices are
    /// assigned densely in order. Used directly by tests.
    pub fn from_rows(
        rows: Vec<(&'static str, Arc<dyn StageAction>, AdvancePolicy)>,
    ) -> Self {
        let mut catalog = Self { stages: Vec::new() };
        for (name, action, advance) in rows {
            catalog.push(name, action, advance);
        }
        catalog
    }

    fn push(&mut self, name: &'static str, action: Arc<dyn StageAction>, advance: AdvancePolicy) {
        let index = self.stages.len();
        self.stages.push(StageDescriptor {
            index,
            name,
            action,
            advance,
        });
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Bounds-checked lookup, for validating operator selections.
    pub fn get(&self, index: usize) -> Option<&StageDescriptor> {
        self.stages.get(index)
    }

    /// Direct lookup. Out-of-range is a programming error and panics;
    /// user-facing paths validate through [`get`](Self::get) first.
    pub fn describe(&self, index: usize) -> &StageDescriptor {
        &self.stages[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &StageDescriptor> {
        self.stages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bramble_stages::{Outcome, StaticStage};

    #[test]
    fn test_standard_catalog_has_twelve_dense_stages() {
        let catalog = StageCatalog::standard();
        assert_eq!(catalog.len(), 12);
        for (expected, descriptor) in catalog.iter().enumerate() {
            assert_eq!(descriptor.index, expected);
            assert!(!descriptor.name.is_empty());
        }
    }

    #[test]
    fn test_standard_catalog_policies() {
        let catalog = StageCatalog::standard();
        // Early firmware/OS stages reboot into their changes
        assert_eq!(catalog.describe(0).advance, AdvancePolicy::Reboot);
        assert_eq!(catalog.describe(3).advance, AdvancePolicy::Reboot);
        // The runtime install needs a fresh login session, not a reboot
        assert_eq!(catalog.describe(6).advance, AdvancePolicy::Relogin);
        // Only the last stage finishes the pipeline
        assert_eq!(catalog.describe(11).advance, AdvancePolicy::Finish);
        assert!(catalog
            .iter()
            .take(11)
            .all(|d| d.advance != AdvancePolicy::Finish));
    }

    #[test]
    fn test_get_is_bounds_checked() {
        let catalog = StageCatalog::standard();
        assert!(catalog.get(11).is_some());
        assert!(catalog.get(12).is_none());
    }

    #[test]
    fn test_from_rows_assigns_dense_indices() {
        let catalog = StageCatalog::from_rows(vec![
            ("one", Arc::new(StaticStage::new("one", Outcome::Success)), AdvancePolicy::Continue),
            ("two", Arc::new(StaticStage::new("two", Outcome::Success)), AdvancePolicy::Finish),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.describe(1).index, 1);
    }
}
