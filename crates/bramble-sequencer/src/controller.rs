//! Run controller
//!
//! One invocation runs exactly one stage: validate the selection, check
//! the stage's readiness gate, execute, then move the saved position
//! according to the stage's advance policy. Failures leave the position
//! untouched so a re-run resumes at the same stage. The controller never
//! reboots or exits itself; it returns an explicit [`RunOutcome`] and the
//! binary acts on it.

use crate::catalog::{AdvancePolicy, StageCatalog};
use crate::cursor::CursorStore;
use crate::error::{Result, SequencerError};
use bramble_stages::{Outcome, StageContext};
use tracing::info;

/// What the invocation should do after a stage succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Reboot the machine; the saved position already points at `next`.
    RebootRequired { next: usize },
    /// Exit so the operator can start a new login session.
    ReloginRequired { next: usize },
    /// Exit normally; re-run to continue with `next`.
    Paused { next: usize },
    /// Final stage done; all saved state is cleared.
    Complete,
}

/// Drives one stage per invocation against the catalog and the store
pub struct Sequencer {
    catalog: StageCatalog,
    store: Box<dyn CursorStore>,
}

impl Sequencer {
    pub fn new(catalog: StageCatalog, store: Box<dyn CursorStore>) -> Self {
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &StageCatalog {
        &self.catalog
    }

    /// The saved position (0 when nothing is saved).
    pub fn cursor(&self) -> Result<usize> {
        self.store.load()
    }

    /// Run the selected stage and apply its advance policy.
    pub async fn run_stage(&self, selection: usize, ctx: &StageContext) -> Result<RunOutcome> {
        let descriptor = self.catalog.get(selection).ok_or_else(|| {
            SequencerError::InvalidSelection {
                selected: selection,
                max: self.catalog.len().saturating_sub(1),
            }
        })?;

        info!(stage = selection, name = descriptor.name, "checking readiness");
        descriptor
            .action
            .readiness(ctx)
            .await
            .map_err(|source| SequencerError::NotReady {
                index: selection,
                name: descriptor.name.to_string(),
                source,
            })?;

        info!(stage = selection, name = descriptor.name, "executing");
        let outcome = descriptor
            .action
            .execute(ctx)
            .await
            .map_err(|source| SequencerError::StageFailed {
                index: selection,
                name: descriptor.name.to_string(),
                source,
            })?;

        let next = selection + 1;
        let run_outcome = match (descriptor.advance, outcome) {
            (AdvancePolicy::Finish, _) => {
                self.store.clear()?;
                RunOutcome::Complete
            }
            // A stage may escalate a weaker policy by requesting a reboot
            // or a re-login outright
            (AdvancePolicy::Reboot, _) | (_, Outcome::NeedsReboot) => {
                self.store.save(next)?;
                RunOutcome::RebootRequired { next }
            }
            (AdvancePolicy::Relogin, _) | (_, Outcome::NeedsReauth) => {
                self.store.save(next)?;
                RunOutcome::ReloginRequired { next }
            }
            (AdvancePolicy::Continue, Outcome::Success) => {
                self.store.save(next)?;
                RunOutcome::Paused { next }
            }
        };

        info!(stage = selection, name = descriptor.name, outcome = ?run_outcome, "stage complete");
        Ok(run_outcome)
    }
}
