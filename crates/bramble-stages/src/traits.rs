//! Stage action trait
//!
//! A stage is one discrete unit of provisioning work. Each stage action
//! declares an optional readiness gate and a side-effecting execute body;
//! the sequencer runs exactly one per invocation.

use crate::context::StageContext;
use crate::error::{Result, StageError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What a successful stage asks of the sequencer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Stage finished; advance normally.
    Success,
    /// Stage finished but its effects need a reboot before the next stage.
    NeedsReboot,
    /// Stage finished but the operator must start a new login session.
    NeedsReauth,
}

/// Core trait for stage actions
///
/// Failure is the `Err` arm: the sequencer leaves the saved position
/// untouched so re-running resumes at the same stage, and prints the
/// error's remediation text. Execute bodies must therefore be safe to
/// re-run ("remove if exists", "clone-or-pull", best-effort removals).
#[async_trait]
pub trait StageAction: Send + Sync {
    /// Short identifier (used in logs)
    fn name(&self) -> &str;

    /// One-line description of what the stage does
    fn description(&self) -> &str;

    /// Precondition gate evaluated before `execute()`
    ///
    /// An `Err` halts the invocation without running the action or moving
    /// the saved position. The default is always-ready.
    async fn readiness(&self, ctx: &StageContext) -> Result<()> {
        let _ = ctx;
        Ok(())
    }

    /// Perform the stage's side effects.
    async fn execute(&self, ctx: &StageContext) -> Result<Outcome>;
}

/// A stage with a fixed outcome, for tests
pub struct StaticStage {
    name: String,
    outcome: Outcome,
    executions: AtomicUsize,
}

impl StaticStage {
    pub fn new(name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            outcome,
            executions: AtomicUsize::new(0),
        }
    }

    /// How many times execute() ran.
    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StageAction for StaticStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A fixed-outcome stage for tests"
    }

    async fn execute(&self, _ctx: &StageContext) -> Result<Outcome> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(self.outcome)
    }
}

/// A stage that always fails, for tests
pub struct FailingStage {
    name: String,
    reason: String,
}

impl FailingStage {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl StageAction for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A stage that always fails, for tests"
    }

    async fn execute(&self, _ctx: &StageContext) -> Result<Outcome> {
        Err(StageError::command(self.name.clone(), self.reason.clone()))
    }
}

/// A stage whose readiness gate always fails, for tests
pub struct GatedStage {
    name: String,
    reason: String,
    executions: AtomicUsize,
}

impl GatedStage {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
            executions: AtomicUsize::new(0),
        }
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StageAction for GatedStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "A never-ready stage for tests"
    }

    async fn readiness(&self, _ctx: &StageContext) -> Result<()> {
        Err(StageError::NotReady {
            reason: self.reason.clone(),
            remediation: None,
        })
    }

    async fn execute(&self, _ctx: &StageContext) -> Result<Outcome> {
        self.executions.fetch_add(1, Ordering::SeqCst);
        Ok(Outcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_context() -> StageContext {
        StageContext::new("pi", "/home/pi")
    }

    #[tokio::test]
    async fn test_static_stage_counts_executions() {
        let stage = StaticStage::new("noop", Outcome::Success);
        let ctx = test_context();

        assert_eq!(stage.executions(), 0);
        assert_eq!(stage.execute(&ctx).await.unwrap(), Outcome::Success);
        assert_eq!(stage.executions(), 1);
    }

    #[tokio::test]
    async fn test_static_stage_default_readiness_passes() {
        let stage = StaticStage::new("noop", Outcome::NeedsReboot);
        assert!(stage.readiness(&test_context()).await.is_ok());
    }

    #[tokio::test]
    async fn test_failing_stage() {
        let stage = FailingStage::new("broken", "disk full");
        let err = stage.execute(&test_context()).await.unwrap_err();
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_gated_stage_never_ready() {
        let stage = GatedStage::new("gated", "dependency missing");
        let err = stage.readiness(&test_context()).await.unwrap_err();
        assert!(matches!(err, StageError::NotReady { .. }));
        assert_eq!(stage.executions(), 0);
    }
}
