//! Stage execution context
//!
//! Carries everything a stage action needs: the invoking account, its home
//! directory, the configured timezone, an HTTP client, and the injected
//! command-runner and prompter capabilities.

use crate::error::{Result, StageError};
use crate::prompt::{Prompter, StdinPrompter};
use crate::runner::{render_command, CommandOutput, CommandRunner, HostRunner};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

/// Context provided to stage actions during execution
pub struct StageContext {
    /// Account the sequencer runs as (group membership, docker access)
    username: String,
    home_dir: PathBuf,
    /// Timezone handed to containers that want one
    timezone: String,
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn Prompter>,
    http: reqwest::Client,
}

impl StageContext {
    /// Create a context that runs real commands and reads real stdin.
    pub fn new(username: impl Into<String>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            username: username.into(),
            home_dir: home_dir.into(),
            timezone: "Etc/UTC".to_string(),
            runner: Arc::new(HostRunner),
            prompter: Arc::new(StdinPrompter),
            http: reqwest::Client::new(),
        }
    }

    /// Substitute the command runner (tests use a scripted one).
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Substitute the prompter.
    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Set the timezone handed to containers.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn home_dir(&self) -> &Path {
        &self.home_dir
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Read one line of operator input.
    pub fn prompt_line(&self, prompt: &str) -> Result<String> {
        Ok(self.prompter.prompt_line(prompt)?)
    }

    /// Run a command, returning its captured output whatever the exit status.
    pub async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        Ok(self.runner.run(program, args).await?)
    }

    /// Run a command and fail the stage if it exits non-zero.
    pub async fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let output = self.run(program, args).await?;
        if !output.success() {
            return Err(StageError::command(
                render_command(program, args),
                output.describe_failure(),
            ));
        }
        Ok(output)
    }

    /// Run a command as root (via sudo) and fail the stage on non-zero exit.
    pub async fn run_root(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(program);
        full.extend_from_slice(args);
        self.run_checked("sudo", &full).await
    }

    /// Run a command where failure is acceptable (e.g. "remove if present").
    ///
    /// Failures are logged as warnings and never fail the stage.
    pub async fn run_best_effort(&self, program: &str, args: &[&str]) {
        match self.runner.run(program, args).await {
            Ok(output) if !output.success() => {
                warn!(
                    command = %render_command(program, args),
                    detail = %output.describe_failure(),
                    "ignoring failed best-effort command"
                );
            }
            Err(e) => {
                warn!(
                    command = %render_command(program, args),
                    error = %e,
                    "could not spawn best-effort command"
                );
            }
            Ok(_) => {}
        }
    }

    /// Best-effort command as root.
    pub async fn run_root_best_effort(&self, program: &str, args: &[&str]) {
        let mut full = Vec::with_capacity(args.len() + 1);
        full.push(program);
        full.extend_from_slice(args);
        self.run_best_effort("sudo", &full).await;
    }

    /// Run a shell snippet and fail the stage on non-zero exit.
    ///
    /// Used for the pipe-from-vendor install scripts and multi-step apt
    /// source setup where a plain argv call is not enough.
    pub async fn shell(&self, script: &str) -> Result<CommandOutput> {
        self.run_checked("sh", &["-c", script]).await
    }

    /// Shell snippet as root.
    pub async fn shell_root(&self, script: &str) -> Result<CommandOutput> {
        self.run_checked("sudo", &["sh", "-c", script]).await
    }
}
