//! Shell-out seam for stage actions
//!
//! Provisioning is mostly external commands. All of them go through the
//! [`CommandRunner`] trait so production code shells out while tests
//! substitute a scripted stub with canned results.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::process::Command;

/// Captured result of one external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code, None if terminated by signal
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            status: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn err(status: i32, stderr: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// One-line description of how the command ended, for error messages.
    pub fn describe_failure(&self) -> String {
        let status = match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        };
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            status
        } else {
            format!("{}: {}", status, stderr)
        }
    }
}

/// Render a program and its arguments as a single display line.
pub fn render_command(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    }
}

/// Capability for running external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a program with arguments, capturing exit status and output.
    ///
    /// An `Err` means the command could not be spawned at all; a command
    /// that ran and exited non-zero is an `Ok` with a failing status.
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput>;
}

/// Runs commands on the host
pub struct HostRunner;

#[async_trait]
impl CommandRunner for HostRunner {
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output().await?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Scripted runner for tests
///
/// Records every invocation and answers with canned results matched by
/// substring against the rendered command line. Unmatched commands succeed
/// with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Any command line containing `needle` fails with exit status 1.
    pub fn with_failure(mut self, needle: impl Into<String>) -> Self {
        self.rules
            .push((needle.into(), CommandOutput::err(1, "scripted failure")));
        self
    }

    /// Any command line containing `needle` answers with `output`.
    pub fn with_output(mut self, needle: impl Into<String>, output: CommandOutput) -> Self {
        self.rules.push((needle.into(), output));
        self
    }

    /// Every command line run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any recorded command line contains `needle`.
    pub fn ran(&self, needle: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c.contains(needle))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let line = render_command(program, args);
        self.calls.lock().unwrap().push(line.clone());

        for (needle, output) in &self.rules {
            if line.contains(needle.as_str()) {
                return Ok(output.clone());
            }
        }
        Ok(CommandOutput::ok(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_command() {
        assert_eq!(render_command("sync", &[]), "sync");
        assert_eq!(
            render_command("apt-get", &["update", "-y"]),
            "apt-get update -y"
        );
    }

    #[test]
    fn test_describe_failure() {
        let out = CommandOutput::err(100, "E: could not get lock\n");
        assert_eq!(
            out.describe_failure(),
            "exit status 100: E: could not get lock"
        );

        let out = CommandOutput {
            status: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert_eq!(out.describe_failure(), "terminated by signal");
    }

    #[tokio::test]
    async fn test_scripted_runner_default_success() {
        let runner = ScriptedRunner::new();
        let out = runner.run("docker", &["ps"]).await.unwrap();
        assert!(out.success());
        assert!(runner.ran("docker ps"));
    }

    #[tokio::test]
    async fn test_scripted_runner_failure_rule() {
        let runner = ScriptedRunner::new().with_failure("docker ps");
        let out = runner.run("docker", &["ps"]).await.unwrap();
        assert!(!out.success());

        let out = runner.run("docker", &["volume", "create", "x"]).await.unwrap();
        assert!(out.success());
    }

    #[tokio::test]
    async fn test_scripted_runner_records_order() {
        let runner = ScriptedRunner::new();
        runner.run("first", &[]).await.unwrap();
        runner.run("second", &["arg"]).await.unwrap();
        assert_eq!(runner.calls(), vec!["first", "second arg"]);
    }

    #[tokio::test]
    async fn test_host_runner_captures_output() {
        let runner = HostRunner;
        let out = runner.run("echo", &["hello"]).await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_host_runner_spawn_error() {
        let runner = HostRunner;
        let result = runner.run("definitely-not-a-real-binary", &[]).await;
        assert!(result.is_err());
    }
}
