//! Operator input seam
//!
//! The mesh VPN stage needs a secret typed by the operator mid-action.
//! Production reads stdin; tests answer from a canned queue.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

/// Capability for reading one line of operator input
pub trait Prompter: Send + Sync {
    fn prompt_line(&self, prompt: &str) -> io::Result<String>;
}

/// Reads from the terminal
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn prompt_line(&self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        Ok(input.trim().to_string())
    }
}

/// Answers from a fixed queue, for tests
#[derive(Default)]
pub struct CannedPrompter {
    answers: Mutex<VecDeque<String>>,
}

impl CannedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
        }
    }
}

impl Prompter for CannedPrompter {
    fn prompt_line(&self, _prompt: &str) -> io::Result<String> {
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or_default())
    }
}
