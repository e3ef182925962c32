//! Bramble Stage Actions
//!
//! This crate provides the stage actions that bring a freshly-imaged
//! Raspberry Pi to a fully configured homelab node: OS updates, firmware,
//! mesh VPN, filtering DNS, the container runtime and its workloads, and
//! disk-cloning tooling.
//!
//! Actions are small, focused implementations behind the [`StageAction`]
//! trait. Side effects go through two injected capabilities so the crate is
//! unit-testable without touching the host:
//!
//! - [`CommandRunner`] — every shell-out (production: real processes,
//!   tests: scripted results)
//! - [`Prompter`] — operator input read mid-action
//!
//! The ordering of stages and what happens after each one succeeds is the
//! sequencer's concern, not this crate's.

pub mod actions;
pub mod context;
pub mod error;
pub mod http;
pub mod net;
pub mod prompt;
pub mod runner;
pub mod traits;

pub use context::*;
pub use error::*;
pub use prompt::*;
pub use runner::*;
pub use traits::*;
