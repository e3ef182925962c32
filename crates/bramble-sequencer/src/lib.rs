//! Bramble Stage Sequencer
//!
//! Resumable, single-shot orchestration for the provisioning pipeline:
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                  Sequencer                        │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │  CursorStore                               │  │
//! │  │  next-stage file | in-memory (tests)       │  │
//! │  └────────────────────────────────────────────┘  │
//! │                      │                            │
//! │                      ▼                            │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │  StageCatalog                              │  │
//! │  │  12 ordered stages, one advance policy each│  │
//! │  └────────────────────────────────────────────┘  │
//! │                      │                            │
//! │                      ▼                            │
//! │  ┌────────────────────────────────────────────┐  │
//! │  │  run_stage: readiness → execute → advance  │  │
//! │  └────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one stage runs per process invocation. The saved position is
//! the only durable state; it survives reboots and re-logins, and the
//! terminal stage clears it.

pub mod catalog;
pub mod console;
pub mod controller;
pub mod cursor;
pub mod error;

pub use catalog::*;
pub use controller::*;
pub use cursor::*;
pub use error::*;
