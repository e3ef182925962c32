//! Saved-position store
//!
//! The sequencer's only durable state: the index of the next stage to run,
//! kept outside process memory so it survives exit, reboot, and re-login.
//! The trait exists so tests substitute an in-memory store instead of
//! touching real filesystem state.

use crate::error::{Result, SequencerError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Capability for persisting the next-stage position
pub trait CursorStore: Send + Sync {
    /// Read the saved position; absence means "start at stage 0".
    fn load(&self) -> Result<usize>;

    /// Overwrite the saved position. No partial write may be visible to a
    /// subsequent load.
    fn save(&self, value: usize) -> Result<()>;

    /// Remove the saved position entirely (fresh-start state).
    fn clear(&self) -> Result<()>;
}

/// File-backed store: one small text file holding the decimal position
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn store_error(&self, source: io::Error) -> SequencerError {
        SequencerError::Store {
            path: self.path.clone(),
            source,
        }
    }
}

impl CursorStore for FileCursorStore {
    fn load(&self) -> Result<usize> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(self.store_error(e)),
        };

        content.trim().parse::<usize>().map_err(|_| {
            self.store_error(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("corrupt position value: {:?}", content.trim()),
            ))
        })
    }

    fn save(&self, value: usize) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.store_error(e))?;
        }

        // Write-then-rename in the same directory so a load never sees a
        // partially written value
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{}\n", value)).map_err(|e| self.store_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.store_error(e))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.store_error(e)),
        }
    }
}

/// In-memory store for tests
#[derive(Default)]
pub struct MemoryCursorStore {
    value: Mutex<Option<usize>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the store at a given position.
    pub fn starting_at(value: usize) -> Self {
        Self {
            value: Mutex::new(Some(value)),
        }
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> Result<usize> {
        Ok(self.value.lock().unwrap().unwrap_or(0))
    }

    fn save(&self, value: usize) -> Result<()> {
        *self.value.lock().unwrap() = Some(value);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.value.lock().unwrap() = None;
        Ok(())
    }
}
