//! Durable storage for the scan cursor.
//!
//! The cursor is the only state that survives between scans. A store holds a
//! single value that is overwritten on every save and never deleted.

mod file;
mod memory;

pub use file::{DEFAULT_CURSOR_FILE, FileCursorStore};
pub use memory::MemoryCursorStore;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::record::Cursor;

/// Errors for cursor load/save operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("cursor I/O error at {path}: {source}")]
    Io {
        /// Cursor file location.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The stored cursor could not be parsed.
    #[error("cursor file {path} is corrupt: {source}")]
    Corrupt {
        /// Cursor file location.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A non-file backend is unavailable.
    #[error("cursor store unavailable: {reason}")]
    Unavailable {
        /// Backend-specific description.
        reason: String,
    },
}

impl StoreError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a corrupt-payload error.
    pub fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }

    /// Creates an unavailable-backend error.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Single-value durable cursor storage.
///
/// Implementations assume a single active writer.
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Loads the last saved cursor; `None` means start of stream.
    async fn get(&self) -> Result<Option<Cursor>, StoreError>;

    /// Overwrites the saved cursor.
    async fn save(&self, cursor: &Cursor) -> Result<(), StoreError>;
}
