//! In-process cursor store.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CursorStore, StoreError};
use crate::record::Cursor;

/// Keeps the cursor in memory and remembers every save, in order.
///
/// Useful for embedding the scanner and for asserting save ordering.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    current: Mutex<Option<Cursor>>,
    history: Mutex<Vec<Cursor>>,
}

impl MemoryCursorStore {
    /// Creates an empty store (start of stream).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `cursor`.
    #[must_use]
    pub fn with_cursor(cursor: Cursor) -> Self {
        Self {
            current: Mutex::new(Some(cursor)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Returns every cursor saved so far, oldest first.
    pub async fn history(&self) -> Vec<Cursor> {
        self.history.lock().await.clone()
    }
}

#[async_trait]
impl CursorStore for MemoryCursorStore {
    async fn get(&self) -> Result<Option<Cursor>, StoreError> {
        Ok(self.current.lock().await.clone())
    }

    async fn save(&self, cursor: &Cursor) -> Result<(), StoreError> {
        *self.current.lock().await = Some(cursor.clone());
        self.history.lock().await.push(cursor.clone());
        Ok(())
    }
}
