//! JSON file cursor store: `{"cursor": "<token>"}` plus a trailing newline.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, instrument};

use super::{CursorStore, StoreError};
use crate::record::Cursor;

/// Default cursor file name, relative to the working directory.
pub const DEFAULT_CURSOR_FILE: &str = "cursor.txt";

#[derive(Debug, Serialize, Deserialize)]
struct CursorFile {
    cursor: String,
}

/// Stores the cursor in a small JSON file.
///
/// A missing or blank file reads as "no cursor". Saves go through a sibling
/// temp file and a rename so a crash never leaves a half-written cursor.
#[derive(Debug, Clone)]
pub struct FileCursorStore {
    path: PathBuf,
}

impl FileCursorStore {
    /// Creates a store backed by `path`. The file is not touched until used.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for FileCursorStore {
    fn default() -> Self {
        Self::new(DEFAULT_CURSOR_FILE)
    }
}

#[async_trait]
impl CursorStore for FileCursorStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn get(&self) -> Result<Option<Cursor>, StoreError> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!("no cursor file, starting from the beginning");
                return Ok(None);
            }
            Err(error) => return Err(StoreError::io(&self.path, error)),
        };

        let data = data.trim();
        if data.is_empty() {
            return Ok(None);
        }

        let parsed: CursorFile =
            serde_json::from_str(data).map_err(|e| StoreError::corrupt(&self.path, e))?;
        Ok(Cursor::new(parsed.cursor))
    }

    #[instrument(skip(self, cursor), fields(path = %self.path.display()))]
    async fn save(&self, cursor: &Cursor) -> Result<(), StoreError> {
        let mut payload = serde_json::to_string(&CursorFile {
            cursor: cursor.as_str().to_string(),
        })
        .map_err(|e| StoreError::corrupt(&self.path, e))?;
        payload.push('\n');

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let temp = self.temp_path();
        fs::write(&temp, payload)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        set_owner_only_permissions(&temp).await?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!("cursor saved");
        Ok(())
    }
}

#[cfg(unix)]
async fn set_owner_only_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = std::fs::Permissions::from_mode(0o600);
    fs::set_permissions(path, permissions)
        .await
        .map_err(|e| StoreError::io(path, e))
}

#[cfg(not(unix))]
async fn set_owner_only_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_get_missing_file_is_start_of_stream() {
        let dir = TempDir::new().unwrap();
        let store = FileCursorStore::new(dir.path().join("cursor.txt"));
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_blank_file_is_start_of_stream() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cursor.txt");
        std::fs::write(&path, "  \n").unwrap();
        let store = FileCursorStore::new(path);
        assert!(store.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_writes_json_object_with_newline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cursor.txt");
        let store = FileCursorStore::new(&path);

        store.save(&Cursor::new("tok1").unwrap()).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "{\"cursor\":\"tok1\"}\n");
        assert!(!store.temp_path().exists(), "temp file must be renamed away");
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_cursor() {
        let dir = TempDir::new().unwrap();
        let store = FileCursorStore::new(dir.path().join("cursor.txt"));

        store.save(&Cursor::new("tok1").unwrap()).await.unwrap();
        store.save(&Cursor::new("tok2").unwrap()).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Cursor::new("tok2"));
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileCursorStore::new(dir.path().join("state/nested/cursor.txt"));
        store.save(&Cursor::new("tok1").unwrap()).await.unwrap();
        assert_eq!(store.get().await.unwrap(), Cursor::new("tok1"));
    }

    #[tokio::test]
    async fn test_get_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cursor.txt");
        std::fs::write(&path, "not json").unwrap();
        let store = FileCursorStore::new(path);

        let err = store.get().await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_saved_cursor_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cursor.txt");
        let store = FileCursorStore::new(&path);
        store.save(&Cursor::new("tok1").unwrap()).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
