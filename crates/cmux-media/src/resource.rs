//! Ephemeral binary resources with owned, scoped release.
//!
//! A [`ResourceHandle`] has exactly one owner. Release happens explicitly
//! via [`ResourceHandle::release`] or implicitly when the handle is
//! dropped (replacement, session teardown); a released handle is never
//! reused.

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::error::MediaResult;

/// Owns a directory of ephemeral binary resources.
pub struct ResourceStore {
    dir: PathBuf,
    // Keeps the backing temp directory alive for store-scoped cleanup.
    _tmp: Option<tempfile::TempDir>,
}

impl ResourceStore {
    /// Create a store over an existing directory (created if needed).
    pub fn new(dir: impl Into<PathBuf>) -> MediaResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, _tmp: None })
    }

    /// Create a store over a fresh temporary directory, removed when the
    /// store is dropped.
    pub fn in_temp() -> MediaResult<Self> {
        let tmp = tempfile::Builder::new().prefix("cmux-resources").tempdir()?;
        Ok(Self {
            dir: tmp.path().to_path_buf(),
            _tmp: Some(tmp),
        })
    }

    /// Write `bytes` under a unique internal name and hand out the owning
    /// handle. `file_name` is the caller-facing (download) name and does
    /// not need to be unique across handles.
    pub fn create(&self, file_name: &str, bytes: &[u8]) -> MediaResult<ResourceHandle> {
        let unique = format!("{}_{file_name}", short_id());
        let path = self.dir.join(unique);
        std::fs::write(&path, bytes)?;
        Ok(ResourceHandle {
            file_name: file_name.to_string(),
            path,
            len: bytes.len() as u64,
            released: false,
        })
    }
}

/// Sole owner of one ephemeral binary resource.
#[derive(Debug)]
pub struct ResourceHandle {
    file_name: String,
    path: PathBuf,
    len: u64,
    released: bool,
}

impl ResourceHandle {
    /// Caller-facing file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// On-disk location of the resource.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Read the resource back into memory.
    pub async fn read(&self) -> MediaResult<Vec<u8>> {
        Ok(tokio::fs::read(&self.path).await?)
    }

    /// Release the resource now. Best-effort; removal failures are logged
    /// and swallowed.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = std::fs::remove_file(&self.path) {
            debug!(resource = %self.path.display(), "release skipped: {e}");
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

fn short_id() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_read_back() {
        let store = ResourceStore::in_temp().unwrap();
        let handle = store.create("output.mp4", b"payload").unwrap();

        assert_eq!(handle.file_name(), "output.mp4");
        assert_eq!(handle.len(), 7);
        assert!(handle.path().exists());
        assert_eq!(std::fs::read(handle.path()).unwrap(), b"payload");
    }

    #[test]
    fn test_same_file_name_gets_distinct_paths() {
        let store = ResourceStore::in_temp().unwrap();
        let a = store.create("export.mp4", b"a").unwrap();
        let b = store.create("export.mp4", b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_explicit_release_removes_file() {
        let store = ResourceStore::in_temp().unwrap();
        let handle = store.create("preview.mp4", b"bytes").unwrap();
        let path = handle.path().to_path_buf();

        handle.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_releases() {
        let store = ResourceStore::in_temp().unwrap();
        let path = {
            let handle = store.create("preview.mp4", b"bytes").unwrap();
            handle.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
