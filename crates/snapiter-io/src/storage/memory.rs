//! In-memory storage backend.
//!
//! A map behind a mutex; used for the `memory://` scheme and for tests that
//! should not touch the filesystem. Clones share the same map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use snapiter_core::hash::hash_bytes;
use snapiter_store::error::{Error as StoreError, Result as StoreResult};
use snapiter_store::Storage;

#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.data
            .lock()
            .map_err(|_| StoreError::Storage("memory storage lock poisoned".into()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lock().map(|d| d.contains_key(path)).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.lock().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        self.lock()?.insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    fn read_range(&self, path: &str, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        let data = self.lock()?;
        let bytes = data
            .get(path)
            .ok_or_else(|| StoreError::Storage(format!("path not found: {path}")))?;

        let start = usize::try_from(offset)
            .map_err(|_| StoreError::Storage(format!("offset {offset} out of range")))?;
        if start > bytes.len() {
            return Err(StoreError::Storage(format!(
                "offset {} exceeds size {}",
                offset,
                bytes.len()
            )));
        }
        let end = start.saturating_add(len).min(bytes.len());
        Ok(bytes[start..end].to_vec())
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        self.lock()?.remove(path);
        Ok(())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let mut result: Vec<String> = self
            .lock()?
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        result.sort();
        Ok(result)
    }

    fn size(&self, path: &str) -> StoreResult<u64> {
        let data = self.lock()?;
        let bytes = data
            .get(path)
            .ok_or_else(|| StoreError::Storage(format!("path not found: {path}")))?;
        Ok(bytes.len() as u64)
    }

    fn etag(&self, path: &str) -> StoreResult<Option<String>> {
        Ok(self
            .lock()?
            .get(path)
            .map(|bytes| hash_bytes(bytes).to_hex()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_range() {
        let storage = MemoryStorage::new();
        storage.write("test/file.snap", b"hello world").unwrap();
        assert_eq!(storage.read_range("test/file.snap", 0, 11).unwrap(), b"hello world");
        assert_eq!(storage.read_range("test/file.snap", 6, 5).unwrap(), b"world");
    }

    #[test]
    fn delete_is_idempotent() {
        let storage = MemoryStorage::new();
        storage.write("test/file.snap", b"data").unwrap();
        assert!(storage.contains("test/file.snap"));
        storage.delete("test/file.snap").unwrap();
        storage.delete("test/file.snap").unwrap();
        assert!(!storage.contains("test/file.snap"));
        assert!(storage.is_empty());
    }

    #[test]
    fn list_filters_by_prefix() {
        let storage = MemoryStorage::new();
        storage.write("dir/file1.snap", b"1").unwrap();
        storage.write("dir/file2.snap", b"2").unwrap();
        storage.write("other/file3.snap", b"3").unwrap();

        let files = storage.list("dir/").unwrap();
        assert_eq!(files, vec!["dir/file1.snap", "dir/file2.snap"]);
    }

    #[test]
    fn etag_tracks_content() {
        let storage = MemoryStorage::new();
        storage.write("a", b"1").unwrap();
        let first = storage.etag("a").unwrap();
        storage.write("a", b"2").unwrap();
        assert_ne!(first, storage.etag("a").unwrap());
        assert_eq!(storage.etag("missing").unwrap(), None);
    }

    #[test]
    fn clones_share_contents() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.write("k", b"v").unwrap();
        assert_eq!(b.size("k").unwrap(), 1);
    }
}
