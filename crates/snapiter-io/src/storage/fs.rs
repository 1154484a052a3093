use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use blake3::Hasher;
use snapiter_store::error::{Error as StoreError, Result as StoreResult};
use snapiter_store::Storage;

/// Local filesystem storage (rooted at the host filesystem).
#[derive(Debug, Clone, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FsStorage {
    fn write(&self, path: &str, bytes: &[u8]) -> StoreResult<()> {
        let p = Path::new(path);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Storage(format!("mkparent: {e}")))?;
        }
        // write a sibling, then rename into place
        let tmp = p.with_extension("partial");
        let mut f = File::create(&tmp).map_err(|e| StoreError::Storage(format!("create: {e}")))?;
        f.write_all(bytes)
            .map_err(|e| StoreError::Storage(format!("write: {e}")))?;
        f.sync_all()
            .map_err(|e| StoreError::Storage(format!("sync: {e}")))?;
        fs::rename(&tmp, p).map_err(|e| StoreError::Storage(format!("rename: {e}")))?;
        Ok(())
    }

    fn read_range(&self, path: &str, offset: u64, len: usize) -> StoreResult<Vec<u8>> {
        let mut f =
            File::open(Path::new(path)).map_err(|e| StoreError::Storage(format!("open: {e}")))?;
        f.seek(SeekFrom::Start(offset))
            .map_err(|e| StoreError::Storage(format!("seek: {e}")))?;
        let mut buf = Vec::with_capacity(len);
        f.take(len as u64)
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::Storage(format!("read: {e}")))?;
        Ok(buf)
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        let p = Path::new(path);
        if p.exists() {
            fs::remove_file(p).map_err(|e| StoreError::Storage(format!("delete: {e}")))?;
        }
        Ok(())
    }

    fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let root = Path::new(prefix);
        if root.is_file() {
            return Ok(root.to_str().map(str::to_string).into_iter().collect());
        }

        let list_err = |e: std::io::Error| StoreError::Storage(format!("list {prefix}: {e}"));
        let mut found = Vec::new();
        let mut pending: Vec<PathBuf> = Vec::new();
        if root.is_dir() {
            pending.push(root.to_path_buf());
        }
        while let Some(dir) = pending.pop() {
            for entry in fs::read_dir(&dir).map_err(list_err)? {
                let path = entry.map_err(list_err)?.path();
                if path.is_dir() {
                    pending.push(path);
                } else if let Some(s) = path.to_str() {
                    found.push(s.to_string());
                }
            }
        }
        found.sort();
        Ok(found)
    }

    fn size(&self, path: &str) -> StoreResult<u64> {
        let meta =
            fs::metadata(Path::new(path)).map_err(|e| StoreError::Storage(format!("size: {e}")))?;
        Ok(meta.len())
    }

    fn etag(&self, path: &str) -> StoreResult<Option<String>> {
        // len, mtime and path; changes whenever the file is rewritten
        let p = Path::new(path);
        match fs::metadata(p) {
            Ok(meta) => {
                let mut h = Hasher::new();
                h.update(&meta.len().to_le_bytes());
                if let Ok(m) = meta.modified() {
                    if let Ok(d) = m.duration_since(std::time::SystemTime::UNIX_EPOCH) {
                        h.update(&d.as_secs().to_le_bytes());
                        h.update(&d.subsec_nanos().to_le_bytes());
                    }
                }
                h.update(path.as_bytes());
                Ok(Some(h.finalize().to_hex().to_string()))
            }
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_read_list_delete() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ckpt");
        let path = root.join("nested/a.snap");
        let path = path.to_str().unwrap();
        let s = FsStorage::new();

        s.write(path, b"hello world").unwrap();
        assert_eq!(s.size(path).unwrap(), 11);
        assert_eq!(s.read_range(path, 6, 5).unwrap(), b"world");
        assert_eq!(s.read_range(path, 6, 100).unwrap(), b"world");
        assert!(s.etag(path).unwrap().is_some());

        let listed = s.list(root.to_str().unwrap()).unwrap();
        assert_eq!(listed, vec![path.to_string()]);

        s.delete(path).unwrap();
        s.delete(path).unwrap();
        assert!(s.etag(path).unwrap().is_none());
        assert!(s.list(root.to_str().unwrap()).unwrap().is_empty());
    }
}
