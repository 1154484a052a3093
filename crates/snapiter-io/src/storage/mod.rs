//! Storage adapters implementing `snapiter_store::Storage`.
//!
//! - `fs`: local filesystem (default).
//! - `memory`: process-local map, for `memory://` and tests.

mod fs;
mod memory;

pub use fs::FsStorage;
pub use memory::MemoryStorage;

use snapiter_core::config::StorageConfig;
use snapiter_store::Storage;

use crate::error::{Error, Result};

/// Build the storage backend named by the configured checkpoint URI.
pub fn build_storage_from_config(cfg: &StorageConfig) -> Result<Box<dyn Storage>> {
    match cfg.scheme() {
        Some("file") | None => Ok(Box::new(FsStorage::new())),
        Some("memory") | Some("mem") => Ok(Box::new(MemoryStorage::new())),
        Some(other) => Err(Error::Config(format!(
            "unsupported checkpoint scheme '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(uri: Option<&str>) -> StorageConfig {
        StorageConfig {
            uri: uri.map(str::to_string),
            root: "ckpt".into(),
        }
    }

    #[test]
    fn picks_backend_by_scheme() {
        assert!(build_storage_from_config(&cfg(None)).is_ok());
        assert!(build_storage_from_config(&cfg(Some("file:///tmp/x"))).is_ok());

        let mem = build_storage_from_config(&cfg(Some("memory://"))).unwrap();
        mem.write("ckpt/a.snap", b"abc").unwrap();
        assert_eq!(mem.size("ckpt/a.snap").unwrap(), 3);

        assert!(matches!(
            build_storage_from_config(&cfg(Some("s3://bucket"))),
            Err(Error::Config(_))
        ));
    }
}
