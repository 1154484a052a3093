//! Workspace configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapiterConfig {
    /// Directory for checkpoint files (local-path configuration).
    pub checkpoint_dir: String,

    /// Optional fully-qualified checkpoint URI (`file:///...` or `memory://`).
    pub checkpoint_uri: Option<String>,

    /// Snapshot payload codec name: `none`, `zstd` or `lz4`.
    pub codec: String,

    /// Upper bound on a single encoded snapshot, checked on both encode and decode.
    pub max_snapshot_bytes: u64,

    /// Read buffer capacity for file-line producers.
    pub line_buffer_bytes: usize,
}

impl Default for SnapiterConfig {
    fn default() -> Self {
        Self {
            checkpoint_dir: "/tmp/snapiter-checkpoints".to_string(),
            checkpoint_uri: None,
            codec: "none".to_string(),
            max_snapshot_bytes: 100 * 1024 * 1024, // 100 MiB
            line_buffer_bytes: 8 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub uri: Option<String>,
    pub root: String,
}

impl StorageConfig {
    pub fn scheme(&self) -> Option<&str> {
        self.uri
            .as_deref()
            .and_then(|uri| uri.split("://").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

impl SnapiterConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `SNAPITER_CHECKPOINT_DIR`: checkpoint directory
    /// - `SNAPITER_CHECKPOINT_URI`: checkpoint URI
    /// - `SNAPITER_CODEC`: snapshot codec name
    /// - `SNAPITER_MAX_SNAPSHOT_BYTES`: envelope size cap in bytes
    /// - `SNAPITER_LINE_BUFFER_BYTES`: line reader buffer capacity
    ///
    /// Unparseable numeric values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("SNAPITER_CHECKPOINT_DIR") {
            cfg.checkpoint_dir = s;
        }

        if let Ok(s) = std::env::var("SNAPITER_CHECKPOINT_URI") {
            cfg.checkpoint_uri = Some(s);
        }

        if let Ok(s) = std::env::var("SNAPITER_CODEC") {
            cfg.codec = s.trim().to_ascii_lowercase();
        }

        if let Ok(s) = std::env::var("SNAPITER_MAX_SNAPSHOT_BYTES") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.max_snapshot_bytes = v;
            }
        }

        if let Ok(s) = std::env::var("SNAPITER_LINE_BUFFER_BYTES") {
            if let Ok(v) = s.parse::<usize>() {
                if v > 0 {
                    cfg.line_buffer_bytes = v;
                }
            }
        }

        cfg
    }

    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            uri: self.checkpoint_uri.clone(),
            root: self.checkpoint_dir.clone(),
        }
    }
}
