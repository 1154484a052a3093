//! Checkpoint store: persists snapshot envelopes through a `Storage` backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use snapiter_core::id::{Generation, PipelineId};

use crate::codec::Codec;
use crate::envelope::{Snapshot, SnapshotHeader, CHECKSUM_LEN, DEFAULT_MAX_BYTES, HEADER_LEN};
use crate::error::{Error, Result};

/// Abstract byte storage for checkpoint envelopes.
///
/// Implemented by `snapiter-io::FsStorage` for the local filesystem and by
/// `snapiter-io::MemoryStorage` for `memory://`.
pub trait Storage: Send + Sync {
    /// Write bytes to a path. Creates parent directories if needed.
    fn write(&self, path: &str, bytes: &[u8]) -> Result<()>;

    /// Read a byte range from a path. May return fewer bytes at end of object.
    fn read_range(&self, path: &str, offset: u64, len: usize) -> Result<Vec<u8>>;

    /// Delete a path. Idempotent.
    fn delete(&self, path: &str) -> Result<()>;

    /// List all paths under a prefix.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Size of a path in bytes.
    fn size(&self, path: &str) -> Result<u64>;

    /// Cheap change tag for a path, if the backend has one.
    fn etag(&self, path: &str) -> Result<Option<String>>;
}

/// Name of one checkpoint: a pipeline and the store generation it was saved at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CheckpointName(pub String);

impl CheckpointName {
    pub fn new(pipeline: PipelineId, generation: Generation) -> Self {
        CheckpointName(format!(
            "pipeline{}_gen{:08}",
            pipeline.get(),
            generation.get()
        ))
    }

    /// Recover pipeline and generation from a stored envelope path.
    pub fn parse_path(path: &str) -> Option<(PipelineId, Generation)> {
        let file = path.rsplit('/').next()?.strip_suffix(".snap")?;
        let (pipeline, generation) = file.strip_prefix("pipeline")?.split_once("_gen")?;
        Some((
            PipelineId::new(pipeline.parse().ok()?),
            Generation::new(generation.parse().ok()?),
        ))
    }
}

/// What the store remembers about a saved checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub name: CheckpointName,
    pub pipeline: PipelineId,
    pub generation: Generation,
    pub path: String,
    pub codec: Codec,
    pub len: u64,
    pub checksum: [u8; 32],
    pub etag: Option<String>,
}

/// Names, writes, tracks and reloads snapshot envelopes.
///
/// Generations continue after the highest one already present under the
/// root, so a store opened by a later process never reuses a name.
pub struct CheckpointStore {
    storage: Box<dyn Storage>,
    root_dir: String,
    max_bytes: u64,
    next_generation: AtomicU64,
    seeded: bool,
    checkpoints: HashMap<CheckpointName, CheckpointMeta>,
}

impl CheckpointStore {
    pub fn new(storage: Box<dyn Storage>, root_dir: impl Into<String>) -> Self {
        Self {
            storage,
            root_dir: root_dir.into().trim_end_matches('/').to_string(),
            max_bytes: DEFAULT_MAX_BYTES,
            next_generation: AtomicU64::new(0),
            seeded: false,
            checkpoints: HashMap::new(),
        }
    }

    /// Cap for envelopes read back through this store.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn seed_generation(&mut self) -> Result<()> {
        if self.seeded {
            return Ok(());
        }
        let next = self
            .list_stored()?
            .iter()
            .filter_map(|p| CheckpointName::parse_path(p))
            .map(|(_, g)| g.get() + 1)
            .max()
            .unwrap_or(0);
        self.next_generation.fetch_max(next, Ordering::Relaxed);
        self.seeded = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(root = %self.root_dir, next, "seeded checkpoint generation");
        Ok(())
    }

    /// Persist `snapshot` as the next checkpoint of `pipeline`.
    pub fn save(&mut self, pipeline: PipelineId, snapshot: &Snapshot) -> Result<CheckpointMeta> {
        let len = snapshot.encoded_len();
        if len > self.max_bytes {
            return Err(Error::TooLarge {
                len,
                max: self.max_bytes,
            });
        }
        self.seed_generation()?;

        let generation = Generation::new(self.next_generation.fetch_add(1, Ordering::Relaxed));
        let name = CheckpointName::new(pipeline, generation);
        let path = self.path_of(&name);

        self.storage.write(&path, &snapshot.to_bytes())?;
        let etag = self.storage.etag(&path)?;

        let meta = CheckpointMeta {
            name: name.clone(),
            pipeline,
            generation,
            path,
            codec: snapshot.codec(),
            len,
            checksum: snapshot.checksum(),
            etag,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(name = %meta.name.0, len, "saved checkpoint");

        self.checkpoints.insert(name, meta.clone());
        Ok(meta)
    }

    fn path_of(&self, name: &CheckpointName) -> String {
        format!("{}/{}.snap", self.root_dir, name.0)
    }

    /// Read the header first so a corrupt length never drives the body read.
    fn read_envelope(&self, path: &str) -> Result<Snapshot> {
        let head = self.storage.read_range(path, 0, HEADER_LEN)?;
        let header = SnapshotHeader::from_bytes(&head)?;
        header.validate_sizes(self.max_bytes)?;

        let body_len = usize::try_from(header.payload_len)
            .map_err(|_| Error::Storage(format!("checkpoint too large: {}", header.payload_len)))?
            + CHECKSUM_LEN;
        let mut bytes = head;
        bytes.extend(self.storage.read_range(path, HEADER_LEN as u64, body_len)?);
        Snapshot::from_bytes_limited(&bytes, self.max_bytes)
    }

    /// Read back a checkpoint and verify it is the one that was saved.
    pub fn load(&self, meta: &CheckpointMeta) -> Result<Snapshot> {
        if let Some(saved) = &meta.etag {
            if self.storage.etag(&meta.path)?.as_ref() != Some(saved) {
                return Err(Error::Stale {
                    path: meta.path.clone(),
                });
            }
        }
        let snapshot = self.read_envelope(&meta.path)?;
        if snapshot.checksum() != meta.checksum {
            return Err(Error::ChecksumMismatch);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(name = %meta.name.0, "loaded checkpoint");

        Ok(snapshot)
    }

    /// Read an envelope by path, e.g. one written by a previous process.
    pub fn load_path(&self, path: &str) -> Result<Snapshot> {
        let size = self.storage.size(path)?;
        if size > self.max_bytes {
            return Err(Error::TooLarge {
                len: size,
                max: self.max_bytes,
            });
        }
        self.read_envelope(path)
    }

    pub fn get(&self, name: &CheckpointName) -> Option<&CheckpointMeta> {
        self.checkpoints.get(name)
    }

    /// Most recent checkpoint of `pipeline` under this store's root, whether
    /// this store or an earlier process saved it.
    pub fn latest(&self, pipeline: PipelineId) -> Result<Option<CheckpointMeta>> {
        let newest = self
            .list_stored()?
            .into_iter()
            .filter_map(|p| CheckpointName::parse_path(&p).map(|(id, g)| (id, g, p)))
            .filter(|(id, _, _)| *id == pipeline)
            .max_by_key(|(_, g, _)| *g);
        let Some((_, generation, path)) = newest else {
            return Ok(None);
        };

        let name = CheckpointName::new(pipeline, generation);
        if let Some(meta) = self.checkpoints.get(&name) {
            return Ok(Some(meta.clone()));
        }
        let snapshot = self.load_path(&path)?;
        Ok(Some(CheckpointMeta {
            name,
            pipeline,
            generation,
            etag: self.storage.etag(&path)?,
            path,
            codec: snapshot.codec(),
            len: snapshot.encoded_len(),
            checksum: snapshot.checksum(),
        }))
    }

    /// Delete a checkpoint from storage and forget its metadata.
    pub fn delete(&mut self, name: &CheckpointName) -> Result<()> {
        let path = match self.checkpoints.remove(name) {
            Some(meta) => meta.path,
            None => self.path_of(name),
        };
        self.storage.delete(&path)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(name = %name.0, "deleted checkpoint");
        Ok(())
    }

    /// Names of the checkpoints this store saved, in name order.
    pub fn list(&self) -> Vec<CheckpointName> {
        let mut names: Vec<_> = self.checkpoints.keys().cloned().collect();
        names.sort();
        names
    }

    /// Paths of envelopes present in storage under this store's root,
    /// including ones this instance did not write.
    pub fn list_stored(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self
            .storage
            .list(&self.root_dir)?
            .into_iter()
            .filter(|p| p.ends_with(".snap"))
            .collect();
        paths.sort();
        Ok(paths)
    }
}
