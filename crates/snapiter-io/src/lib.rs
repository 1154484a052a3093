#![forbid(unsafe_code)]
//! snapiter-io: everything that touches the filesystem.
//!
//! - `lines`: a snapshot-capable line producer over a named file.
//! - `storage`: `Storage` backends for checkpoint envelopes (filesystem,
//!   in-memory) and a builder that picks one from configuration.

pub mod error;
pub mod lines;
pub mod storage;

pub use error::{Error, Result};
pub use lines::{AccessMode, FileState, LineProducer, NamedFile};
pub use storage::{build_storage_from_config, FsStorage, MemoryStorage};
