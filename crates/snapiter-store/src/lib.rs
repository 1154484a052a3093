#![forbid(unsafe_code)]
//! snapiter-store: turning captured producer states into durable bytes.
//!
//! - `envelope`: header layout, codec and checksum around a JSON-encoded state.
//! - `checkpoint`: the `Storage` trait and a store that names, writes, lists
//!   and reloads envelopes.
//!
//! No filesystem access lives here; backends implementing `Storage` are in
//! `snapiter-io`.

pub mod checkpoint;
pub mod codec;
pub mod envelope;
pub mod error;

pub use checkpoint::{CheckpointMeta, CheckpointName, CheckpointStore, Storage};
pub use codec::Codec;
pub use envelope::{Snapshot, SnapshotHeader, HEADER_LEN};
pub use error::{Error, Result};
