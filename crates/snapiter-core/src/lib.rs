#![forbid(unsafe_code)]
//! snapiter-core: the producer contract and everything every operator leans on.
//!
//! - `contract`: `Producer` (one step: element, exhaustion or fault) and
//!   `Resumable` (capture/restore of a serializable state).
//! - `dispatch`: the closed set of raw input categories and `wrap`.
//! - `sequence`, `range`: snapshot-capable wrappers for in-memory inputs.
//! - `func`: function-value traits used by filtering/mapping operators.
//!
//! File-backed producers live in `snapiter-io`; operators in `snapiter-operators`.

pub mod config;
pub mod contract;
pub mod dispatch;
pub mod error;
pub mod func;
pub mod hash;
pub mod id;
pub mod prelude;
pub mod range;
pub mod sequence;

pub use contract::{Iter, Producer, Resumable};
pub use dispatch::{from_iter, wrap, FromIter, InputKind, IntoProducer, Source, SourceState};
pub use error::{Error, Result};
pub use range::{RangeProducer, RangeSpec};
pub use sequence::SequenceProducer;

/// Crate version recorded in snapshot envelopes for provenance.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
