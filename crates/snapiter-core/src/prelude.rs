//! Convenience re-exports for downstream crates.

pub use crate::config::{SnapiterConfig, StorageConfig};
pub use crate::contract::{Producer, Resumable};
pub use crate::dispatch::{from_iter, wrap, InputKind, IntoProducer, Source};
pub use crate::error::{Error, Result};
pub use crate::func::{Fold, Identity, KeyFn, Predicate, Sum, Transform};
pub use crate::hash::{hash_bytes, Hash256};
pub use crate::id::{Generation, PipelineId};
pub use crate::range::{RangeProducer, RangeSpec};
pub use crate::sequence::SequenceProducer;
