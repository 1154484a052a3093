#![forbid(unsafe_code)]
//! snapiter-operators: resumable iteration operators.
//!
//! Every operator here owns its inputs (wrapped through
//! `snapiter_core::wrap`), advances them from a single `next` step and, when
//! its inputs and function values allow it, implements `Resumable` by
//! capturing its inputs recursively.
//!
//! - `tee`: one upstream fanned out to several consumers.
//! - `product`, `combinatoric`: Cartesian product, permutations, combinations.
//! - the rest: one-pass composites (chain, zip, filter, slice, ..).

pub mod chain;
pub mod combinatoric;
pub mod group;
pub mod infinite;
pub mod map;
pub mod partition;
pub mod product;
pub mod select;
pub mod slice;
pub mod tee;
pub mod zip;

pub use chain::Chain;
pub use combinatoric::{
    combinations, combinations_with_replacement, permutations, Combinations,
    CombinationsWithReplacement, IndexSource, Permutations,
};
pub use group::GroupBy;
pub use infinite::{Count, Cycle, Repeat};
pub use map::{Accumulate, Map};
pub use partition::{Partition, PartitionAll};
pub use product::Product;
pub use select::{Compress, DropWhile, Filter, FilterFalse, TakeWhile};
pub use slice::Slice;
pub use tee::{split, TeeConsumer};
pub use zip::{EquiZip, Zip, ZipLongest};
