#![forbid(unsafe_code)]
//! snapiter: lazy iteration operators whose progress can be captured,
//! persisted and resumed.
//!
//! ```
//! use snapiter::prelude::*;
//!
//! let mut p = Product::new(vec![vec![2, 5], vec![3, 5, 9]]);
//! assert_eq!(p.next().unwrap(), Some(vec![2, 3]));
//!
//! let snap = Snapshot::capture(&p, Codec::None).unwrap();
//! let mut resumed: Product<SequenceProducer<i32>> =
//!     Snapshot::from_bytes(&snap.to_bytes()).unwrap().restore().unwrap();
//! assert_eq!(resumed.next().unwrap(), p.next().unwrap());
//! ```

pub use snapiter_core;
pub use snapiter_io;
pub use snapiter_operators;
pub use snapiter_store;

pub use snapiter_core::{wrap, Error, InputKind, IntoProducer, Producer, Result, Resumable};

pub mod prelude {
    pub use snapiter_core::prelude::*;
    pub use snapiter_io::{AccessMode, LineProducer, NamedFile};
    pub use snapiter_operators::{
        combinations, combinations_with_replacement, permutations, split, Accumulate, Chain,
        Compress, Count, Cycle, DropWhile, EquiZip, Filter, FilterFalse, GroupBy, Map,
        Partition, PartitionAll, Product, Repeat, Slice, TakeWhile, TeeConsumer, Zip,
        ZipLongest,
    };
    pub use snapiter_store::{CheckpointStore, Codec, Snapshot};
}
