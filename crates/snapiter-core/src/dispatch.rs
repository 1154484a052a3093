//! Input dispatch: which snapshot-capable wrapper a raw input becomes.
//!
//! The set of categories is closed and resolved at compile time through
//! `IntoProducer`. Adding a category means adding an `InputKind` variant and
//! an impl; no runtime type inspection is involved.

use std::ops::Range;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::contract::{Producer, Resumable};
use crate::error::Result;
use crate::range::{RangeProducer, RangeSpec, RangeState};
use crate::sequence::{SequenceProducer, SequenceState};

/// Raw input categories recognised by `wrap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    /// Finite indexable sequence.
    Sequence,
    /// Readable byte stream with a name (an open file).
    ByteStream,
    /// Numeric range descriptor.
    Range,
    /// Already conforms to `Producer`; used unchanged.
    Native,
}

/// Conversion of a raw input into a contract-conforming producer.
pub trait IntoProducer {
    type Item;
    type Producer: Producer<Item = Self::Item>;

    /// Category this input is dispatched as.
    const KIND: InputKind;

    fn into_producer(self) -> Self::Producer;
}

/// Wrap a raw input into a producer. Never fails.
pub fn wrap<I: IntoProducer>(input: I) -> I::Producer {
    #[cfg(feature = "tracing")]
    tracing::trace!(kind = ?I::KIND, "wrapping input");
    input.into_producer()
}

impl<P: Producer> IntoProducer for P {
    type Item = P::Item;
    type Producer = P;
    const KIND: InputKind = InputKind::Native;

    fn into_producer(self) -> P {
        self
    }
}

impl<T: Clone> IntoProducer for Vec<T> {
    type Item = T;
    type Producer = SequenceProducer<T>;
    const KIND: InputKind = InputKind::Sequence;

    fn into_producer(self) -> SequenceProducer<T> {
        SequenceProducer::new(self)
    }
}

impl<T: Clone> IntoProducer for Arc<[T]> {
    type Item = T;
    type Producer = SequenceProducer<T>;
    const KIND: InputKind = InputKind::Sequence;

    fn into_producer(self) -> SequenceProducer<T> {
        SequenceProducer::from_shared(self)
    }
}

impl IntoProducer for Range<i64> {
    type Item = i64;
    type Producer = RangeProducer;
    const KIND: InputKind = InputKind::Range;

    fn into_producer(self) -> RangeProducer {
        RangeProducer::new(RangeSpec::from(self))
    }
}

impl IntoProducer for RangeSpec {
    type Item = i64;
    type Producer = RangeProducer;
    const KIND: InputKind = InputKind::Range;

    fn into_producer(self) -> RangeProducer {
        RangeProducer::new(self)
    }
}

/// One input of an operator whose inputs come from different categories,
/// e.g. a product over a list and a range. Stays resumable, unlike a boxed
/// producer. Range elements convert into `T` through `From<i64>`.
#[derive(Debug, Clone)]
pub enum Source<T> {
    Sequence(SequenceProducer<T>),
    Range(RangeProducer),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub enum SourceState<T> {
    Sequence(SequenceState<T>),
    Range(RangeState),
}

impl<T> Source<T> {
    pub fn kind(&self) -> InputKind {
        match self {
            Source::Sequence(_) => InputKind::Sequence,
            Source::Range(_) => InputKind::Range,
        }
    }
}

impl<T> From<Vec<T>> for Source<T> {
    fn from(items: Vec<T>) -> Self {
        Source::Sequence(SequenceProducer::new(items))
    }
}

impl<T> From<RangeSpec> for Source<T> {
    fn from(spec: RangeSpec) -> Self {
        Source::Range(RangeProducer::new(spec))
    }
}

impl<T> From<Range<i64>> for Source<T> {
    fn from(range: Range<i64>) -> Self {
        Source::Range(RangeProducer::new(RangeSpec::from(range)))
    }
}

impl<T: Clone + From<i64>> Producer for Source<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        match self {
            Source::Sequence(p) => p.next(),
            Source::Range(p) => Ok(p.next()?.map(T::from)),
        }
    }
}

impl<T> Resumable for Source<T>
where
    T: Clone + From<i64> + Serialize + DeserializeOwned,
{
    type State = SourceState<T>;

    fn capture(&self) -> Result<SourceState<T>> {
        Ok(match self {
            Source::Sequence(p) => SourceState::Sequence(p.capture()?),
            Source::Range(p) => SourceState::Range(p.capture()?),
        })
    }

    fn restore(state: SourceState<T>) -> Result<Self> {
        Ok(match state {
            SourceState::Sequence(s) => Source::Sequence(SequenceProducer::restore(s)?),
            SourceState::Range(s) => Source::Range(RangeProducer::restore(s)?),
        })
    }
}

/// Adapter for std iterators. Produces elements but cannot be captured.
#[derive(Debug, Clone)]
pub struct FromIter<I>(I);

pub fn from_iter<I: IntoIterator>(iter: I) -> FromIter<I::IntoIter> {
    FromIter(iter.into_iter())
}

impl<I: Iterator> Producer for FromIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Result<Option<I::Item>> {
        Ok(self.0.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of<I: IntoProducer>(_: &I) -> InputKind {
        I::KIND
    }

    #[test]
    fn categories_resolve() {
        assert_eq!(kind_of(&vec![1, 2]), InputKind::Sequence);
        let shared: Arc<[u8]> = Arc::from(vec![1u8]);
        assert_eq!(kind_of(&shared), InputKind::Sequence);
        assert_eq!(kind_of(&(0..3i64)), InputKind::Range);
        assert_eq!(kind_of(&from_iter(0..3)), InputKind::Native);
    }

    #[test]
    fn wrapped_inputs_produce() {
        assert_eq!(wrap(vec!['a', 'b']).drain_vec().unwrap(), vec!['a', 'b']);
        assert_eq!(wrap(2..5i64).drain_vec().unwrap(), vec![2, 3, 4]);
        assert_eq!(wrap(from_iter("xy".chars())).drain_vec().unwrap(), vec!['x', 'y']);
    }

    #[test]
    fn mixed_sources_share_one_type_and_resume() {
        let mut inputs: Vec<Source<i64>> = vec![vec![7, 8].into(), (0..3).into()];
        assert_eq!(inputs[0].kind(), InputKind::Sequence);
        assert_eq!(inputs[1].kind(), InputKind::Range);
        assert_eq!(kind_of(&inputs[1].clone()), InputKind::Native);

        inputs[1].next().unwrap();
        let json = serde_json::to_string(&inputs[1].capture().unwrap()).unwrap();
        let mut back = Source::<i64>::restore(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(back.drain_vec().unwrap(), vec![1, 2]);
        assert_eq!(inputs[0].drain_vec().unwrap(), vec![7, 8]);
    }

    #[test]
    fn native_producer_passes_through_unchanged() {
        let mut seq = wrap(vec![1, 2, 3]);
        assert_eq!(seq.next().unwrap(), Some(1));
        let mut again = wrap(seq);
        assert_eq!(again.next().unwrap(), Some(2));
    }
}
