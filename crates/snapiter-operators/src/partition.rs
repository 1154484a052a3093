//! Fixed-size chunking.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

/// Chunks of `n` elements; the last chunk may be shorter.
pub struct PartitionAll<P> {
    source: P,
    n: usize,
    done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionAllState<S> {
    pub source: S,
    pub n: usize,
    pub done: bool,
}

impl<P: Producer> PartitionAll<P> {
    pub fn new<I: IntoProducer<Producer = P>>(n: usize, input: I) -> Result<Self> {
        if n == 0 {
            return Err(Error::InvalidArgument("partition size must be positive".into()));
        }
        Ok(Self {
            source: wrap(input),
            n,
            done: false,
        })
    }
}

impl<P: Producer> Producer for PartitionAll<P> {
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        let mut chunk = Vec::with_capacity(self.n);
        while !self.done && chunk.len() < self.n {
            match self.source.next()? {
                Some(item) => chunk.push(item),
                None => self.done = true,
            }
        }
        Ok((!chunk.is_empty()).then_some(chunk))
    }
}

impl<P: Resumable> Resumable for PartitionAll<P> {
    type State = PartitionAllState<P::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(PartitionAllState {
            source: self.source.capture()?,
            n: self.n,
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        if state.n == 0 {
            return Err(Error::Restore("partition size must be positive".into()));
        }
        Ok(Self {
            source: P::restore(state.source)?,
            n: state.n,
            done: state.done,
        })
    }
}

/// Chunks of exactly `n` elements. A short final chunk is dropped, or padded
/// with `pad` when one is given.
pub struct Partition<P: Producer> {
    chunks: PartitionAll<P>,
    pad: Option<P::Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionState<S, T> {
    pub chunks: PartitionAllState<S>,
    pub pad: Option<T>,
}

impl<P: Producer> Partition<P> {
    pub fn new<I>(n: usize, input: I, pad: Option<P::Item>) -> Result<Self>
    where
        I: IntoProducer<Producer = P>,
    {
        Ok(Self {
            chunks: PartitionAll::new(n, input)?,
            pad,
        })
    }
}

impl<P> Producer for Partition<P>
where
    P: Producer,
    P::Item: Clone,
{
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        let Some(mut chunk) = self.chunks.next()? else {
            return Ok(None);
        };
        let n = self.chunks.n;
        if chunk.len() < n {
            match &self.pad {
                Some(pad) => chunk.resize(n, pad.clone()),
                None => return Ok(None),
            }
        }
        Ok(Some(chunk))
    }
}

impl<P> Resumable for Partition<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    type State = PartitionState<P::State, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        Ok(PartitionState {
            chunks: self.chunks.capture()?,
            pad: self.pad.clone(),
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            chunks: PartitionAll::restore(state.chunks)?,
            pad: state.pad,
        })
    }
}
