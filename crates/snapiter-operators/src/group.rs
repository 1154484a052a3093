//! Runs of consecutive elements sharing a key.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::func::{Identity, KeyFn};
use snapiter_core::{wrap, IntoProducer, Producer, Result, Resumable};

/// Yields `(key, run)` for each maximal run of consecutive elements with
/// equal keys.
///
/// Runs are collected eagerly: producing a run reads one element past it,
/// which becomes the first element of the next run.
pub struct GroupBy<P: Producer, K> {
    source: P,
    key_fn: K,
    /// Run under construction; all elements share one key.
    open: Vec<P::Item>,
    done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupByState<S, K, T> {
    pub source: S,
    pub key_fn: K,
    pub open: Vec<T>,
    pub done: bool,
}

impl<P: Producer> GroupBy<P, Identity>
where
    P::Item: Clone + PartialEq,
{
    /// Group by the elements themselves.
    pub fn new<I: IntoProducer<Producer = P>>(input: I) -> Self {
        Self::with_key(input, Identity)
    }
}

impl<P: Producer, K: KeyFn<P::Item>> GroupBy<P, K> {
    pub fn with_key<I: IntoProducer<Producer = P>>(input: I, key_fn: K) -> Self {
        Self {
            source: wrap(input),
            key_fn,
            open: Vec::new(),
            done: false,
        }
    }

    fn close(&mut self, next_run: Vec<P::Item>) -> Option<(K::Key, Vec<P::Item>)> {
        let run = std::mem::replace(&mut self.open, next_run);
        let first = run.first()?;
        Some((self.key_fn.key(first), run))
    }
}

impl<P: Producer, K: KeyFn<P::Item>> Producer for GroupBy<P, K> {
    type Item = (K::Key, Vec<P::Item>);

    fn next(&mut self) -> Result<Option<Self::Item>> {
        while !self.done {
            let Some(item) = self.source.next()? else {
                self.done = true;
                break;
            };
            let same_run = match self.open.first() {
                None => true,
                Some(first) => self.key_fn.key(first) == self.key_fn.key(&item),
            };
            if same_run {
                self.open.push(item);
            } else {
                return Ok(self.close(vec![item]));
            }
        }
        Ok(self.close(Vec::new()))
    }
}

impl<P, K> Resumable for GroupBy<P, K>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
    K: KeyFn<P::Item> + Clone + Serialize + DeserializeOwned,
{
    type State = GroupByState<P::State, K, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        Ok(GroupByState {
            source: self.source.capture()?,
            key_fn: self.key_fn.clone(),
            open: self.open.clone(),
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            source: P::restore(state.source)?,
            key_fn: state.key_fn,
            open: state.open,
            done: state.done,
        })
    }
}
