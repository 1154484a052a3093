//! Fan-out: one upstream, several independent consumers.
//!
//! The group owns the upstream and one FIFO buffer per consumer slot. A
//! consumer whose buffer is empty advances the upstream once, appending the
//! element to every attached buffer. Dropping a consumer detaches its slot so
//! nothing more is buffered for it.
//!
//! The group is shared through `Rc<RefCell<..>>`, so consumers are not `Send`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

struct TeeShared<P: Producer> {
    upstream: P,
    /// `None` marks a detached slot.
    buffers: Vec<Option<VecDeque<P::Item>>>,
    exhausted: bool,
}

impl<P> TeeShared<P>
where
    P: Producer,
    P::Item: Clone,
{
    /// Pull one element from upstream into every attached buffer.
    fn advance(&mut self) -> Result<()> {
        match self.upstream.next()? {
            Some(item) => {
                #[cfg(feature = "tracing")]
                tracing::trace!(slots = self.buffers.len(), "tee advanced upstream");
                for buf in self.buffers.iter_mut().flatten() {
                    buf.push_back(item.clone());
                }
            }
            None => self.exhausted = true,
        }
        Ok(())
    }
}

/// One consumer of a fan-out group.
pub struct TeeConsumer<P: Producer> {
    shared: Rc<RefCell<TeeShared<P>>>,
    index: usize,
}

/// Split `input` into `n` consumers that each see every element.
///
/// `n == 0` is rejected.
pub fn split<I: IntoProducer>(input: I, n: usize) -> Result<Vec<TeeConsumer<I::Producer>>> {
    if n == 0 {
        return Err(Error::InvalidArgument("tee needs at least one consumer".into()));
    }
    let shared = Rc::new(RefCell::new(TeeShared {
        upstream: wrap(input),
        buffers: (0..n).map(|_| Some(VecDeque::new())).collect(),
        exhausted: false,
    }));
    Ok((0..n)
        .map(|index| TeeConsumer {
            shared: Rc::clone(&shared),
            index,
        })
        .collect())
}

impl<P: Producer> TeeConsumer<P> {
    /// Slot of this consumer within its group.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Elements pulled from upstream but not yet delivered to this consumer.
    pub fn buffered(&self) -> usize {
        self.shared
            .try_borrow()
            .ok()
            .and_then(|s| s.buffers.get(self.index).and_then(|b| b.as_ref().map(VecDeque::len)))
            .unwrap_or(0)
    }

    /// Check the group's upstream and every element buffered for any slot.
    pub(crate) fn group_satisfies(
        &self,
        upstream: impl FnOnce(&P) -> bool,
        mut item: impl FnMut(&P::Item) -> bool,
    ) -> Result<bool> {
        let shared = self
            .shared
            .try_borrow()
            .map_err(|_| Error::InvalidArgument("tee group is busy".into()))?;
        Ok(upstream(&shared.upstream) && shared.buffers.iter().flatten().flatten().all(|x| item(x)))
    }
}

impl<P> TeeConsumer<P>
where
    P: Producer,
    P::Item: Clone,
{
    /// Add a consumer to the group positioned where this one is.
    pub fn fork(&self) -> Result<Self> {
        let mut shared = self
            .shared
            .try_borrow_mut()
            .map_err(|_| Error::InvalidArgument("tee group is busy".into()))?;
        let copy = shared.buffers[self.index].clone();
        shared.buffers.push(copy);
        Ok(Self {
            shared: Rc::clone(&self.shared),
            index: shared.buffers.len() - 1,
        })
    }
}

impl<P> Producer for TeeConsumer<P>
where
    P: Producer,
    P::Item: Clone,
{
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        let mut guard = self
            .shared
            .try_borrow_mut()
            .map_err(|_| Error::InvalidArgument("tee group advanced re-entrantly".into()))?;
        let shared = &mut *guard;
        loop {
            if let Some(item) = shared.buffers[self.index]
                .as_mut()
                .and_then(VecDeque::pop_front)
            {
                return Ok(Some(item));
            }
            if shared.exhausted {
                return Ok(None);
            }
            shared.advance()?;
        }
    }
}

impl<P: Producer> Drop for TeeConsumer<P> {
    fn drop(&mut self) {
        if let Ok(mut shared) = self.shared.try_borrow_mut() {
            if let Some(slot) = shared.buffers.get_mut(self.index) {
                *slot = None;
            }
        }
    }
}

impl<P: Producer> fmt::Debug for TeeConsumer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeConsumer")
            .field("index", &self.index)
            .field("buffered", &self.buffered())
            .finish()
    }
}

/// Captured state of a whole fan-out group, seen from one slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: DeserializeOwned, T: DeserializeOwned"
))]
pub struct TeeState<S, T> {
    pub upstream: S,
    pub buffers: Vec<Option<VecDeque<T>>>,
    pub exhausted: bool,
    pub index: usize,
}

impl<P> TeeConsumer<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    /// Rebuild every attached consumer of a captured group, in slot order.
    /// They share one restored upstream.
    pub fn restore_group(state: TeeState<P::State, P::Item>) -> Result<Vec<Self>> {
        let attached: Vec<usize> = state
            .buffers
            .iter()
            .enumerate()
            .filter_map(|(i, b)| b.as_ref().map(|_| i))
            .collect();
        let shared = Self::rebuild(state)?;
        Ok(attached
            .into_iter()
            .map(|index| TeeConsumer {
                shared: Rc::clone(&shared),
                index,
            })
            .collect())
    }

    fn rebuild(state: TeeState<P::State, P::Item>) -> Result<Rc<RefCell<TeeShared<P>>>> {
        let upstream = P::restore(state.upstream)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(
            slots = state.buffers.len(),
            exhausted = state.exhausted,
            "restored tee group"
        );
        Ok(Rc::new(RefCell::new(TeeShared {
            upstream,
            buffers: state.buffers,
            exhausted: state.exhausted,
        })))
    }
}

impl<P> Resumable for TeeConsumer<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    type State = TeeState<P::State, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        let shared = self
            .shared
            .try_borrow()
            .map_err(|_| Error::InvalidArgument("tee group is busy".into()))?;
        #[cfg(feature = "tracing")]
        tracing::debug!(index = self.index, slots = shared.buffers.len(), "capturing tee group");
        Ok(TeeState {
            upstream: shared.upstream.capture()?,
            buffers: shared.buffers.clone(),
            exhausted: shared.exhausted,
            index: self.index,
        })
    }

    /// Rebuild the group with only this consumer's slot attached.
    fn restore(mut state: Self::State) -> Result<Self> {
        let index = state.index;
        match state.buffers.get(index) {
            Some(Some(_)) => {}
            _ => {
                return Err(Error::Restore(format!(
                    "tee slot {index} is missing or detached"
                )))
            }
        }
        for (i, slot) in state.buffers.iter_mut().enumerate() {
            if i != index {
                *slot = None;
            }
        }
        let shared = Self::rebuild(state)?;
        Ok(TeeConsumer { shared, index })
    }
}
