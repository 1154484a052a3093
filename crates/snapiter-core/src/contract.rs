//! The producer contract.
//!
//! Every operator, primitive or composite, is an explicit state record plus a
//! single step function. There are no suspended frames: whatever an operator
//! needs to resume lives in named fields, which is what makes `Resumable`
//! possible.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;

/// A single-step source of elements.
///
/// `next` returns `Ok(Some(item))` for an element, `Ok(None)` once the source
/// is exhausted, and `Err(_)` for a fault. Implementations in this workspace
/// keep returning `Ok(None)` after exhaustion.
///
/// Producers are not synchronized: advancing one instance from several threads
/// requires caller-supplied exclusion.
pub trait Producer {
    type Item;

    /// Produce the next element or signal exhaustion.
    fn next(&mut self) -> Result<Option<Self::Item>>;

    /// Borrow the producer as a std iterator over `Result<Item>`.
    ///
    /// The iterator fuses after exhaustion or after the first fault.
    fn iter(&mut self) -> Iter<'_, Self>
    where
        Self: Sized,
    {
        Iter {
            inner: self,
            done: false,
        }
    }

    /// Pull at most `n` elements.
    fn take_vec(&mut self, n: usize) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
    {
        let mut out = Vec::with_capacity(n);
        while out.len() < n {
            match self.next()? {
                Some(item) => out.push(item),
                None => break,
            }
        }
        Ok(out)
    }

    /// Pull every remaining element. Never returns for infinite producers.
    fn drain_vec(&mut self) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
    {
        let mut out = Vec::new();
        while let Some(item) = self.next()? {
            out.push(item);
        }
        Ok(out)
    }
}

impl<P: Producer + ?Sized> Producer for Box<P> {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        (**self).next()
    }
}

impl<P: Producer + ?Sized> Producer for &mut P {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<Self::Item>> {
        (**self).next()
    }
}

/// A producer whose progress can be captured and restored.
///
/// Invariant: `restore(p.capture()?)?` produces exactly the elements `p` would
/// have produced from that point on.
///
/// `State` is an inert value; turning it into bytes is the job of
/// `snapiter-store`.
pub trait Resumable: Producer + Sized {
    type State: Serialize + DeserializeOwned;

    /// Capture the current progress.
    fn capture(&self) -> Result<Self::State>;

    /// Rebuild a producer from a captured state. Either fully succeeds or
    /// returns an error; no half-restored producer is ever handed out.
    fn restore(state: Self::State) -> Result<Self>;
}

/// Iterator view over a borrowed producer. See [`Producer::iter`].
#[derive(Debug)]
pub struct Iter<'a, P> {
    inner: &'a mut P,
    done: bool,
}

impl<P: Producer> Iterator for Iter<'_, P> {
    type Item = Result<P::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.inner.next() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<P: Producer> std::iter::FusedIterator for Iter<'_, P> {}
