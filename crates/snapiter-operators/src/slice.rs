//! Positional slicing of a producer.

use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

/// Elements at positions `start, start + step, ..` below `stop`.
///
/// Skipping to `start` happens on the first `next`, not at construction. The
/// input is never advanced past `stop`.
pub struct Slice<P> {
    source: P,
    /// Elements still to discard before `start`.
    skip: usize,
    /// Positions after `start` that may still be consumed; `None` is unbounded.
    remaining: Option<usize>,
    step: usize,
    /// Positions consumed since `start`.
    taken: usize,
    done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SliceState<S> {
    pub source: S,
    pub skip: usize,
    pub remaining: Option<usize>,
    pub step: usize,
    pub taken: usize,
    pub done: bool,
}

impl<P: Producer> Slice<P> {
    pub fn new<I: IntoProducer<Producer = P>>(
        input: I,
        start: usize,
        stop: Option<usize>,
        step: usize,
    ) -> Result<Self> {
        if step == 0 {
            return Err(Error::InvalidArgument("slice step must be positive".into()));
        }
        Ok(Self {
            source: wrap(input),
            skip: stop.map_or(start, |s| s.min(start)),
            remaining: stop.map(|s| s.saturating_sub(start)),
            step,
            taken: 0,
            done: false,
        })
    }

    /// The first `n` elements.
    pub fn head<I: IntoProducer<Producer = P>>(input: I, n: usize) -> Self {
        Self {
            source: wrap(input),
            skip: 0,
            remaining: Some(n),
            step: 1,
            taken: 0,
            done: false,
        }
    }

    fn pull(&mut self) -> Result<Option<P::Item>> {
        let item = self.source.next()?;
        if item.is_none() {
            self.done = true;
        }
        Ok(item)
    }
}

impl<P: Producer> Producer for Slice<P> {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        if self.done {
            return Ok(None);
        }
        while self.skip > 0 {
            if self.pull()?.is_none() {
                return Ok(None);
            }
            self.skip -= 1;
        }
        loop {
            if self.remaining.is_some_and(|stop| self.taken >= stop) {
                self.done = true;
                return Ok(None);
            }
            let wanted = self.taken % self.step == 0;
            let item = self.pull()?;
            let Some(item) = item else {
                return Ok(None);
            };
            self.taken += 1;
            if wanted {
                return Ok(Some(item));
            }
        }
    }
}

impl<P: Resumable> Resumable for Slice<P> {
    type State = SliceState<P::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(SliceState {
            source: self.source.capture()?,
            skip: self.skip,
            remaining: self.remaining,
            step: self.step,
            taken: self.taken,
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        if state.step == 0 {
            return Err(Error::Restore("slice step must be positive".into()));
        }
        Ok(Self {
            source: P::restore(state.source)?,
            skip: state.skip,
            remaining: state.remaining,
            step: state.step,
            taken: state.taken,
            done: state.done,
        })
    }
}
