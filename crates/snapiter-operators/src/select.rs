//! Operators that decide per element whether to pass it on.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::func::Predicate;
use snapiter_core::{wrap, IntoProducer, Producer, Result, Resumable};

/// Data elements whose paired selector is `true`. Stops at the shorter input.
pub struct Compress<D, S> {
    data: D,
    selectors: S,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressState<A, B> {
    pub data: A,
    pub selectors: B,
}

impl<D: Producer, S: Producer<Item = bool>> Compress<D, S> {
    pub fn new<I, J>(data: I, selectors: J) -> Self
    where
        I: IntoProducer<Producer = D>,
        J: IntoProducer<Producer = S>,
    {
        Self {
            data: wrap(data),
            selectors: wrap(selectors),
        }
    }
}

impl<D: Producer, S: Producer<Item = bool>> Producer for Compress<D, S> {
    type Item = D::Item;

    fn next(&mut self) -> Result<Option<D::Item>> {
        loop {
            let Some(item) = self.data.next()? else {
                return Ok(None);
            };
            let Some(keep) = self.selectors.next()? else {
                return Ok(None);
            };
            if keep {
                return Ok(Some(item));
            }
        }
    }
}

impl<D: Resumable, S: Resumable<Item = bool>> Resumable for Compress<D, S> {
    type State = CompressState<D::State, S::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(CompressState {
            data: self.data.capture()?,
            selectors: self.selectors.capture()?,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            data: D::restore(state.data)?,
            selectors: S::restore(state.selectors)?,
        })
    }
}

/// Pull until an element's predicate outcome equals `want`.
fn pull_matching<P, F>(source: &mut P, predicate: &F, want: bool) -> Result<Option<P::Item>>
where
    P: Producer,
    F: Predicate<P::Item>,
{
    while let Some(item) = source.next()? {
        if predicate.test(&item) == want {
            return Ok(Some(item));
        }
    }
    Ok(None)
}

/// Captured state shared by `Filter` and `FilterFalse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterState<S, F> {
    pub source: S,
    pub predicate: F,
}

macro_rules! predicate_filter {
    ($(#[$doc:meta])* $name:ident, $want:expr) => {
        $(#[$doc])*
        pub struct $name<P, F> {
            source: P,
            predicate: F,
        }

        impl<P: Producer, F: Predicate<P::Item>> $name<P, F> {
            pub fn new<I: IntoProducer<Producer = P>>(input: I, predicate: F) -> Self {
                Self {
                    source: wrap(input),
                    predicate,
                }
            }
        }

        impl<P: Producer, F: Predicate<P::Item>> Producer for $name<P, F> {
            type Item = P::Item;

            fn next(&mut self) -> Result<Option<P::Item>> {
                pull_matching(&mut self.source, &self.predicate, $want)
            }
        }

        impl<P, F> Resumable for $name<P, F>
        where
            P: Resumable,
            F: Predicate<P::Item> + Clone + Serialize + DeserializeOwned,
        {
            type State = FilterState<P::State, F>;

            fn capture(&self) -> Result<Self::State> {
                Ok(FilterState {
                    source: self.source.capture()?,
                    predicate: self.predicate.clone(),
                })
            }

            fn restore(state: Self::State) -> Result<Self> {
                Ok(Self {
                    source: P::restore(state.source)?,
                    predicate: state.predicate,
                })
            }
        }
    };
}

predicate_filter!(
    /// Elements for which the predicate holds.
    Filter,
    true
);
predicate_filter!(
    /// Elements for which the predicate does not hold.
    FilterFalse,
    false
);

/// Longest prefix whose elements satisfy the predicate.
///
/// The element that fails the predicate is consumed and discarded; after
/// that the operator stays exhausted without touching the input again.
pub struct TakeWhile<P, F> {
    source: P,
    predicate: F,
    done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakeWhileState<S, F> {
    pub source: S,
    pub predicate: F,
    pub done: bool,
}

impl<P: Producer, F: Predicate<P::Item>> TakeWhile<P, F> {
    pub fn new<I: IntoProducer<Producer = P>>(input: I, predicate: F) -> Self {
        Self {
            source: wrap(input),
            predicate,
            done: false,
        }
    }
}

impl<P: Producer, F: Predicate<P::Item>> Producer for TakeWhile<P, F> {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        if self.done {
            return Ok(None);
        }
        match self.source.next()? {
            Some(item) if self.predicate.test(&item) => Ok(Some(item)),
            _ => {
                self.done = true;
                Ok(None)
            }
        }
    }
}

impl<P, F> Resumable for TakeWhile<P, F>
where
    P: Resumable,
    F: Predicate<P::Item> + Clone + Serialize + DeserializeOwned,
{
    type State = TakeWhileState<P::State, F>;

    fn capture(&self) -> Result<Self::State> {
        Ok(TakeWhileState {
            source: self.source.capture()?,
            predicate: self.predicate.clone(),
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            source: P::restore(state.source)?,
            predicate: state.predicate,
            done: state.done,
        })
    }
}

/// Everything after the longest prefix that satisfies the predicate.
pub struct DropWhile<P, F> {
    source: P,
    predicate: F,
    dropping: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropWhileState<S, F> {
    pub source: S,
    pub predicate: F,
    pub dropping: bool,
}

impl<P: Producer, F: Predicate<P::Item>> DropWhile<P, F> {
    pub fn new<I: IntoProducer<Producer = P>>(input: I, predicate: F) -> Self {
        Self {
            source: wrap(input),
            predicate,
            dropping: true,
        }
    }
}

impl<P: Producer, F: Predicate<P::Item>> Producer for DropWhile<P, F> {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        if self.dropping {
            let first = pull_matching(&mut self.source, &self.predicate, false)?;
            self.dropping = false;
            return Ok(first);
        }
        self.source.next()
    }
}

impl<P, F> Resumable for DropWhile<P, F>
where
    P: Resumable,
    F: Predicate<P::Item> + Clone + Serialize + DeserializeOwned,
{
    type State = DropWhileState<P::State, F>;

    fn capture(&self) -> Result<Self::State> {
        Ok(DropWhileState {
            source: self.source.capture()?,
            predicate: self.predicate.clone(),
            dropping: self.dropping,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            source: P::restore(state.source)?,
            predicate: state.predicate,
            dropping: state.dropping,
        })
    }
}
