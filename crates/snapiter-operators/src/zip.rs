//! Lock-step combination of same-typed inputs.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

fn wrap_all<P, I>(inputs: impl IntoIterator<Item = I>) -> Vec<P>
where
    P: Producer,
    I: IntoProducer<Producer = P>,
{
    inputs.into_iter().map(wrap).collect()
}

fn capture_all<P: Resumable>(inputs: &[P]) -> Result<Vec<P::State>> {
    inputs.iter().map(Resumable::capture).collect()
}

fn restore_all<P: Resumable>(states: Vec<P::State>) -> Result<Vec<P>> {
    states.into_iter().map(P::restore).collect()
}

/// One element from each input per step; ends with the shortest input.
/// Zero inputs produce nothing.
pub struct Zip<P> {
    inputs: Vec<P>,
    done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZipState<S> {
    pub inputs: Vec<S>,
    pub done: bool,
}

impl<P: Producer> Zip<P> {
    pub fn new<I: IntoProducer<Producer = P>>(inputs: impl IntoIterator<Item = I>) -> Self {
        let inputs = wrap_all(inputs);
        let done = inputs.is_empty();
        Self { inputs, done }
    }
}

impl<P: Producer> Producer for Zip<P> {
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        if self.done {
            return Ok(None);
        }
        let mut row = Vec::with_capacity(self.inputs.len());
        for input in self.inputs.iter_mut() {
            match input.next()? {
                Some(item) => row.push(item),
                None => {
                    self.done = true;
                    return Ok(None);
                }
            }
        }
        Ok(Some(row))
    }
}

impl<P: Resumable> Resumable for Zip<P> {
    type State = ZipState<P::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(ZipState {
            inputs: capture_all(&self.inputs)?,
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            inputs: restore_all(state.inputs)?,
            done: state.done,
        })
    }
}

/// Like [`Zip`] but runs until every input is exhausted, padding the
/// exhausted ones with `fill`. Exhausted inputs are not polled again.
pub struct ZipLongest<P: Producer> {
    inputs: Vec<P>,
    exhausted: Vec<bool>,
    fill: P::Item,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZipLongestState<S, T> {
    pub inputs: Vec<S>,
    pub exhausted: Vec<bool>,
    pub fill: T,
}

impl<P: Producer> ZipLongest<P> {
    pub fn new<I>(inputs: impl IntoIterator<Item = I>, fill: P::Item) -> Self
    where
        I: IntoProducer<Producer = P>,
    {
        let inputs = wrap_all(inputs);
        let exhausted = vec![false; inputs.len()];
        Self {
            inputs,
            exhausted,
            fill,
        }
    }
}

impl<P> Producer for ZipLongest<P>
where
    P: Producer,
    P::Item: Clone,
{
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        let mut row = Vec::with_capacity(self.inputs.len());
        let mut found_any = false;
        for (input, exhausted) in self.inputs.iter_mut().zip(self.exhausted.iter_mut()) {
            if !*exhausted {
                if let Some(item) = input.next()? {
                    row.push(item);
                    found_any = true;
                    continue;
                }
                *exhausted = true;
            }
            row.push(self.fill.clone());
        }
        Ok(found_any.then_some(row))
    }
}

impl<P> Resumable for ZipLongest<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    type State = ZipLongestState<P::State, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        Ok(ZipLongestState {
            inputs: capture_all(&self.inputs)?,
            exhausted: self.exhausted.clone(),
            fill: self.fill.clone(),
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        if state.exhausted.len() != state.inputs.len() {
            return Err(Error::Restore(format!(
                "zip_longest has {} inputs but {} exhaustion flags",
                state.inputs.len(),
                state.exhausted.len()
            )));
        }
        Ok(Self {
            inputs: restore_all(state.inputs)?,
            exhausted: state.exhausted,
            fill: state.fill,
        })
    }
}

/// Zip that requires every input to have the same length.
///
/// When some inputs end before others, the step that notices fails with
/// `Error::LengthMismatch` naming the first input that ended; the operator
/// is exhausted afterwards.
pub struct EquiZip<P> {
    inputs: Vec<P>,
    done: bool,
}

impl<P: Producer> EquiZip<P> {
    pub fn new<I: IntoProducer<Producer = P>>(inputs: impl IntoIterator<Item = I>) -> Self {
        let inputs = wrap_all(inputs);
        let done = inputs.is_empty();
        Self { inputs, done }
    }
}

impl<P: Producer> Producer for EquiZip<P> {
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        if self.done {
            return Ok(None);
        }
        let mut row = Vec::with_capacity(self.inputs.len());
        let mut first_ended = None;
        for (index, input) in self.inputs.iter_mut().enumerate() {
            match input.next()? {
                Some(item) => row.push(item),
                None => {
                    first_ended.get_or_insert(index);
                }
            }
        }
        match first_ended {
            None => Ok(Some(row)),
            Some(_) if row.is_empty() => {
                self.done = true;
                Ok(None)
            }
            Some(index) => {
                self.done = true;
                Err(Error::LengthMismatch { index })
            }
        }
    }
}

impl<P: Resumable> Resumable for EquiZip<P> {
    type State = ZipState<P::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(ZipState {
            inputs: capture_all(&self.inputs)?,
            done: self.done,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            inputs: restore_all(state.inputs)?,
            done: state.done,
        })
    }
}
