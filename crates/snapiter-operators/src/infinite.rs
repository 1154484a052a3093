//! Unbounded producers: counting, cycling and repetition.

use std::ops::Add;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

/// `start, start + step, start + 2*step, ..` forever.
///
/// Integer overflow follows the element type's `Add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Count<T> {
    current: T,
    step: T,
}

impl<T> Count<T> {
    pub fn new(start: T, step: T) -> Self {
        Self {
            current: start,
            step,
        }
    }
}

impl<T: Add<Output = T> + Clone> Producer for Count<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        let following = self.current.clone() + self.step.clone();
        Ok(Some(std::mem::replace(&mut self.current, following)))
    }
}

impl<T> Resumable for Count<T>
where
    T: Add<Output = T> + Clone + Serialize + DeserializeOwned,
{
    type State = Self;

    fn capture(&self) -> Result<Self> {
        Ok(self.clone())
    }

    fn restore(state: Self) -> Result<Self> {
        Ok(state)
    }
}

/// `value`, `times` times, or forever when `times` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repeat<T> {
    value: T,
    remaining: Option<usize>,
}

impl<T> Repeat<T> {
    pub fn new(value: T, times: Option<usize>) -> Self {
        Self {
            value,
            remaining: times,
        }
    }
}

impl<T: Clone> Producer for Repeat<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        match &mut self.remaining {
            None => Ok(Some(self.value.clone())),
            Some(0) => Ok(None),
            Some(n) => {
                *n -= 1;
                Ok(Some(self.value.clone()))
            }
        }
    }
}

impl<T> Resumable for Repeat<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    type State = Self;

    fn capture(&self) -> Result<Self> {
        Ok(self.clone())
    }

    fn restore(state: Self) -> Result<Self> {
        Ok(state)
    }
}

/// Replays the input's elements forever. An empty input yields nothing.
pub struct Cycle<P: Producer> {
    source: P,
    saved: Vec<P::Item>,
    source_done: bool,
    cursor: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleState<S, T> {
    pub source: S,
    pub saved: Vec<T>,
    pub source_done: bool,
    pub cursor: usize,
}

impl<P: Producer> Cycle<P> {
    pub fn new<I: IntoProducer<Producer = P>>(input: I) -> Self {
        Self {
            source: wrap(input),
            saved: Vec::new(),
            source_done: false,
            cursor: 0,
        }
    }
}

impl<P> Producer for Cycle<P>
where
    P: Producer,
    P::Item: Clone,
{
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        if !self.source_done {
            match self.source.next()? {
                Some(item) => {
                    self.saved.push(item.clone());
                    return Ok(Some(item));
                }
                None => self.source_done = true,
            }
        }
        match self.saved.get(self.cursor) {
            Some(item) => {
                let item = item.clone();
                self.cursor = (self.cursor + 1) % self.saved.len();
                Ok(Some(item))
            }
            None => Ok(None),
        }
    }
}

impl<P> Resumable for Cycle<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    type State = CycleState<P::State, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        Ok(CycleState {
            source: self.source.capture()?,
            saved: self.saved.clone(),
            source_done: self.source_done,
            cursor: self.cursor,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        if state.cursor > 0 && state.cursor >= state.saved.len() {
            return Err(Error::Restore(format!(
                "cycle cursor {} outside {} saved elements",
                state.cursor,
                state.saved.len()
            )));
        }
        Ok(Self {
            source: P::restore(state.source)?,
            saved: state.saved,
            source_done: state.source_done,
            cursor: state.cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapiter_core::sequence::SequenceProducer;

    #[test]
    fn count_steps() {
        let mut c = Count::new(10, -3);
        assert_eq!(c.take_vec(4).unwrap(), vec![10, 7, 4, 1]);
        let mut f = Count::new(0.5, 0.25);
        assert_eq!(f.take_vec(3).unwrap(), vec![0.5, 0.75, 1.0]);
    }

    #[test]
    fn count_resumes() {
        let mut c = Count::new(0u64, 2);
        c.take_vec(5).unwrap();
        let mut d = Count::restore(c.capture().unwrap()).unwrap();
        assert_eq!(d.next().unwrap(), Some(10));
    }

    #[test]
    fn repeat_bounded_and_unbounded() {
        assert_eq!(Repeat::new('x', Some(3)).drain_vec().unwrap(), vec!['x'; 3]);
        assert_eq!(Repeat::new('x', Some(0)).next().unwrap(), None);
        assert_eq!(Repeat::new(1, None).take_vec(5).unwrap(), vec![1; 5]);
    }

    #[test]
    fn cycle_replays() {
        let mut c = Cycle::new(vec![1, 2, 3]);
        assert_eq!(c.take_vec(8).unwrap(), vec![1, 2, 3, 1, 2, 3, 1, 2]);
        assert_eq!(Cycle::new(Vec::<i32>::new()).next().unwrap(), None);
    }

    #[test]
    fn cycle_resumes_in_replay() {
        let mut c = Cycle::new(vec!['a', 'b']);
        c.take_vec(3).unwrap();
        let mut d = Cycle::<SequenceProducer<char>>::restore(c.capture().unwrap()).unwrap();
        assert_eq!(d.take_vec(3).unwrap(), vec!['b', 'a', 'b']);
    }
}
