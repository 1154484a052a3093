//! Concatenation of same-typed inputs.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, IntoProducer, Producer, Result, Resumable};

/// Elements of each input in turn. Exhausted inputs are dropped as soon as
/// they report exhaustion.
pub struct Chain<P> {
    inputs: VecDeque<P>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainState<S> {
    pub inputs: Vec<S>,
}

impl<P: Producer> Chain<P> {
    pub fn new<I>(inputs: impl IntoIterator<Item = I>) -> Self
    where
        I: IntoProducer<Producer = P>,
    {
        Self {
            inputs: inputs.into_iter().map(wrap).collect(),
        }
    }
}

impl<P: Producer> Producer for Chain<P> {
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        while let Some(current) = self.inputs.front_mut() {
            if let Some(item) = current.next()? {
                return Ok(Some(item));
            }
            self.inputs.pop_front();
        }
        Ok(None)
    }
}

impl<P: Resumable> Resumable for Chain<P> {
    type State = ChainState<P::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(ChainState {
            inputs: self
                .inputs
                .iter()
                .map(Resumable::capture)
                .collect::<Result<_>>()?,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            inputs: state
                .inputs
                .into_iter()
                .map(P::restore)
                .collect::<Result<_>>()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapiter_core::sequence::SequenceProducer;

    #[test]
    fn skips_empty_inputs() {
        let mut c = Chain::new(vec![vec![], vec![1, 2], vec![], vec![], vec![3]]);
        assert_eq!(c.drain_vec().unwrap(), vec![1, 2, 3]);
        assert_eq!(c.next().unwrap(), None);
    }

    #[test]
    fn many_empty_inputs_do_not_recurse() {
        let mut inputs = vec![Vec::<u8>::new(); 100_000];
        inputs.push(vec![9]);
        let mut c = Chain::new(inputs);
        assert_eq!(c.next().unwrap(), Some(9));
    }

    #[test]
    fn resumes_inside_second_input() {
        let mut c = Chain::new(vec![vec![1, 2], vec![3, 4]]);
        c.take_vec(3).unwrap();
        let mut d = Chain::<SequenceProducer<i32>>::restore(c.capture().unwrap()).unwrap();
        assert_eq!(d.drain_vec().unwrap(), vec![4]);
    }
}
