//! Cartesian product in odometer order, with lazily grown dimension pools.
//!
//! Each dimension remembers every element it has produced so far. The first
//! draw takes one element from every dimension. After that the rightmost
//! dimension steps; a dimension wraps once its source is exhausted and its
//! pool has been replayed, carrying into the dimension to its left. A carry
//! out of the leftmost dimension ends the product.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, Result, Resumable};

use crate::tee::{split, TeeConsumer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing drawn yet.
    Fresh,
    Running,
    /// Latched; `next` keeps returning `None`.
    Exhausted,
}

enum Step {
    Advanced,
    Wrapped,
    /// Source was empty: the whole product is empty.
    Empty,
}

struct Dimension<P: Producer> {
    source: P,
    pool: Vec<P::Item>,
    exhausted: bool,
    cursor: usize,
}

impl<P: Producer> Dimension<P> {
    fn new(source: P) -> Self {
        Self {
            source,
            pool: Vec::new(),
            exhausted: false,
            cursor: 0,
        }
    }

    fn step(&mut self) -> Result<Step> {
        if !self.exhausted {
            match self.source.next()? {
                Some(item) => {
                    self.pool.push(item);
                    self.cursor = self.pool.len() - 1;
                    return Ok(Step::Advanced);
                }
                None => {
                    self.exhausted = true;
                    if self.pool.is_empty() {
                        return Ok(Step::Empty);
                    }
                    self.cursor = 0;
                    return Ok(Step::Wrapped);
                }
            }
        }
        if self.pool.is_empty() {
            return Ok(Step::Empty);
        }
        self.cursor += 1;
        if self.cursor == self.pool.len() {
            self.cursor = 0;
            Ok(Step::Wrapped)
        } else {
            Ok(Step::Advanced)
        }
    }
}

/// Cartesian product of same-typed inputs.
pub struct Product<P: Producer> {
    dims: Vec<Dimension<P>>,
    phase: Phase,
}

impl<P: Producer> Product<P> {
    pub fn new<I>(inputs: impl IntoIterator<Item = I>) -> Self
    where
        I: IntoProducer<Producer = P>,
    {
        Self {
            dims: inputs
                .into_iter()
                .map(|i| Dimension::new(wrap(i)))
                .collect(),
            phase: Phase::Fresh,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of dimensions (length of every produced tuple).
    pub fn arity(&self) -> usize {
        self.dims.len()
    }

    /// Each dimension's source with the elements it has drawn so far.
    pub(crate) fn dimensions(&self) -> impl Iterator<Item = (&P, &[P::Item])> + '_ {
        self.dims.iter().map(|d| (&d.source, d.pool.as_slice()))
    }
}

impl<P> Product<TeeConsumer<P>>
where
    P: Producer,
    P::Item: Clone,
{
    /// Product of `inputs` listed `r` times over, reading each input once.
    ///
    /// Dimensions are ordered `a1, b1, .., a2, b2, ..`. `r == 0` yields a
    /// single empty tuple.
    pub fn with_repeat<I>(inputs: impl IntoIterator<Item = I>, r: usize) -> Result<Self>
    where
        I: IntoProducer<Item = P::Item, Producer = P>,
    {
        if r == 0 {
            return Ok(Self {
                dims: Vec::new(),
                phase: Phase::Fresh,
            });
        }
        let mut groups = Vec::new();
        for input in inputs {
            groups.push(split(input, r)?.into_iter());
        }
        let mut dims = Vec::with_capacity(groups.len() * r);
        for _ in 0..r {
            for group in groups.iter_mut() {
                if let Some(consumer) = group.next() {
                    dims.push(Dimension::new(consumer));
                }
            }
        }
        Ok(Self {
            dims,
            phase: Phase::Fresh,
        })
    }
}

impl<P> Product<P>
where
    P: Producer,
    P::Item: Clone,
{
    fn current(&self) -> Vec<P::Item> {
        self.dims.iter().map(|d| d.pool[d.cursor].clone()).collect()
    }

    fn prime(&mut self) -> Result<bool> {
        for dim in self.dims.iter_mut().rev() {
            if dim.pool.is_empty() {
                if let Step::Empty = dim.step()? {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    fn carry(&mut self) -> Result<bool> {
        let mut i = self.dims.len();
        while i > 0 {
            i -= 1;
            match self.dims[i].step()? {
                Step::Advanced => return Ok(true),
                Step::Wrapped => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(dimension = i, "product carry");
                }
                Step::Empty => return Ok(false),
            }
        }
        Ok(false)
    }
}

impl<P> Producer for Product<P>
where
    P: Producer,
    P::Item: Clone,
{
    type Item = Vec<P::Item>;

    fn next(&mut self) -> Result<Option<Vec<P::Item>>> {
        let live = match self.phase {
            Phase::Exhausted => return Ok(None),
            Phase::Fresh => self.prime()?,
            Phase::Running => self.carry()?,
        };
        if !live {
            self.phase = Phase::Exhausted;
            return Ok(None);
        }
        self.phase = Phase::Running;
        Ok(Some(self.current()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: DeserializeOwned, T: DeserializeOwned"
))]
pub struct DimensionState<S, T> {
    pub source: S,
    pub pool: Vec<T>,
    pub exhausted: bool,
    pub cursor: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "S: Serialize, T: Serialize",
    deserialize = "S: DeserializeOwned, T: DeserializeOwned"
))]
pub struct ProductState<S, T> {
    pub dims: Vec<DimensionState<S, T>>,
    pub phase: Phase,
}

impl<P> Resumable for Product<P>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
{
    type State = ProductState<P::State, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        let dims = self
            .dims
            .iter()
            .map(|d| {
                Ok(DimensionState {
                    source: d.source.capture()?,
                    pool: d.pool.clone(),
                    exhausted: d.exhausted,
                    cursor: d.cursor,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ProductState {
            dims,
            phase: self.phase,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        let mut dims = Vec::with_capacity(state.dims.len());
        for (i, d) in state.dims.into_iter().enumerate() {
            if !d.pool.is_empty() && d.cursor >= d.pool.len() {
                return Err(Error::Restore(format!(
                    "product dimension {i}: cursor {} outside pool of {}",
                    d.cursor,
                    d.pool.len()
                )));
            }
            if state.phase == Phase::Running && d.pool.is_empty() {
                return Err(Error::Restore(format!(
                    "product dimension {i} is running with an empty pool"
                )));
            }
            dims.push(Dimension {
                source: P::restore(d.source)?,
                pool: d.pool,
                exhausted: d.exhausted,
                cursor: d.cursor,
            });
        }
        Ok(Self {
            dims,
            phase: state.phase,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapiter_core::sequence::SequenceProducer;
    use snapiter_core::{from_iter, RangeProducer, RangeSpec};

    #[test]
    fn odometer_order() {
        let mut p = Product::new(vec![vec![2, 5], vec![3, 5, 9]]);
        assert_eq!(
            p.drain_vec().unwrap(),
            vec![
                vec![2, 3],
                vec![2, 5],
                vec![2, 9],
                vec![5, 3],
                vec![5, 5],
                vec![5, 9]
            ]
        );
        assert_eq!(p.phase(), Phase::Exhausted);
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn empty_dimension_empties_product() {
        let mut p = Product::new(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn zero_dimensions_yield_one_empty_tuple() {
        let mut p = Product::<SequenceProducer<u8>>::new(Vec::<Vec<u8>>::new());
        assert_eq!(p.next().unwrap(), Some(vec![]));
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.next().unwrap(), None);
    }

    #[test]
    fn lazy_sources_are_read_once() {
        let mut p = Product::new(vec![from_iter(0..2), from_iter(0..3)]);
        assert_eq!(p.drain_vec().unwrap().len(), 6);
    }

    #[test]
    fn repeat_lists_inputs_r_times() {
        let mut p = Product::with_repeat(vec![vec!['a', 'b'], vec!['x']], 2).unwrap();
        assert_eq!(p.arity(), 4);
        assert_eq!(
            p.drain_vec().unwrap(),
            vec![
                vec!['a', 'x', 'a', 'x'],
                vec!['a', 'x', 'b', 'x'],
                vec!['b', 'x', 'a', 'x'],
                vec!['b', 'x', 'b', 'x'],
            ]
        );
    }

    #[test]
    fn repeat_zero_is_single_empty_tuple() {
        let mut p = Product::with_repeat(vec![vec![1, 2]], 0).unwrap();
        assert_eq!(p.drain_vec().unwrap(), vec![Vec::<i32>::new()]);
    }

    #[test]
    fn resume_mid_product() {
        let mut p = Product::new(vec![RangeSpec::up_to(3), RangeSpec::up_to(2)]);
        p.take_vec(3).unwrap();
        let state = p.capture().unwrap();
        let json = serde_json::to_vec(&state).unwrap();
        let mut q = Product::<RangeProducer>::restore(serde_json::from_slice(&json).unwrap()).unwrap();
        let rest = p.drain_vec().unwrap();
        assert_eq!(q.drain_vec().unwrap(), rest);
        assert_eq!(rest, vec![vec![1, 1], vec![2, 0], vec![2, 1]]);
    }

    #[test]
    fn resume_repeat_product_with_independent_dimensions() {
        let mut p = Product::with_repeat(vec![vec![0u8, 1, 2]], 2).unwrap();
        p.take_vec(4).unwrap();
        let state = p.capture().unwrap();
        let mut q = Product::<TeeConsumer<SequenceProducer<u8>>>::restore(state).unwrap();
        assert_eq!(q.drain_vec().unwrap(), p.drain_vec().unwrap());
    }

    #[test]
    fn exhausted_capture_stays_exhausted() {
        let mut p = Product::new(vec![vec![1], vec![2]]);
        p.drain_vec().unwrap();
        let mut q = Product::<SequenceProducer<i32>>::restore(p.capture().unwrap()).unwrap();
        assert_eq!(q.next().unwrap(), None);
    }
}
