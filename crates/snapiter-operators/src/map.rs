//! Element-wise transformation and running accumulation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::func::{Fold, Sum, Transform};
use snapiter_core::{wrap, IntoProducer, Producer, Result, Resumable};

/// Applies a `Transform` to every element.
pub struct Map<P, F> {
    source: P,
    f: F,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapState<S, F> {
    pub source: S,
    pub f: F,
}

impl<P: Producer, F: Transform<P::Item>> Map<P, F> {
    pub fn new<I: IntoProducer<Producer = P>>(input: I, f: F) -> Self {
        Self {
            source: wrap(input),
            f,
        }
    }
}

impl<P: Producer, F: Transform<P::Item>> Producer for Map<P, F> {
    type Item = F::Output;

    fn next(&mut self) -> Result<Option<F::Output>> {
        Ok(self.source.next()?.map(|item| self.f.apply(item)))
    }
}

impl<P, F> Resumable for Map<P, F>
where
    P: Resumable,
    F: Transform<P::Item> + Clone + Serialize + DeserializeOwned,
{
    type State = MapState<P::State, F>;

    fn capture(&self) -> Result<Self::State> {
        Ok(MapState {
            source: self.source.capture()?,
            f: self.f.clone(),
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            source: P::restore(state.source)?,
            f: state.f,
        })
    }
}

/// Running fold: the first element, then `fold(total, next)` for each
/// following element. Defaults to addition.
pub struct Accumulate<P: Producer, F = Sum> {
    source: P,
    fold: F,
    total: Option<P::Item>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulateState<S, F, T> {
    pub source: S,
    pub fold: F,
    pub total: Option<T>,
}

impl<P> Accumulate<P, Sum>
where
    P: Producer,
    Sum: Fold<P::Item>,
{
    /// Running sums.
    pub fn new<I: IntoProducer<Producer = P>>(input: I) -> Self {
        Self::with_fold(input, Sum)
    }
}

impl<P: Producer, F: Fold<P::Item>> Accumulate<P, F> {
    pub fn with_fold<I: IntoProducer<Producer = P>>(input: I, fold: F) -> Self {
        Self {
            source: wrap(input),
            fold,
            total: None,
        }
    }
}

impl<P, F> Producer for Accumulate<P, F>
where
    P: Producer,
    P::Item: Clone,
    F: Fold<P::Item>,
{
    type Item = P::Item;

    fn next(&mut self) -> Result<Option<P::Item>> {
        let Some(item) = self.source.next()? else {
            return Ok(None);
        };
        let total = match self.total.take() {
            None => item,
            Some(acc) => self.fold.fold(acc, item),
        };
        self.total = Some(total.clone());
        Ok(Some(total))
    }
}

impl<P, F> Resumable for Accumulate<P, F>
where
    P: Resumable,
    P::Item: Clone + Serialize + DeserializeOwned,
    F: Fold<P::Item> + Clone + Serialize + DeserializeOwned,
{
    type State = AccumulateState<P::State, F, P::Item>;

    fn capture(&self) -> Result<Self::State> {
        Ok(AccumulateState {
            source: self.source.capture()?,
            fold: self.fold.clone(),
            total: self.total.clone(),
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        Ok(Self {
            source: P::restore(state.source)?,
            fold: state.fold,
            total: state.total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zip::Zip;
    use snapiter_core::func::Identity;
    use snapiter_core::sequence::SequenceProducer;

    #[test]
    fn map_applies_transform() {
        let mut m = Map::new(vec![1, 2, 3], |x: i32| x * 10);
        assert_eq!(m.drain_vec().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn map_over_zip_rows() {
        let z = Zip::new(vec![vec![1, 2], vec![10, 20]]);
        let mut m = Map::new(z, |row: Vec<i32>| row.iter().sum::<i32>());
        assert_eq!(m.drain_vec().unwrap(), vec![11, 22]);
    }

    #[test]
    fn map_resumes_with_named_transform() {
        let mut m = Map::new(vec![7u8, 8, 9], Identity);
        m.next().unwrap();
        let mut n = Map::<SequenceProducer<u8>, Identity>::restore(m.capture().unwrap()).unwrap();
        assert_eq!(n.drain_vec().unwrap(), vec![8, 9]);
    }

    #[test]
    fn running_sums_and_custom_fold() {
        assert_eq!(
            Accumulate::new(vec![1, 2, 3, 4]).drain_vec().unwrap(),
            vec![1, 3, 6, 10]
        );
        let max = |a: i32, b: i32| a.max(b);
        assert_eq!(
            Accumulate::with_fold(vec![3, 1, 4, 1, 5], max).drain_vec().unwrap(),
            vec![3, 3, 4, 4, 5]
        );
        assert_eq!(Accumulate::new(Vec::<i32>::new()).next().unwrap(), None);
    }

    fn running_totals<P>(input: P) -> Vec<P::Item>
    where
        P: Producer,
        P::Item: Clone,
        Sum: Fold<P::Item>,
    {
        Accumulate::new(input).drain_vec().unwrap()
    }

    #[test]
    fn running_sums_over_any_addable_producer() {
        assert_eq!(running_totals(SequenceProducer::new(vec![2u64, 3, 5])), vec![2, 5, 10]);
        let doubled = Map::new(vec![1i32, 2, 3], |x: i32| x * 2);
        assert_eq!(running_totals(doubled), vec![2, 6, 12]);
    }

    #[test]
    fn accumulate_resumes_total() {
        let mut a = Accumulate::new(vec![1.5, 2.0, 0.5]);
        a.next().unwrap();
        let json = serde_json::to_string(&a.capture().unwrap()).unwrap();
        let mut b = Accumulate::<SequenceProducer<f64>, Sum>::restore(
            serde_json::from_str(&json).unwrap(),
        )
        .unwrap();
        assert_eq!(b.drain_vec().unwrap(), vec![3.5, 4.0]);
    }
}
