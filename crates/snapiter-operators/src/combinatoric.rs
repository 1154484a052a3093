//! Permutations and combinations as filters over index tuples.
//!
//! The input is drained into a pool up front. An index source (a product of
//! `0..n`, or permutations of it) proposes tuples of pool indices and a rule
//! accepts or rejects each one; accepted tuples are mapped back through the
//! pool. Progress is then entirely the index source's progress.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use snapiter_core::{wrap, Error, IntoProducer, Producer, RangeProducer, RangeSpec, Result, Resumable};

use crate::product::Product;
use crate::tee::TeeConsumer;

/// Acceptance test for an index tuple.
pub trait IndexRule: Default {
    fn accepts(&self, indices: &[i64]) -> bool;
}

/// Pairwise distinct indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Distinct;

impl IndexRule for Distinct {
    fn accepts(&self, indices: &[i64]) -> bool {
        indices
            .iter()
            .enumerate()
            .all(|(i, a)| !indices[..i].contains(a))
    }
}

/// Strictly increasing indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ascending;

impl IndexRule for Ascending {
    fn accepts(&self, indices: &[i64]) -> bool {
        indices.windows(2).all(|w| w[0] < w[1])
    }
}

/// Non-decreasing indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonDecreasing;

impl IndexRule for NonDecreasing {
    fn accepts(&self, indices: &[i64]) -> bool {
        indices.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Index tuples over `0..n`, `r` positions, every combination.
pub type IndexProduct = Product<TeeConsumer<RangeProducer>>;

/// Producer of index tuples that can report whether everything it holds or
/// will still propose indexes a pool of `n` elements.
pub trait IndexSource: Producer<Item = Vec<i64>> {
    fn indexes_within(&self, n: usize) -> Result<bool>;
}

fn pool_bound(n: usize) -> Result<i64> {
    i64::try_from(n).map_err(|_| Error::Restore(format!("pool of {n} elements is too large")))
}

impl IndexSource for IndexProduct {
    fn indexes_within(&self, n: usize) -> Result<bool> {
        let n = pool_bound(n)?;
        for (source, drawn) in self.dimensions() {
            if !drawn.iter().all(|i| (0..n).contains(i)) {
                return Ok(false);
            }
            if !source.group_satisfies(|r| r.remaining_within(0..n), |i| (0..n).contains(i))? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<S, R> IndexSource for IndexBased<i64, S, R>
where
    S: IndexSource,
    R: IndexRule,
{
    fn indexes_within(&self, n: usize) -> Result<bool> {
        let n = pool_bound(n)?;
        Ok(self.pool.iter().all(|i| (0..n).contains(i))
            && self.source.indexes_within(self.pool.len())?)
    }
}

/// Pool elements selected by accepted index tuples.
pub struct IndexBased<T, S, R> {
    pool: Arc<[T]>,
    source: S,
    rule: R,
}

pub type Permutations<T> = IndexBased<T, IndexProduct, Distinct>;
pub type Combinations<T> = IndexBased<T, Permutations<i64>, Ascending>;
pub type CombinationsWithReplacement<T> = IndexBased<T, IndexProduct, NonDecreasing>;

fn drain_pool<I: IntoProducer>(input: I) -> Result<Vec<I::Item>> {
    wrap(input).drain_vec()
}

fn index_product(n: usize, r: usize) -> Result<IndexProduct> {
    let n = i64::try_from(n)
        .map_err(|_| Error::InvalidArgument(format!("pool of {n} elements is too large")))?;
    Product::with_repeat([RangeSpec::up_to(n)], r)
}

/// Successive `r`-length orderings of the input's elements; `r` defaults to
/// the input's length. `r` larger than the input yields nothing.
pub fn permutations<I>(input: I, r: Option<usize>) -> Result<Permutations<I::Item>>
where
    I: IntoProducer,
    I::Item: Clone,
{
    let pool = drain_pool(input)?;
    let n = pool.len();
    let r = r.unwrap_or(n);
    // r > n can never be distinct; index over an empty range instead.
    let source = index_product(if r > n { 0 } else { n }, r)?;
    Ok(IndexBased::new(pool, source))
}

/// `r`-length subsequences in input order.
pub fn combinations<I>(input: I, r: usize) -> Result<Combinations<I::Item>>
where
    I: IntoProducer,
    I::Item: Clone,
{
    let pool = drain_pool(input)?;
    let n = pool.len();
    let indices: Vec<i64> = if r > n {
        Vec::new()
    } else {
        (0..n as i64).collect()
    };
    let source = permutations(indices, Some(r))?;
    Ok(IndexBased::new(pool, source))
}

/// `r`-length subsequences where elements may repeat.
pub fn combinations_with_replacement<I>(
    input: I,
    r: usize,
) -> Result<CombinationsWithReplacement<I::Item>>
where
    I: IntoProducer,
    I::Item: Clone,
{
    let pool = drain_pool(input)?;
    let source = index_product(pool.len(), r)?;
    Ok(IndexBased::new(pool, source))
}

impl<T, S, R: IndexRule> IndexBased<T, S, R> {
    fn new(pool: Vec<T>, source: S) -> Self {
        Self {
            pool: Arc::from(pool),
            source,
            rule: R::default(),
        }
    }
}

impl<T, S, R> Producer for IndexBased<T, S, R>
where
    T: Clone,
    S: Producer<Item = Vec<i64>>,
    R: IndexRule,
{
    type Item = Vec<T>;

    fn next(&mut self) -> Result<Option<Vec<T>>> {
        while let Some(indices) = self.source.next()? {
            if !self.rule.accepts(&indices) {
                continue;
            }
            let picked = indices
                .iter()
                .map(|&i| {
                    usize::try_from(i)
                        .ok()
                        .and_then(|i| self.pool.get(i))
                        .cloned()
                        .ok_or_else(|| {
                            Error::Restore(format!("index {i} outside pool"))
                        })
                })
                .collect::<Result<Vec<T>>>()?;
            return Ok(Some(picked));
        }
        Ok(None)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize, S: Serialize",
    deserialize = "T: DeserializeOwned, S: DeserializeOwned"
))]
pub struct IndexBasedState<T, S> {
    pub pool: Arc<[T]>,
    pub source: S,
}

impl<T, S, R> Resumable for IndexBased<T, S, R>
where
    T: Clone + Serialize + DeserializeOwned,
    S: Resumable<Item = Vec<i64>> + IndexSource,
    R: IndexRule,
{
    type State = IndexBasedState<T, S::State>;

    fn capture(&self) -> Result<Self::State> {
        Ok(IndexBasedState {
            pool: Arc::clone(&self.pool),
            source: self.source.capture()?,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        let source = S::restore(state.source)?;
        if !source.indexes_within(state.pool.len())? {
            return Err(Error::Restore(format!(
                "index source reaches past a pool of {} elements",
                state.pool.len()
            )));
        }
        Ok(Self {
            pool: state.pool,
            source,
            rule: R::default(),
        })
    }
}
