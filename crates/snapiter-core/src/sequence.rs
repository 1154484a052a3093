//! Snapshot-capable wrapper over an in-memory sequence.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::contract::{Producer, Resumable};
use crate::error::{Error, Result};

/// Walks a shared sequence with a cursor. Cloning shares the backing slice.
#[derive(Debug, Clone)]
pub struct SequenceProducer<T> {
    items: Arc<[T]>,
    cursor: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceState<T> {
    pub items: Arc<[T]>,
    pub cursor: usize,
}

impl<T> SequenceProducer<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::from_shared(Arc::from(items))
    }

    pub fn from_shared(items: Arc<[T]>) -> Self {
        Self { items, cursor: 0 }
    }

    /// Number of elements already produced.
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<T: Clone> Producer for SequenceProducer<T> {
    type Item = T;

    fn next(&mut self) -> Result<Option<T>> {
        match self.items.get(self.cursor) {
            Some(item) => {
                self.cursor += 1;
                Ok(Some(item.clone()))
            }
            None => Ok(None),
        }
    }
}

impl<T> Resumable for SequenceProducer<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    type State = SequenceState<T>;

    fn capture(&self) -> Result<Self::State> {
        Ok(SequenceState {
            items: Arc::clone(&self.items),
            cursor: self.cursor,
        })
    }

    fn restore(state: Self::State) -> Result<Self> {
        if state.cursor > state.items.len() {
            return Err(Error::Restore(format!(
                "sequence cursor {} past end {}",
                state.cursor,
                state.items.len()
            )));
        }
        Ok(Self {
            items: state.items,
            cursor: state.cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resumes_mid_sequence() {
        let mut p = SequenceProducer::new(vec!["a".to_string(), "b".into(), "c".into()]);
        assert_eq!(p.next().unwrap().as_deref(), Some("a"));
        let state = p.capture().unwrap();
        let json = serde_json::to_string(&state).unwrap();
        let back: SequenceState<String> = serde_json::from_str(&json).unwrap();
        let mut q = SequenceProducer::restore(back).unwrap();
        assert_eq!(q.drain_vec().unwrap(), vec!["b", "c"]);
        assert_eq!(p.drain_vec().unwrap(), vec!["b", "c"]);
    }

    #[test]
    fn exhaustion_is_idempotent() {
        let mut p = SequenceProducer::new(vec![1]);
        assert_eq!(p.next().unwrap(), Some(1));
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.next().unwrap(), None);
        assert_eq!(p.position(), 1);
    }

    #[test]
    fn rejects_cursor_out_of_bounds() {
        let state = SequenceState {
            items: Arc::from(vec![1, 2]),
            cursor: 3,
        };
        assert!(matches!(SequenceProducer::restore(state), Err(Error::Restore(_))));
    }
}
