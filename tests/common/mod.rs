//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::cell::Cell;
use std::fmt::Debug;
use std::rc::Rc;

use snapiter::prelude::*;
use snapiter::snapiter_store::Codec;

/// Run `make()` for `steps` elements, capture it through JSON, restore, and
/// check the restored producer yields the same remainder as the original.
pub fn assert_resumes_json<P, F>(mut make: F, steps: usize)
where
    P: Resumable,
    P::Item: PartialEq + Debug,
    F: FnMut() -> P,
{
    let mut original = make();
    original.take_vec(steps).unwrap();
    let state = original.capture().unwrap();
    let json = serde_json::to_vec(&state).unwrap();
    let mut restored = P::restore(serde_json::from_slice(&json).unwrap()).unwrap();

    let mut reference = make();
    reference.take_vec(steps).unwrap();
    let expected = reference.drain_vec().unwrap();

    assert_eq!(restored.drain_vec().unwrap(), expected);
    assert_eq!(original.drain_vec().unwrap(), expected);
}

/// Same as [`assert_resumes_json`] but through envelope bytes.
pub fn assert_resumes_bytes<P>(mut original: P, steps: usize)
where
    P: Resumable,
    P::Item: PartialEq + Debug,
{
    original.take_vec(steps).unwrap();
    let bytes = Snapshot::capture(&original, Codec::None).unwrap().to_bytes();
    let mut restored: P = Snapshot::from_bytes(&bytes).unwrap().restore().unwrap();
    assert_eq!(restored.drain_vec().unwrap(), original.drain_vec().unwrap());
}

/// Sequence producer that counts how often it is asked for an element.
pub struct Counted<T> {
    inner: SequenceProducer<T>,
    pub pulls: Rc<Cell<usize>>,
}

impl<T> Counted<T> {
    pub fn new(items: Vec<T>) -> (Self, Rc<Cell<usize>>) {
        let pulls = Rc::new(Cell::new(0));
        (
            Self {
                inner: SequenceProducer::new(items),
                pulls: Rc::clone(&pulls),
            },
            pulls,
        )
    }
}

impl<T: Clone> Producer for Counted<T> {
    type Item = T;

    fn next(&mut self) -> snapiter::Result<Option<T>> {
        self.pulls.set(self.pulls.get() + 1);
        self.inner.next()
    }
}
