//! Function values held by operators.
//!
//! Closures satisfy these traits through blanket impls, which is enough for
//! plain iteration. An operator only becomes `Resumable` when the function
//! value it holds is itself a serializable type, such as [`Identity`] or
//! [`Sum`], or a caller-defined unit struct.
//!
//! Closures taking references need an explicit parameter type
//! (`|x: &i64| *x > 2`) so the compiler infers a signature general over the
//! reference lifetime.

use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Yes/no test on a borrowed element.
pub trait Predicate<T: ?Sized> {
    fn test(&self, item: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool,
{
    fn test(&self, item: &T) -> bool {
        self(item)
    }
}

/// Element-wise transformation.
pub trait Transform<A> {
    type Output;

    fn apply(&self, arg: A) -> Self::Output;
}

impl<A, O, F> Transform<A> for F
where
    F: Fn(A) -> O,
{
    type Output = O;

    fn apply(&self, arg: A) -> O {
        self(arg)
    }
}

/// Grouping key extraction.
pub trait KeyFn<T> {
    type Key: PartialEq;

    fn key(&self, item: &T) -> Self::Key;
}

impl<T, K, F> KeyFn<T> for F
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    type Key = K;

    fn key(&self, item: &T) -> K {
        self(item)
    }
}

/// Binary fold step for running accumulations.
pub trait Fold<T> {
    fn fold(&self, acc: T, item: T) -> T;
}

impl<T, F> Fold<T> for F
where
    F: Fn(T, T) -> T,
{
    fn fold(&self, acc: T, item: T) -> T {
        self(acc, item)
    }
}

/// The element is its own key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity;

impl<T: Clone + PartialEq> KeyFn<T> for Identity {
    type Key = T;

    fn key(&self, item: &T) -> T {
        item.clone()
    }
}

impl<T> Transform<T> for Identity {
    type Output = T;

    fn apply(&self, arg: T) -> T {
        arg
    }
}

/// Addition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sum;

impl<T: Add<Output = T>> Fold<T> for Sum {
    fn fold(&self, acc: T, item: T) -> T {
        acc + item
    }
}
