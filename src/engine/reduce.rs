//! Reduce: thread an accumulator through a sequence, one element at a time.

use super::dispatch;
use crate::callable::{Callable, Deferred};
use crate::collection::Normalize;
use crate::error::Error;

/// A reduce with only its callable bound.
///
/// The callable receives `(accumulator, value, index)` and returns the next
/// accumulator. Supply the initial accumulator with
/// [`starting_with`](Reduce::starting_with), then the sequence.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::engine::Reduce;
///
/// # futures::executor::block_on(async {
/// let sum = Reduce::new(Callable::plain(|total: i32, value: i32, _index: usize| total + value));
/// let from_ten = sum.starting_with(10);
/// assert_eq!(from_ten.apply(&vec![1, 2, 3, 4, 5, 6]).await.unwrap(), 31);
/// assert_eq!(from_ten.apply(&vec![]).await.unwrap(), 10);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Reduce<A, V> {
    callable: Callable<(A, V, usize), A>,
}

impl<A, V> Reduce<A, V>
where
    A: Send + 'static,
    V: Send + 'static,
{
    /// Binds the callable.
    pub const fn new(callable: Callable<(A, V, usize), A>) -> Self {
        Self { callable }
    }

    /// Binds the initial accumulator.
    pub fn starting_with(&self, initial: A) -> ReduceFrom<A, V> {
        ReduceFrom {
            callable: self.callable.clone(),
            initial,
        }
    }

    /// Reduces `sequence` starting from `initial`.
    pub fn apply<C>(&self, initial: A, sequence: &C) -> Deferred<A, Error>
    where
        C: Normalize<Value = V> + ?Sized,
    {
        run(self.callable.clone(), initial, sequence)
    }
}

/// A reduce with its callable and initial accumulator bound, waiting for the
/// sequence.
#[derive(Debug, Clone)]
pub struct ReduceFrom<A, V> {
    callable: Callable<(A, V, usize), A>,
    initial: A,
}

impl<A, V> ReduceFrom<A, V>
where
    A: Clone + Send + 'static,
    V: Send + 'static,
{
    /// The initial accumulator.
    pub const fn initial(&self) -> &A {
        &self.initial
    }

    /// Reduces `sequence`.
    pub fn apply<C>(&self, sequence: &C) -> Deferred<A, Error>
    where
        C: Normalize<Value = V> + ?Sized,
    {
        run(self.callable.clone(), self.initial.clone(), sequence)
    }
}

/// Reduces a sequence serially: `accumulator = callable(accumulator, value, index)`
/// for every element in order, awaiting each step before the next.
///
/// There is no parallel reduce, each step depends on the previous one.
///
/// # Errors
///
/// Settles with [`Error::TypeMismatch`] unless `sequence` is a sequence, or
/// [`Error::Callable`] if any step fails.
pub fn reduce<C, A>(
    callable: Callable<(A, C::Value, usize), A>,
    initial: A,
    sequence: &C,
) -> Deferred<A, Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    A: Send + 'static,
{
    run(callable, initial, sequence)
}

fn run<C, A>(
    callable: Callable<(A, C::Value, usize), A>,
    initial: A,
    sequence: &C,
) -> Deferred<A, Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    A: Send + 'static,
{
    let values = dispatch::sequence_of("reduce", sequence);

    Box::pin(async move {
        let values = values?;
        tracing::debug!(operation = "reduce", elements = values.len(), "dispatching");

        let mut accumulator = initial;
        for (index, value) in values.into_iter().enumerate() {
            accumulator = callable.invoke((accumulator, value, index)).await?;
        }

        tracing::trace!(operation = "reduce", "settled");
        Ok::<_, Error>(accumulator)
    })
}
