//! Fan-out dispatch and shape checks shared by the combinators.

use futures::future::try_join_all;

use crate::callable::{Callable, Returned};
use crate::collection::{Normalize, ShapeWitness};
use crate::error::{CallableFailure, TypeMismatchError};

/// Invokes `callable` on every argument list, then awaits all deferred
/// outcomes concurrently.
///
/// Every invocation is issued before anything is awaited. Ready outcomes are
/// stored as they are; only deferred ones go through the join. A ready failure
/// stops the fan-out immediately, otherwise the first failure observed while
/// joining wins and the remaining futures are dropped.
pub(crate) async fn fan_out<Args, T>(
    callable: &Callable<Args, T>,
    arguments: Vec<Args>,
) -> Result<Vec<T>, CallableFailure>
where
    Args: 'static,
    T: Send + 'static,
{
    let mut outcomes: Vec<Option<T>> = Vec::with_capacity(arguments.len());
    let mut slots = Vec::new();
    let mut waiting = Vec::new();

    for (slot, argument) in arguments.into_iter().enumerate() {
        match callable.invoke(argument) {
            Returned::Ready(result) => outcomes.push(Some(result?)),
            Returned::Deferred(future) => {
                outcomes.push(None);
                slots.push(slot);
                waiting.push(future);
            }
        }
    }

    tracing::trace!(
        issued = outcomes.len(),
        deferred = waiting.len(),
        "fan-out issued"
    );

    if !waiting.is_empty() {
        let settled = try_join_all(waiting).await?;
        for (slot, value) in slots.into_iter().zip(settled) {
            outcomes[slot] = Some(value);
        }
    }

    Ok(outcomes.into_iter().flatten().collect())
}

/// Copies the elements of a collection that must be a sequence.
///
/// Mappings and unsupported inputs are both reported as a mismatch for
/// `operation`.
pub(crate) fn sequence_of<C>(
    operation: &'static str,
    collection: &C,
) -> Result<Vec<C::Value>, TypeMismatchError>
where
    C: Normalize + ?Sized,
{
    let mismatch = |actual| TypeMismatchError { operation, actual };
    match collection.shape() {
        Ok(ShapeWitness::Sequence) => collection
            .normalize()
            .map(|normalized| normalized.into_values())
            .map_err(|error| mismatch(error.actual)),
        Ok(shape) => Err(mismatch(shape.name())),
        Err(error) => Err(mismatch(error.actual)),
    }
}
