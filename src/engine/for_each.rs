//! `ForEach`: run a callable on every element for its side effects.

use super::{Mode, dispatch};
use crate::callable::{Callable, Deferred};
use crate::collection::{Key, Normalize};
use crate::error::Error;

/// A partially-applied `for_each`, waiting for its collection.
///
/// Whatever the callable returns is discarded; success means every call
/// settled without failure.
#[derive(Debug, Clone)]
pub struct ForEach<V, T> {
    callable: Callable<(V, Key), T>,
    mode: Mode,
}

impl<V, T> ForEach<V, T>
where
    V: Send + 'static,
    T: Send + 'static,
{
    /// Binds the callable for a parallel `for_each`.
    pub const fn new(callable: Callable<(V, Key), T>) -> Self {
        Self {
            callable,
            mode: Mode::Parallel,
        }
    }

    /// Binds the callable for a serial `for_each`.
    pub const fn serial(callable: Callable<(V, Key), T>) -> Self {
        Self {
            callable,
            mode: Mode::Serial,
        }
    }

    /// The dispatch mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Runs over `collection`.
    pub fn apply<C>(&self, collection: &C) -> Deferred<(), Error>
    where
        C: Normalize<Value = V> + ?Sized,
    {
        run(self.callable.clone(), self.mode, collection)
    }
}

/// Invokes the callable on every element of a sequence or mapping
/// concurrently and settles once all calls did.
///
/// # Errors
///
/// Settles with [`Error::UnsupportedCollection`] if `collection` is not a
/// collection, or [`Error::Callable`] with the first failure observed.
pub fn for_each<C, T>(callable: Callable<(C::Value, Key), T>, collection: &C) -> Deferred<(), Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    run(callable, Mode::Parallel, collection)
}

/// Invokes the callable on every element one at a time, in order.
///
/// # Errors
///
/// Same as [`for_each`]; elements after a failing one are never visited.
pub fn for_each_serial<C, T>(
    callable: Callable<(C::Value, Key), T>,
    collection: &C,
) -> Deferred<(), Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    run(callable, Mode::Serial, collection)
}

fn run<C, T>(callable: Callable<(C::Value, Key), T>, mode: Mode, collection: &C) -> Deferred<(), Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    let operation = mode.operation("for_each", "for_each_serial");
    let normalized = collection.normalize();

    Box::pin(async move {
        let (shape, pairs) = normalized?.into_parts();
        tracing::debug!(operation, %mode, %shape, elements = pairs.len(), "dispatching");

        match mode {
            Mode::Parallel => {
                let arguments = pairs
                    .into_iter()
                    .map(|(key, value)| (value, key))
                    .collect();
                dispatch::fan_out(&callable, arguments).await?;
            }
            Mode::Serial => {
                for (key, value) in pairs {
                    callable.invoke((value, key)).await?;
                }
            }
        }

        tracing::trace!(operation, "settled");
        Ok::<_, Error>(())
    })
}
