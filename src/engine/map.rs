//! Map: transform every element while keeping the collection's shape.

use super::{Mode, dispatch};
use crate::callable::{Callable, Deferred};
use crate::collection::{Collection, Key, Normalize};
use crate::error::Error;

/// A partially-applied map, waiting for its collection.
///
/// The callable receives `(value, key)` for every element. Sequences come back
/// as sequences in the same order, mappings come back with the same keys.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::collection::{Collection, Key, Mapping};
/// use cofn::engine::Map;
///
/// # futures::executor::block_on(async {
/// let describe = Map::serial(Callable::plain(|value: i32, key: Key| format!("{value}{key}")));
///
/// let mapping: Mapping<i32> = [("a", 1), ("b", 2)].into_iter().collect();
/// let expected: Mapping<String> = [("a", "1a".to_string()), ("b", "2b".to_string())]
///     .into_iter()
///     .collect();
/// assert_eq!(describe.apply(&mapping).await.unwrap(), Collection::Mapping(expected));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Map<V, T> {
    callable: Callable<(V, Key), T>,
    mode: Mode,
}

impl<V, T> Map<V, T>
where
    V: Send + 'static,
    T: Send + 'static,
{
    /// Binds the callable for a parallel map.
    pub const fn new(callable: Callable<(V, Key), T>) -> Self {
        Self {
            callable,
            mode: Mode::Parallel,
        }
    }

    /// Binds the callable for a serial map.
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

    /// Maps over `collection`.
    ///
    /// The collection is copied before this returns; the caller's value is
    /// never touched again.
    pub fn apply<C>(&self, collection: &C) -> Deferred<Collection<T>, Error>
    where
        C: Normalize<Value = V> + ?Sized,
    {
        run(self.callable.clone(), self.mode, collection)
    }
}

/// Maps over a sequence or mapping, invoking the callable on every element
/// concurrently.
///
/// Results are reassembled in input order regardless of completion order. The
/// first failure fails the whole map.
///
/// # Errors
///
/// Settles with [`Error::UnsupportedCollection`] if `collection` is not a
/// collection, or [`Error::Callable`] if any call fails.
pub fn map<C, T>(
    callable: Callable<(C::Value, Key), T>,
    collection: &C,
) -> Deferred<Collection<T>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    run(callable, Mode::Parallel, collection)
}

/// Maps over a sequence or mapping one element at a time.
///
/// Each call settles before the next one is issued.
///
/// # Errors
///
/// Same as [`map`].
pub fn map_serial<C, T>(
    callable: Callable<(C::Value, Key), T>,
    collection: &C,
) -> Deferred<Collection<T>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    run(callable, Mode::Serial, collection)
}

fn run<C, T>(
    callable: Callable<(C::Value, Key), T>,
    mode: Mode,
    collection: &C,
) -> Deferred<Collection<T>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Send + 'static,
    T: Send + 'static,
{
    let operation = mode.operation("map", "map_serial");
    let normalized = collection.normalize();

    Box::pin(async move {
        let (shape, pairs) = normalized?.into_parts();
        tracing::debug!(operation, %mode, %shape, elements = pairs.len(), "dispatching");

        let results: Vec<(Key, T)> = match mode {
            Mode::Parallel => {
                let keys: Vec<Key> = pairs.iter().map(|(key, _)| key.clone()).collect();
                let arguments = pairs
                    .into_iter()
                    .map(|(key, value)| (value, key))
                    .collect();
                let values = dispatch::fan_out(&callable, arguments).await?;
                keys.into_iter().zip(values).collect()
            }
            Mode::Serial => {
                let mut working = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    let result = callable.invoke((value, key.clone())).await?;
                    working.push((key, result));
                }
                working
            }
        };

        tracing::trace!(operation, "settled");
        Ok::<_, Error>(shape.reassemble(results))
    })
}
