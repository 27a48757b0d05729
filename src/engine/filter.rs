//! Filter: keep the elements of a sequence whose predicate holds.

use super::{Mode, dispatch};
use crate::callable::{Callable, Deferred};
use crate::collection::{Key, Normalize};
use crate::error::Error;

/// A partially-applied filter, waiting for its sequence.
///
/// The predicate receives `(value, Key::Index(i))`. The original elements are
/// kept, not the predicate outcomes, in their original relative order.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::collection::Key;
/// use cofn::engine::Filter;
///
/// # futures::executor::block_on(async {
/// let even = Filter::new(Callable::deferred(|value: i32, _key: Key| async move { value % 2 == 0 }));
/// assert_eq!(even.apply(&vec![1, 2, 3, 4]).await.unwrap(), vec![2, 4]);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Filter<V> {
    callable: Callable<(V, Key), bool>,
    mode: Mode,
}

impl<V> Filter<V>
where
    V: Clone + Send + 'static,
{
    /// Binds the predicate for a parallel filter.
    pub const fn new(callable: Callable<(V, Key), bool>) -> Self {
        Self {
            callable,
            mode: Mode::Parallel,
        }
    }

    /// Binds the predicate for a serial filter.
    pub const fn serial(callable: Callable<(V, Key), bool>) -> Self {
        Self {
            callable,
            mode: Mode::Serial,
        }
    }

    /// The dispatch mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Filters `sequence`.
    pub fn apply<C>(&self, sequence: &C) -> Deferred<Vec<V>, Error>
    where
        C: Normalize<Value = V> + ?Sized,
    {
        run(self.callable.clone(), self.mode, sequence)
    }
}

/// Filters a sequence, evaluating the predicate on every element concurrently.
///
/// # Errors
///
/// Settles with [`Error::TypeMismatch`] unless `sequence` is a sequence, or
/// [`Error::Callable`] if any predicate fails.
pub fn filter<C>(
    callable: Callable<(C::Value, Key), bool>,
    sequence: &C,
) -> Deferred<Vec<C::Value>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Clone + Send + 'static,
{
    run(callable, Mode::Parallel, sequence)
}

/// Filters a sequence one element at a time.
///
/// The next predicate is not issued until the current one settled.
///
/// # Errors
///
/// Same as [`filter`].
pub fn filter_serial<C>(
    callable: Callable<(C::Value, Key), bool>,
    sequence: &C,
) -> Deferred<Vec<C::Value>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Clone + Send + 'static,
{
    run(callable, Mode::Serial, sequence)
}

fn run<C>(
    callable: Callable<(C::Value, Key), bool>,
    mode: Mode,
    sequence: &C,
) -> Deferred<Vec<C::Value>, Error>
where
    C: Normalize + ?Sized,
    C::Value: Clone + Send + 'static,
{
    let operation = mode.operation("filter", "filter_serial");
    let values = dispatch::sequence_of(operation, sequence);

    Box::pin(async move {
        let values = values?;
        tracing::debug!(operation, %mode, elements = values.len(), "dispatching");

        let kept = match mode {
            Mode::Parallel => {
                let arguments = values
                    .iter()
                    .cloned()
                    .enumerate()
                    .map(|(index, value)| (value, Key::Index(index)))
                    .collect();
                let verdicts = dispatch::fan_out(&callable, arguments).await?;
                values
                    .into_iter()
                    .zip(verdicts)
                    .filter_map(|(value, keep)| keep.then_some(value))
                    .collect()
            }
            Mode::Serial => {
                let mut kept = Vec::new();
                for (index, value) in values.into_iter().enumerate() {
                    if callable.invoke((value.clone(), Key::Index(index))).await? {
                        kept.push(value);
                    }
                }
                kept
            }
        };

        tracing::trace!(operation, "settled");
        Ok::<_, Error>(kept)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Mapping;
    use crate::error::TypeMismatchError;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn test_filter_keeps_original_elements() {
        let long_words: Callable<(String, Key), bool> =
            Callable::plain(|word: String, _key: Key| word.len() > 3);
        let words = vec!["tree".to_string(), "ox".to_string(), "river".to_string()];
        let kept = filter(long_words, &words).await.unwrap();
        assert_eq!(kept, vec!["tree".to_string(), "river".to_string()]);
    }

    #[tokio::test]
    async fn test_filter_passes_indices() {
        let odd_positions: Callable<(char, Key), bool> =
            Callable::plain(|_value: char, key: Key| key.as_index().is_some_and(|index| index % 2 == 1));
        let kept = filter(odd_positions, &['a', 'b', 'c', 'd']).await.unwrap();
        assert_eq!(kept, vec!['b', 'd']);
    }

    #[tokio::test]
    async fn test_filter_serial_issues_one_at_a_time() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let predicate: Callable<(i32, Key), bool> = Callable::deferred(move |value: i32, _key: Key| {
            log_clone.lock().unwrap().push(format!("start {value}"));
            let log = Arc::clone(&log_clone);
            async move {
                tokio::task::yield_now().await;
                log.lock().unwrap().push(format!("end {value}"));
                value > 1
            }
        });

        let kept = filter_serial(predicate, &vec![1, 2]).await.unwrap();

        assert_eq!(kept, vec![2]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["start 1", "end 1", "start 2", "end 2"]
        );
    }

    #[tokio::test]
    async fn test_filter_rejects_mapping() {
        let predicate: Callable<(i32, Key), bool> = Callable::plain(|_value: i32, _key: Key| true);
        let mapping: Mapping<i32> = [("a", 1)].into_iter().collect();

        let error = Filter::serial(predicate).apply(&mapping).await.unwrap_err();

        match error {
            Error::TypeMismatch(mismatch) => assert_eq!(
                mismatch,
                TypeMismatchError {
                    operation: "filter_serial",
                    actual: "mapping"
                }
            ),
            other => panic!("unexpected error: {other}"),
        }
    }
}
