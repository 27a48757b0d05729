//! Composition of callables.
//!
//! - [`Callable::and_then`] feeds one callable's resolved result into the next.
//! - [`compose!`](crate::compose!) composes any number of callables right to left.
//! - [`bind`] and [`lazy_bind`] fix a leading context argument.
//!
//! Every link in a chain may be plain, deferred-returning or suspending; each
//! intermediate result is resolved before it is passed on.
//!
//! # Examples
//!
//! ```rust
//! use cofn::callable::{Callable, Step};
//! use cofn::compose;
//!
//! # futures::executor::block_on(async {
//! let add_one: Callable<(i32,), i32> = Callable::deferred(|value: i32| async move { value + 1 });
//! let add_two: Callable<(i32,), i32> =
//!     Callable::suspending(|value: i32| Step::suspend(async move { value + 1 }, |value| Step::done(value + 1)));
//! let sum: Callable<(i32, i32), i32> = Callable::plain(|left: i32, right: i32| left + right);
//!
//! let composed = compose!(add_one, add_two, sum);
//! assert_eq!(composed.call((1, 1)).await.unwrap(), 5);
//! # });
//! ```

mod bind;

pub use bind::{bind, lazy_bind};

use std::sync::Arc;

use crate::callable::{Callable, Returned};

impl<Args: 'static, T: Send + 'static> Callable<Args, T> {
    /// Returns a callable that invokes `self`, resolves its result, and passes
    /// it to `next`.
    ///
    /// Ready results are handed to `next` synchronously, so chaining plain
    /// callables stays plain. A failure of either link fails the chain and
    /// `next` is never called after `self` failed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cofn::callable::Callable;
    ///
    /// # futures::executor::block_on(async {
    /// let parse: Callable<(&'static str,), i32> =
    ///     Callable::try_plain(|text: &'static str| text.parse::<i32>());
    /// let double: Callable<(i32,), i32> = Callable::deferred(|value: i32| async move { value * 2 });
    ///
    /// let chain = parse.and_then(double);
    /// assert_eq!(chain.call(("21",)).await.unwrap(), 42);
    /// assert!(chain.call(("x",)).await.is_err());
    /// # });
    /// ```
    #[must_use]
    pub fn and_then<U: Send + 'static>(self, next: Callable<(T,), U>) -> Callable<Args, U> {
        Callable::from_ordinary(Arc::new(move |arguments| match self.invoke(arguments) {
            Returned::Ready(Ok(value)) => next.invoke((value,)),
            Returned::Ready(Err(failure)) => Returned::Ready(Err(failure)),
            Returned::Deferred(pending) => {
                let next = next.clone();
                Returned::Deferred(Box::pin(async move {
                    let value = pending.await?;
                    next.invoke((value,)).await
                }))
            }
        }))
    }
}

/// Composes callables from right to left.
///
/// `compose!(f, g, h)` calls `h` with the caller's arguments, then `g` with
/// its resolved result, then `f`. The right-most callable may take any
/// argument tuple; every other one takes a single argument `(T,)`.
///
/// - `compose!(f)` returns `f` unchanged.
/// - `compose!(f, g)` is `g.and_then(f)`.
/// - `compose!(f, g, h, ...)` composes any number of callables.
///
/// # Examples
///
/// ```rust
/// use cofn::callable::Callable;
/// use cofn::compose;
///
/// # futures::executor::block_on(async {
/// let length: Callable<(String,), usize> = Callable::plain(|text: String| text.len());
/// let render: Callable<(i32,), String> = Callable::plain(|value: i32| value.to_string());
///
/// let digits = compose!(length, render);
/// assert_eq!(digits.call((12345,)).await.unwrap(), 5);
/// # });
/// ```
#[macro_export]
macro_rules! compose {
    ($callable:expr $(,)?) => {
        $callable
    };

    ($outer:expr, $($remaining:expr),+ $(,)?) => {
        $crate::compose!($($remaining),+).and_then($outer)
    };
}
