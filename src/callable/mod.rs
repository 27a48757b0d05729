//! Callables and their shapes.
//!
//! A [`Callable`] is the unit of work handed to every combinator. It comes in
//! one of three shapes, selected once when the callable is built:
//!
//! - **Plain**: returns its value immediately ([`Callable::plain`],
//!   [`Callable::try_plain`]).
//! - **Deferred-returning**: returns a future ([`Callable::deferred`],
//!   [`Callable::try_deferred`]).
//! - **Suspending**: returns a [`Step`] step-function that pauses at each
//!   awaited value and must be driven to completion
//!   ([`Callable::suspending`]).
//!
//! Plain and deferred-returning callables are both *ordinary*: invoking them
//! yields a [`Returned`] value that is classified at call time as either ready
//! or deferred. [`Callable::ordinary`] exposes that choice directly, so one
//! function may answer some calls immediately and defer others.
//!
//! [`Callable::invoke`] is the single seam through which all three shapes
//! become callable uniformly: suspending callables are adapted into a deferred
//! result by [`Step::drive`], ordinary ones are passed through untouched.
//!
//! # Examples
//!
//! ```rust
//! use cofn::callable::{Callable, CallableShape, Step};
//! use cofn::collection::Key;
//!
//! let double: Callable<(i32, Key), i32> = Callable::plain(|value: i32, _key: Key| value * 2);
//! assert_eq!(double.shape(), CallableShape::Ordinary);
//! assert!(!double.invoke((21, Key::Index(0))).is_deferred());
//!
//! let later: Callable<(i32, Key), i32> = Callable::suspending(|value: i32, _key: Key| {
//!     Step::suspend(async move { value * 2 }, Step::done)
//! });
//! assert_eq!(later.shape(), CallableShape::Suspending);
//! assert!(later.invoke((21, Key::Index(0))).is_deferred());
//! ```

mod step;

pub use step::{Drive, Step};

use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::Arc;

use futures::TryFutureExt;
use futures::future::{BoxFuture, Either, Ready, ready};

use crate::error::{BoxError, CallableFailure};

/// A deferred result: a boxed, sendable future settling with a value or a failure.
pub type Deferred<T, E = CallableFailure> = BoxFuture<'static, Result<T, E>>;

// =============================================================================
// Invoke
// =============================================================================

/// Calls a function with its arguments packed in a tuple.
///
/// This trait is implemented for every `Fn` of one to four arguments, so
/// `Fn(A, B) -> R` implements `Invoke<(A, B), R>`. It lets [`Callable`] be
/// generic over the argument list while callers keep writing ordinary
/// closures.
pub trait Invoke<Args, R>: Send + Sync + 'static {
    /// Calls the function.
    fn invoke(&self, arguments: Args) -> R;
}

macro_rules! impl_invoke {
    ($($argument:ident),+) => {
        impl<Function, Output, $($argument),+> Invoke<($($argument,)+), Output> for Function
        where
            Function: Fn($($argument),+) -> Output + Send + Sync + 'static,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn invoke(&self, ($($argument,)+): ($($argument,)+)) -> Output {
                self($($argument),+)
            }
        }
    };
}

impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);

// =============================================================================
// Returned
// =============================================================================

/// What one invocation of an ordinary callable produced.
///
/// The variant is the call-time classification: a ready value needs no
/// awaiting, a deferred one must be resolved before use. `Returned` implements
/// [`IntoFuture`] so either variant can be awaited uniformly.
pub enum Returned<T> {
    /// The call settled immediately.
    Ready(Result<T, CallableFailure>),
    /// The call produced a deferred result.
    Deferred(Deferred<T>),
}

impl<T> Returned<T> {
    /// A ready, successful result.
    pub const fn ready(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    /// A ready failure.
    pub fn failed(error: impl Into<BoxError>) -> Self {
        Self::Ready(Err(CallableFailure::new(error)))
    }

    /// A deferred result from an infallible future.
    pub fn deferred<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::Deferred(Box::pin(async move { Ok(future.await) }))
    }

    /// Returns `true` if the value must be awaited before use.
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Boxes the result as a [`Deferred`], wrapping ready values if needed.
    pub fn into_deferred(self) -> Deferred<T>
    where
        T: Send + 'static,
    {
        match self {
            Self::Ready(result) => Box::pin(ready(result)),
            Self::Deferred(future) => future,
        }
    }
}

impl<T> IntoFuture for Returned<T> {
    type Output = Result<T, CallableFailure>;
    type IntoFuture = Either<Ready<Result<T, CallableFailure>>, Deferred<T>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Self::Ready(result) => Either::Left(ready(result)),
            Self::Deferred(future) => Either::Right(future),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Returned<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => formatter.debug_tuple("Ready").field(result).finish(),
            Self::Deferred(_) => formatter.write_str("Deferred(<future>)"),
        }
    }
}

// =============================================================================
// Callable
// =============================================================================

/// The static shape of a callable, known before it is ever called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallableShape {
    /// Returns a value or a deferred result directly.
    Ordinary,
    /// Returns a step-function that must be driven to completion.
    Suspending,
}

impl fmt::Display for CallableShape {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinary => formatter.write_str("ordinary"),
            Self::Suspending => formatter.write_str("suspending"),
        }
    }
}

type OrdinaryFn<Args, T> = Arc<dyn Fn(Args) -> Returned<T> + Send + Sync>;
type SuspendingFn<Args, T> = Arc<dyn Fn(Args) -> Step<T> + Send + Sync>;

enum Kind<Args, T> {
    Ordinary(OrdinaryFn<Args, T>),
    Suspending(SuspendingFn<Args, T>),
}

/// A shared, immutable unit of work taking the argument tuple `Args` and
/// producing a `T`.
///
/// Cloning a `Callable` is cheap: the function is reference counted.
///
/// The combinators use these argument lists:
///
/// | Combinator | `Args` |
/// |---|---|
/// | map, filter, for_each | `(value, Key)` |
/// | reduce | `(accumulator, value, usize)` |
pub struct Callable<Args, T> {
    kind: Kind<Args, T>,
}

impl<Args, T> Clone for Callable<Args, T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Ordinary(function) => Kind::Ordinary(Arc::clone(function)),
            Kind::Suspending(function) => Kind::Suspending(Arc::clone(function)),
        };
        Self { kind }
    }
}

impl<Args, T> fmt::Debug for Callable<Args, T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Callable")
            .field("shape", &self.shape())
            .finish_non_exhaustive()
    }
}

impl<Args, T> Callable<Args, T> {
    /// Reports whether this callable is a suspending step-function.
    pub const fn shape(&self) -> CallableShape {
        match self.kind {
            Kind::Ordinary(_) => CallableShape::Ordinary,
            Kind::Suspending(_) => CallableShape::Suspending,
        }
    }

    /// Shorthand for `shape() == CallableShape::Suspending`.
    pub const fn is_suspending(&self) -> bool {
        matches!(self.kind, Kind::Suspending(_))
    }

    pub(crate) fn from_ordinary(function: OrdinaryFn<Args, T>) -> Self {
        Self {
            kind: Kind::Ordinary(function),
        }
    }
}

impl<Args: 'static, T: Send + 'static> Callable<Args, T> {
    /// Builds a callable from a function returning its value immediately.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cofn::callable::Callable;
    ///
    /// let add: Callable<(i32, i32, usize), i32> =
    ///     Callable::plain(|accumulator: i32, value: i32, _index: usize| accumulator + value);
    /// assert!(!add.is_suspending());
    /// ```
    pub fn plain<F>(function: F) -> Self
    where
        F: Invoke<Args, T>,
    {
        Self::from_ordinary(Arc::new(move |arguments| {
            Returned::ready(function.invoke(arguments))
        }))
    }

    /// Builds a callable from a function that may fail immediately.
    pub fn try_plain<F, E>(function: F) -> Self
    where
        F: Invoke<Args, Result<T, E>>,
        E: Into<BoxError>,
    {
        Self::from_ordinary(Arc::new(move |arguments| {
            Returned::Ready(function.invoke(arguments).map_err(CallableFailure::new))
        }))
    }

    /// Builds a callable from a function returning a future.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cofn::callable::Callable;
    /// use cofn::collection::Key;
    ///
    /// let double: Callable<(i32, Key), i32> =
    ///     Callable::deferred(|value: i32, _key: Key| async move { value * 2 });
    /// assert!(double.invoke((1, Key::Index(0))).is_deferred());
    /// ```
    pub fn deferred<F, Fut>(function: F) -> Self
    where
        F: Invoke<Args, Fut>,
        Fut: Future<Output = T> + Send + 'static,
    {
        Self::from_ordinary(Arc::new(move |arguments| {
            Returned::deferred(function.invoke(arguments))
        }))
    }

    /// Builds a callable from a function returning a fallible future.
    pub fn try_deferred<F, Fut, E>(function: F) -> Self
    where
        F: Invoke<Args, Fut>,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::from_ordinary(Arc::new(move |arguments| {
            Returned::Deferred(Box::pin(
                function.invoke(arguments).map_err(CallableFailure::new),
            ))
        }))
    }

    /// Builds a callable that decides per call whether to answer immediately.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cofn::callable::{Callable, Returned};
    /// use cofn::collection::Key;
    ///
    /// let cached: Callable<(i32, Key), i32> = Callable::ordinary(|value: i32, _key: Key| {
    ///     if value < 10 {
    ///         Returned::ready(value)
    ///     } else {
    ///         Returned::deferred(async move { value })
    ///     }
    /// });
    /// assert!(!cached.invoke((1, Key::Index(0))).is_deferred());
    /// assert!(cached.invoke((11, Key::Index(1))).is_deferred());
    /// ```
    pub fn ordinary<F>(function: F) -> Self
    where
        F: Invoke<Args, Returned<T>>,
    {
        Self::from_ordinary(Arc::new(move |arguments| function.invoke(arguments)))
    }

    /// Builds a callable from a suspending step-function.
    ///
    /// Each invocation runs the function up to its first suspension point and
    /// returns a deferred result that drives the rest.
    pub fn suspending<F>(function: F) -> Self
    where
        F: Invoke<Args, Step<T>>,
    {
        Self {
            kind: Kind::Suspending(Arc::new(move |arguments| function.invoke(arguments))),
        }
    }

    /// Invokes the callable.
    ///
    /// Ordinary callables return whatever they produced, ready values stay
    /// unwrapped. Suspending callables are driven by [`Step::drive`] and always
    /// come back deferred.
    pub fn invoke(&self, arguments: Args) -> Returned<T> {
        match &self.kind {
            Kind::Ordinary(function) => function(arguments),
            Kind::Suspending(function) => Returned::Deferred(Box::pin(function(arguments).drive())),
        }
    }

    /// Invokes the callable and returns its outcome as a [`Deferred`].
    pub fn call(&self, arguments: Args) -> Deferred<T> {
        self.invoke(arguments).into_deferred()
    }
}

static_assertions::assert_impl_all!(Callable<(i32, crate::collection::Key), i32>: Send, Sync, Clone);
static_assertions::assert_impl_all!(Returned<String>: Send);
