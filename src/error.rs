//! Error types for the combinators.
//!
//! Every combinator settles with [`Error`] on failure. The three variants
//! correspond to the three ways an invocation can fail:
//!
//! - the operation does not accept the collection shape it was given
//!   ([`TypeMismatchError`]),
//! - the input is not a collection at all ([`UnsupportedCollectionError`]),
//! - the callable (or a future it awaited) failed ([`CallableFailure`]).
//!
//! Failures are surfaced verbatim: nothing in this crate retries or swallows
//! them.

use std::fmt;

/// A boxed error raised by user code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An operation was applied to a collection shape it does not support.
///
/// [`filter`](crate::engine::filter) and [`reduce`](crate::engine::reduce)
/// only accept sequences.
///
/// # Examples
///
/// ```rust
/// use cofn::TypeMismatchError;
///
/// let error = TypeMismatchError {
///     operation: "filter",
///     actual: "mapping",
/// };
/// assert_eq!(
///     format!("{error}"),
///     "filter: you can only filter sequences, given: mapping"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// The name of the operation that rejected the input.
    pub operation: &'static str,
    /// The runtime shape or type that was received.
    pub actual: &'static str,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = self.operation.trim_end_matches("_serial");
        write!(
            formatter,
            "{}: you can only {} sequences, given: {}",
            self.operation, verb, self.actual
        )
    }
}

impl std::error::Error for TypeMismatchError {}

/// The input is neither a sequence nor a mapping.
///
/// # Examples
///
/// ```rust
/// use cofn::UnsupportedCollectionError;
///
/// let error = UnsupportedCollectionError { actual: "number" };
/// assert_eq!(
///     format!("{error}"),
///     "you can only iterate over sequences and mappings, given: number"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedCollectionError {
    /// The runtime type that was received.
    pub actual: &'static str,
}

impl fmt::Display for UnsupportedCollectionError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "you can only iterate over sequences and mappings, given: {}",
            self.actual
        )
    }
}

impl std::error::Error for UnsupportedCollectionError {}

/// A failure raised by a callable or by a deferred result it awaited.
///
/// The original error is kept as-is and can be recovered with
/// [`CallableFailure::downcast_ref`] or [`CallableFailure::into_inner`].
///
/// # Examples
///
/// ```rust
/// use cofn::CallableFailure;
///
/// let failure = CallableFailure::msg("boom");
/// assert_eq!(format!("{failure}"), "boom");
/// ```
#[derive(Debug)]
pub struct CallableFailure {
    source: BoxError,
}

impl CallableFailure {
    /// Wraps any error raised by user code.
    ///
    /// Wrapping a `CallableFailure` again returns it unchanged.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        match error.into().downcast::<Self>() {
            Ok(failure) => *failure,
            Err(source) => Self { source },
        }
    }

    /// Creates a failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }

    /// Returns a reference to the wrapped error if it is of type `E`.
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        self.source.downcast_ref::<E>()
    }

    /// Returns `true` if the wrapped error is of type `E`.
    pub fn is<E>(&self) -> bool
    where
        E: std::error::Error + 'static,
    {
        self.source.is::<E>()
    }

    /// Unwraps the original error.
    pub fn into_inner(self) -> BoxError {
        self.source
    }
}

impl fmt::Display for CallableFailure {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.source)
    }
}

impl std::error::Error for CallableFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// The failure channel of every combinator.
///
/// # Examples
///
/// ```rust
/// use cofn::{Error, UnsupportedCollectionError};
///
/// let error: Error = UnsupportedCollectionError { actual: "string" }.into();
/// assert!(matches!(error, Error::UnsupportedCollection(_)));
/// ```
#[derive(Debug)]
pub enum Error {
    /// The operation does not accept the given collection shape.
    TypeMismatch(TypeMismatchError),
    /// The input is neither a sequence nor a mapping.
    UnsupportedCollection(UnsupportedCollectionError),
    /// The callable failed.
    Callable(CallableFailure),
}

impl Error {
    /// Returns the callable failure, if this is one.
    pub const fn as_callable(&self) -> Option<&CallableFailure> {
        match self {
            Self::Callable(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch(error) => write!(formatter, "{error}"),
            Self::UnsupportedCollection(error) => write!(formatter, "{error}"),
            Self::Callable(failure) => write!(formatter, "callable failed: {failure}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TypeMismatch(error) => Some(error),
            Self::UnsupportedCollection(error) => Some(error),
            Self::Callable(failure) => Some(failure),
        }
    }
}

impl From<TypeMismatchError> for Error {
    fn from(error: TypeMismatchError) -> Self {
        Self::TypeMismatch(error)
    }
}

impl From<UnsupportedCollectionError> for Error {
    fn from(error: UnsupportedCollectionError) -> Self {
        Self::UnsupportedCollection(error)
    }
}

impl From<CallableFailure> for Error {
    fn from(failure: CallableFailure) -> Self {
        Self::Callable(failure)
    }
}
