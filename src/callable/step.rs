//! Suspending step-functions and the driver that runs them.
//!
//! A [`Step`] describes a computation that pauses whenever it needs the value
//! of a deferred result. Each pause holds the awaited future together with
//! the code that resumes once the value is known, the same way a
//! [`Trampoline`](https://en.wikipedia.org/wiki/Trampoline_(computing)) holds
//! its next thunk.
//!
//! [`Step::drive`] turns a step-function into a future: it resumes the
//! computation at every suspension point, feeding back the resolved value,
//! until the computation is done. Driving is a loop and chained continuations
//! are kept in a flat queue, so neither long chains of suspensions nor long
//! [`and_then`](Step::and_then) chains grow the stack.
//!
//! # Examples
//!
//! ```rust
//! use cofn::callable::Step;
//!
//! # futures::executor::block_on(async {
//! let step = Step::suspend(async { 20 }, |twenty| {
//!     Step::suspend(async { 22 }, move |twenty_two| Step::done(twenty + twenty_two))
//! });
//! assert_eq!(step.drive().await.unwrap(), 42);
//! # });
//! ```

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::TryFutureExt;

use super::Deferred;
use crate::error::{BoxError, CallableFailure};

// =============================================================================
// Machine
// =============================================================================

type Value = Box<dyn Any + Send>;
type Resume = Box<dyn FnOnce(Value) -> Machine + Send>;

/// The type-erased state behind every `Step<T>`.
///
/// `pending` holds the continuations still to run once `head` has produced a
/// value, outermost last. Chaining appends to the queue instead of wrapping
/// the head, so a chain of any length stays one level deep.
struct Machine {
    head: Head,
    pending: VecDeque<Resume>,
}

enum Head {
    Done(Result<Value, CallableFailure>),
    Suspend(Deferred<Machine>),
}

impl Machine {
    const fn finished(result: Result<Value, CallableFailure>) -> Self {
        Self {
            head: Head::Done(result),
            pending: VecDeque::new(),
        }
    }

    const fn suspended(future: Deferred<Self>) -> Self {
        Self {
            head: Head::Suspend(future),
            pending: VecDeque::new(),
        }
    }

    /// Runs this machine's own continuations first, then `rest`.
    fn followed_by(mut self, mut rest: VecDeque<Resume>) -> Self {
        while let Some(resume) = self.pending.pop_back() {
            rest.push_front(resume);
        }
        self.pending = rest;
        self
    }
}

fn downcast<T: 'static>(value: Value) -> Result<T, CallableFailure> {
    value.downcast::<T>().map(|value| *value).map_err(|_| {
        CallableFailure::msg(format!(
            "step-function settled with a value that is not a `{}`",
            std::any::type_name::<T>()
        ))
    })
}

// =============================================================================
// Step
// =============================================================================

/// A suspending step-function producing a `T`.
///
/// Build one with [`Step::done`], [`Step::fail`] or one of the suspension
/// constructors, chain further work with [`Step::and_then`] or [`Step::map`],
/// and run it with [`Step::drive`].
#[must_use = "step-functions do nothing unless driven"]
pub struct Step<T> {
    machine: Machine,
    output: PhantomData<fn() -> T>,
}

impl<T> Step<T> {
    const fn from_machine(machine: Machine) -> Self {
        Self {
            machine,
            output: PhantomData,
        }
    }

    /// Returns `true` if no suspension point remains.
    pub fn is_done(&self) -> bool {
        matches!(self.machine.head, Head::Done(_)) && self.machine.pending.is_empty()
    }
}

impl<T: Send + 'static> Step<T> {
    /// Finishes with a value.
    #[inline]
    pub fn done(value: T) -> Self {
        Self::from_machine(Machine::finished(Ok(Box::new(value))))
    }

    /// Finishes with a failure.
    pub fn fail(error: impl Into<BoxError>) -> Self {
        Self::from_machine(Machine::finished(Err(CallableFailure::new(error))))
    }

    /// Pauses until `future` settles, then resumes with its value.
    pub fn suspend<R, Fut, K>(future: Fut, resume: K) -> Self
    where
        Fut: Future<Output = R> + Send + 'static,
        K: FnOnce(R) -> Self + Send + 'static,
    {
        Self::from_machine(Machine::suspended(Box::pin(async move {
            Ok(resume(future.await).machine)
        })))
    }

    /// Pauses until a fallible `future` settles.
    ///
    /// A failure of `future` fails the whole step-function without resuming it.
    pub fn try_suspend<R, E, Fut, K>(future: Fut, resume: K) -> Self
    where
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
        K: FnOnce(R) -> Self + Send + 'static,
    {
        Self::from_machine(Machine::suspended(Box::pin(
            future
                .map_err(CallableFailure::new)
                .map_ok(move |value| resume(value).machine),
        )))
    }

    /// Pauses until a fallible `future` settles and resumes with its result,
    /// failure included, so the step-function can recover.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cofn::callable::Step;
    ///
    /// # futures::executor::block_on(async {
    /// let step = Step::suspend_result(async { Err::<i32, _>("unavailable") }, |result| {
    ///     Step::done(result.unwrap_or(0))
    /// });
    /// assert_eq!(step.drive().await.unwrap(), 0);
    /// # });
    /// ```
    pub fn suspend_result<R, E, Fut, K>(future: Fut, resume: K) -> Self
    where
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
        K: FnOnce(Result<R, CallableFailure>) -> Self + Send + 'static,
    {
        Self::from_machine(Machine::suspended(Box::pin(async move {
            Ok(resume(future.await.map_err(CallableFailure::new)).machine)
        })))
    }

    /// Continues with `next` once this step-function has finished successfully.
    ///
    /// A finished step-function runs `next` right away. Otherwise `next` is
    /// queued behind the continuations already pending, so chains built in a
    /// loop neither nest nor grow the stack when driven or dropped.
    pub fn and_then<U, K>(self, next: K) -> Step<U>
    where
        U: Send + 'static,
        K: FnOnce(T) -> Step<U> + Send + 'static,
    {
        let Machine { head, mut pending } = self.machine;
        match head {
            Head::Done(Ok(value)) if pending.is_empty() => match downcast::<T>(value) {
                Ok(value) => next(value),
                Err(failure) => Step::from_machine(Machine::finished(Err(failure))),
            },
            Head::Done(Err(failure)) => Step::from_machine(Machine::finished(Err(failure))),
            head => {
                pending.push_back(Box::new(move |value| match downcast::<T>(value) {
                    Ok(value) => next(value).machine,
                    Err(failure) => Machine::finished(Err(failure)),
                }));
                Step::from_machine(Machine { head, pending })
            }
        }
    }

    /// Transforms the final value.
    pub fn map<U, F>(self, function: F) -> Step<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        self.and_then(move |value| Step::done(function(value)))
    }

    /// Drives the step-function to completion.
    pub fn drive(self) -> Drive<T> {
        Drive {
            machine: Some(self.machine),
            resumptions: 0,
            output: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.machine.head {
            Head::Done(Ok(_)) => "done",
            Head::Done(Err(_)) => "failed",
            Head::Suspend(_) => "suspended",
        };
        formatter
            .debug_struct("Step")
            .field("state", &state)
            .field("pending", &self.machine.pending.len())
            .finish()
    }
}

// =============================================================================
// Drive
// =============================================================================

/// Future returned by [`Step::drive`].
///
/// Settles with the step-function's final value, or with the first failure
/// raised by its logic or by a value it awaited.
#[must_use = "futures do nothing unless polled"]
pub struct Drive<T> {
    machine: Option<Machine>,
    resumptions: usize,
    output: PhantomData<fn() -> T>,
}

impl<T> Drive<T> {
    /// How many suspension points have been resumed so far.
    pub const fn resumptions(&self) -> usize {
        self.resumptions
    }
}

impl<T: 'static> Future for Drive<T> {
    type Output = Result<T, CallableFailure>;

    fn poll(mut self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let Some(Machine { head, mut pending }) = self.machine.take() else {
                panic!("`Drive` polled after completion");
            };
            match head {
                Head::Done(Ok(value)) => match pending.pop_front() {
                    Some(resume) => self.machine = Some(resume(value).followed_by(pending)),
                    None => {
                        tracing::trace!(resumptions = self.resumptions, "step-function finished");
                        return Poll::Ready(downcast(value));
                    }
                },
                Head::Done(Err(failure)) => return Poll::Ready(Err(failure)),
                Head::Suspend(mut future) => match future.as_mut().poll(context) {
                    Poll::Ready(Ok(next)) => {
                        self.resumptions += 1;
                        tracing::trace!(resumptions = self.resumptions, "step-function resumed");
                        self.machine = Some(next.followed_by(pending));
                    }
                    Poll::Ready(Err(failure)) => return Poll::Ready(Err(failure)),
                    Poll::Pending => {
                        self.machine = Some(Machine {
                            head: Head::Suspend(future),
                            pending,
                        });
                        return Poll::Pending;
                    }
                },
            }
        }
    }
}
