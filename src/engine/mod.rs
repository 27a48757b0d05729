//! The iteration engine: map, filter, `for_each` and reduce.
//!
//! Every combinator exists in two forms:
//!
//! - a free function taking every argument at once ([`map`], [`filter`], ...),
//! - a partially-applied value holding the callable (and, for reduce, the
//!   initial accumulator) until the collection arrives ([`Map`], [`Filter`],
//!   [`ForEach`], [`Reduce`]).
//!
//! Arguments are always supplied in the same order: callable first, then the
//! initial accumulator (reduce only), then the collection.
//!
//! # Execution modes
//!
//! | Mode | Dispatch | Ordering guarantee |
//! |---|---|---|
//! | [`Mode::Parallel`] | every call is issued, then all deferred outcomes are awaited concurrently | results follow input order |
//! | [`Mode::Serial`] | call N+1 is issued only after call N settled | calls and results follow input order |
//!
//! Concurrency is cooperative: parallel outcomes are polled together on the
//! task awaiting the combinator, nothing is spawned onto other threads.
//! Reduce is serial only, each step needs the previous accumulator.
//!
//! # Failures
//!
//! A combinator either settles with its complete result or fails with the
//! first failure it observes; partial results are never returned. Collection
//! shape problems are reported through the returned future as well, never
//! synchronously.
//!
//! # Examples
//!
//! ```rust
//! use cofn::callable::Callable;
//! use cofn::collection::{Collection, Key};
//! use cofn::engine::{Map, map_serial};
//!
//! # futures::executor::block_on(async {
//! let double = Map::new(Callable::plain(|value: i32, _key: Key| value * 2));
//! assert_eq!(double.apply(&vec![1, 2, 3]).await.unwrap(), Collection::Sequence(vec![2, 4, 6]));
//!
//! let labelled = map_serial(
//!     Callable::deferred(|value: i32, key: Key| async move { format!("{key}:{value}") }),
//!     &vec![7, 8],
//! );
//! assert_eq!(
//!     labelled.await.unwrap(),
//!     Collection::Sequence(vec!["0:7".to_string(), "1:8".to_string()])
//! );
//! # });
//! ```

mod dispatch;
mod filter;
mod for_each;
mod map;
mod reduce;

pub use filter::{Filter, filter, filter_serial};
pub use for_each::{ForEach, for_each, for_each_serial};
pub use map::{Map, map, map_serial};
pub use reduce::{Reduce, ReduceFrom, reduce};

use std::fmt;

/// How a combinator dispatches its calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Issue every call, then await all outcomes concurrently.
    #[default]
    Parallel,
    /// Await each call before issuing the next.
    Serial,
}

impl Mode {
    /// Picks the operation name matching this mode, for logs and errors.
    pub(crate) const fn operation(self, parallel: &'static str, serial: &'static str) -> &'static str {
        match self {
            Self::Parallel => parallel,
            Self::Serial => serial,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => formatter.write_str("parallel"),
            Self::Serial => formatter.write_str("serial"),
        }
    }
}
