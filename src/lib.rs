//! # cofn
//!
//! Asynchronous collection combinators driven by plain, deferred or
//! suspending callables.
//!
//! ## Overview
//!
//! `cofn` applies a unit of work to every element of a sequence or mapping and
//! hands back a single future for the aggregate. The unit of work may answer
//! immediately, return a future, or be a suspending step-function; the
//! combinators treat all three uniformly.
//!
//! - **Callables**: [`Callable`](callable::Callable) and its three shapes,
//!   [`Step`](callable::Step) for suspending step-functions
//! - **Collections**: [`Normalize`](collection::Normalize) turns slices,
//!   vectors, maps and JSON values into keyed pairs, and
//!   [`Collection`](collection::Collection) carries mapped results back
//! - **Engine**: [`map`], [`filter`], [`for_each`] and [`reduce`], each with a
//!   serial counterpart and a partially-applied builder
//! - **Composition**: [`compose!`], [`Callable::and_then`](callable::Callable::and_then),
//!   [`compose::bind`] and [`compose::lazy_bind`]
//!
//! ## Feature Flags
//!
//! - `compose`: composition utilities (enabled by default)
//! - `serde`: `Serialize`/`Deserialize` for collections and `Normalize` for
//!   `serde_json::Value`
//! - `full`: enable all features
//!
//! ## Logging
//!
//! The combinators emit [`tracing`] events: one `DEBUG` event when an
//! operation starts dispatching and one `TRACE` event when it settles. Install
//! any `tracing` subscriber to see them.
//!
//! ## Example
//!
//! ```rust
//! use cofn::prelude::*;
//!
//! # futures::executor::block_on(async {
//! let numbers = vec![1, 2, 3, 4, 5, 6];
//!
//! let even = Callable::deferred(|value: i32, _key: Key| async move { value % 2 == 0 });
//! let kept = filter(even, &numbers).await.unwrap();
//! assert_eq!(kept, vec![2, 4, 6]);
//!
//! let sum = Callable::plain(|total: i32, value: i32, _index: usize| total + value);
//! assert_eq!(reduce(sum, 10, &numbers).await.unwrap(), 31);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use cofn::prelude::*;
/// ```
pub mod prelude {
    pub use crate::callable::{Callable, CallableShape, Deferred, Returned, Step};
    pub use crate::collection::{Collection, Key, Mapping, Normalize};
    pub use crate::engine::{
        Filter, ForEach, Map, Mode, Reduce, ReduceFrom, filter, filter_serial, for_each,
        for_each_serial, map, map_serial, reduce,
    };
    pub use crate::error::{CallableFailure, Error};

    #[cfg(feature = "compose")]
    pub use crate::compose::{bind, lazy_bind};
}

pub mod callable;
pub mod collection;
pub mod engine;

#[cfg(feature = "compose")]
pub mod compose;

mod error;

pub use engine::{filter, filter_serial, for_each, for_each_serial, map, map_serial, reduce};
pub use error::{BoxError, CallableFailure, Error, TypeMismatchError, UnsupportedCollectionError};
