//! Collection shapes and their normalization.
//!
//! The combinators work over two shapes:
//!
//! - **Sequences**: ordered, index-addressed (`Vec<V>`, slices, arrays,
//!   `VecDeque<V>`).
//! - **Mappings**: string-keyed ([`Mapping<V>`], `BTreeMap<String, V>`,
//!   `HashMap<String, V>`).
//!
//! The [`Normalize`] trait turns either shape into an ordered list of
//! `(Key, value)` pairs plus a [`ShapeWitness`] that knows how to put results
//! back together. Normalization only borrows the caller's collection; the
//! pairs are an owned working copy, so nothing the combinators do can be
//! observed through the original.
//!
//! # Examples
//!
//! ```rust
//! use cofn::collection::{Collection, Key, Normalize, ShapeWitness};
//!
//! let normalized = vec!["x", "y"].normalize().unwrap();
//! assert_eq!(normalized.shape(), ShapeWitness::Sequence);
//! assert_eq!(normalized.pairs()[1], (Key::Index(1), "y"));
//!
//! let (shape, pairs) = normalized.into_parts();
//! let lengths = pairs.into_iter().map(|(key, value)| (key, value.len())).collect();
//! assert_eq!(shape.reassemble(lengths), Collection::Sequence(vec![1, 1]));
//! ```

mod mapping;
mod normalize;

pub use mapping::Mapping;
pub use normalize::{Normalize, Normalized, ShapeWitness};

use std::fmt;

/// The position of an element: an index into a sequence or a key of a mapping.
///
/// `Key` is the second argument of every map, filter and `for_each` callable.
/// Its [`Display`](fmt::Display) form is the bare index or name, so
/// `format!("{value}{key}")` reads naturally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Key {
    /// Zero-based position in a sequence.
    Index(usize),
    /// Field name in a mapping.
    Name(String),
}

impl Key {
    /// Returns the index, if this key addresses a sequence.
    pub const fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(index) => Some(*index),
            Self::Name(_) => None,
        }
    }

    /// Returns the name, if this key addresses a mapping.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(formatter, "{index}"),
            Self::Name(name) => formatter.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl PartialEq<usize> for Key {
    fn eq(&self, other: &usize) -> bool {
        self.as_index() == Some(*other)
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.as_name() == Some(other)
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.as_name() == Some(*other)
    }
}

/// A complete collection of either shape.
///
/// This is what map reassembles its results into: a sequence input yields a
/// sequence, a mapping input yields a mapping with the same keys.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Collection<V> {
    /// An ordered sequence.
    Sequence(Vec<V>),
    /// A string-keyed mapping.
    Mapping(Mapping<V>),
}

impl<V> Collection<V> {
    /// The shape of this collection.
    pub const fn shape(&self) -> ShapeWitness {
        match self {
            Self::Sequence(_) => ShapeWitness::Sequence,
            Self::Mapping(_) => ShapeWitness::Mapping,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(values) => values.len(),
            Self::Mapping(mapping) => mapping.len(),
        }
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrows the sequence, if this is one.
    pub fn as_sequence(&self) -> Option<&[V]> {
        match self {
            Self::Sequence(values) => Some(values),
            Self::Mapping(_) => None,
        }
    }

    /// Borrows the mapping, if this is one.
    pub const fn as_mapping(&self) -> Option<&Mapping<V>> {
        match self {
            Self::Sequence(_) => None,
            Self::Mapping(mapping) => Some(mapping),
        }
    }

    /// Takes the sequence, if this is one.
    pub fn into_sequence(self) -> Option<Vec<V>> {
        match self {
            Self::Sequence(values) => Some(values),
            Self::Mapping(_) => None,
        }
    }

    /// Takes the mapping, if this is one.
    pub fn into_mapping(self) -> Option<Mapping<V>> {
        match self {
            Self::Sequence(_) => None,
            Self::Mapping(mapping) => Some(mapping),
        }
    }
}

impl<V> From<Vec<V>> for Collection<V> {
    fn from(values: Vec<V>) -> Self {
        Self::Sequence(values)
    }
}

impl<V> From<Mapping<V>> for Collection<V> {
    fn from(mapping: Mapping<V>) -> Self {
        Self::Mapping(mapping)
    }
}

#[cfg(feature = "serde")]
impl From<Collection<serde_json::Value>> for serde_json::Value {
    fn from(collection: Collection<Self>) -> Self {
        match collection {
            Collection::Sequence(values) => Self::Array(values),
            Collection::Mapping(mapping) => Self::Object(mapping.into_iter().collect()),
        }
    }
}
