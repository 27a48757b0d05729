//! Turning collections into ordered pairs and back.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::hash::BuildHasher;

use super::{Collection, Key, Mapping};
use crate::error::UnsupportedCollectionError;

/// Which shape a collection had, and therefore how results are reassembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeWitness {
    /// An ordered, index-addressed collection.
    Sequence,
    /// A string-keyed collection.
    Mapping,
}

impl ShapeWitness {
    /// The name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }

    /// Rebuilds a collection of this shape.
    ///
    /// `results` must be in the order of the normalized pairs they came from.
    /// Mappings take each result under its pair's key, sequences take the
    /// results positionally.
    pub fn reassemble<U>(self, results: Vec<(Key, U)>) -> Collection<U> {
        match self {
            Self::Sequence => {
                debug_assert!(
                    results
                        .iter()
                        .enumerate()
                        .all(|(position, (key, _))| *key == position),
                    "sequence results must arrive in index order"
                );
                Collection::Sequence(results.into_iter().map(|(_, value)| value).collect())
            }
            Self::Mapping => Collection::Mapping(
                results
                    .into_iter()
                    .map(|(key, value)| match key {
                        Key::Name(name) => (name, value),
                        Key::Index(index) => (index.to_string(), value),
                    })
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ShapeWitness {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

/// The owned working copy of a collection, ready for iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized<V> {
    shape: ShapeWitness,
    pairs: Vec<(Key, V)>,
}

impl<V> Normalized<V> {
    /// Builds a sequence working copy.
    pub fn sequence(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            shape: ShapeWitness::Sequence,
            pairs: values
                .into_iter()
                .enumerate()
                .map(|(index, value)| (Key::Index(index), value))
                .collect(),
        }
    }

    /// Builds a mapping working copy.
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            shape: ShapeWitness::Mapping,
            pairs: entries
                .into_iter()
                .map(|(key, value)| (Key::Name(key.into()), value))
                .collect(),
        }
    }

    /// The shape of the source collection.
    pub const fn shape(&self) -> ShapeWitness {
        self.shape
    }

    /// The ordered pairs.
    pub fn pairs(&self) -> &[(Key, V)] {
        &self.pairs
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Splits into the shape witness and the ordered pairs.
    pub fn into_parts(self) -> (ShapeWitness, Vec<(Key, V)>) {
        (self.shape, self.pairs)
    }

    /// Drops the keys, keeping the values in order.
    pub fn into_values(self) -> Vec<V> {
        self.pairs.into_iter().map(|(_, value)| value).collect()
    }

    /// Reassembles the working copy unchanged.
    pub fn reassemble(self) -> Collection<V> {
        self.shape.reassemble(self.pairs)
    }
}

/// A collection the combinators can iterate over.
///
/// Implementations borrow `self` and clone every element into the
/// [`Normalized`] working copy. Cloning is the copy: owned data is duplicated,
/// while values that share state on purpose (`Arc`, `Rc`) keep sharing it.
pub trait Normalize {
    /// The element type.
    type Value;

    /// Reports the shape without copying anything.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedCollectionError`] if the value is neither a
    /// sequence nor a mapping.
    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError>;

    /// Produces the ordered `(key, value)` working copy.
    ///
    /// # Errors
    ///
    /// Returns [`UnsupportedCollectionError`] if the value is neither a
    /// sequence nor a mapping.
    fn normalize(&self) -> Result<Normalized<Self::Value>, UnsupportedCollectionError>;
}

impl<V: Clone> Normalize for [V] {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Sequence)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        Ok(Normalized::sequence(self.iter().cloned()))
    }
}

impl<V: Clone, const N: usize> Normalize for [V; N] {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Sequence)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        self.as_slice().normalize()
    }
}

impl<V: Clone> Normalize for Vec<V> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Sequence)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        self.as_slice().normalize()
    }
}

impl<V: Clone> Normalize for VecDeque<V> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Sequence)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        Ok(Normalized::sequence(self.iter().cloned()))
    }
}

impl<V: Clone> Normalize for Mapping<V> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Mapping)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        Ok(Normalized::mapping(
            self.iter().map(|(key, value)| (key, value.clone())),
        ))
    }
}

impl<V: Clone> Normalize for BTreeMap<String, V> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Mapping)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        Ok(Normalized::mapping(
            self.iter().map(|(key, value)| (key.as_str(), value.clone())),
        ))
    }
}

impl<V: Clone, S: BuildHasher> Normalize for HashMap<String, V, S> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(ShapeWitness::Mapping)
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        Ok(Normalized::mapping(
            self.iter().map(|(key, value)| (key.as_str(), value.clone())),
        ))
    }
}

impl<V: Clone> Normalize for Collection<V> {
    type Value = V;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        Ok(Collection::<V>::shape(self))
    }

    fn normalize(&self) -> Result<Normalized<V>, UnsupportedCollectionError> {
        match self {
            Self::Sequence(values) => values.normalize(),
            Self::Mapping(mapping) => mapping.normalize(),
        }
    }
}

#[cfg(feature = "serde")]
const fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(feature = "serde")]
impl Normalize for serde_json::Value {
    type Value = Self;

    fn shape(&self) -> Result<ShapeWitness, UnsupportedCollectionError> {
        match self {
            Self::Array(_) => Ok(ShapeWitness::Sequence),
            Self::Object(_) => Ok(ShapeWitness::Mapping),
            scalar => Err(UnsupportedCollectionError {
                actual: json_type_name(scalar),
            }),
        }
    }

    fn normalize(&self) -> Result<Normalized<Self>, UnsupportedCollectionError> {
        match self {
            Self::Array(values) => Ok(Normalized::sequence(values.iter().cloned())),
            Self::Object(object) => Ok(Normalized::mapping(
                object.iter().map(|(key, value)| (key.as_str(), value.clone())),
            )),
            scalar => Err(UnsupportedCollectionError {
                actual: json_type_name(scalar),
            }),
        }
    }
}
