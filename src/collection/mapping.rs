//! An insertion-ordered, string-keyed map.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

/// A mapping of string keys to values that remembers insertion order.
///
/// Iteration, normalization and reassembly all follow insertion order, which
/// keeps combinator results deterministic. Equality ignores order: two
/// mappings are equal when they hold the same keys with equal values.
///
/// # Examples
///
/// ```rust
/// use cofn::collection::Mapping;
///
/// let mapping: Mapping<i32> = [("b", 2), ("a", 1)].into_iter().collect();
/// assert_eq!(mapping.keys().collect::<Vec<_>>(), vec!["b", "a"]);
/// assert_eq!(mapping["a"], 1);
/// ```
#[derive(Clone)]
pub struct Mapping<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Mapping<V> {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Creates an empty mapping with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a value.
    ///
    /// An existing key keeps its position and its previous value is returned.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        if let Some(&position) = self.positions.get(&key) {
            return Some(std::mem::replace(&mut self.entries[position].1, value));
        }
        self.positions.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Removes a key, shifting later entries down by one.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let position = self.positions.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for (_, index) in self.positions.iter_mut() {
            if *index > position {
                *index -= 1;
            }
        }
        Some(value)
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&position| &self.entries[position].1)
    }

    /// Returns a mutable reference to the value stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        let position = *self.positions.get(key)?;
        Some(&mut self.entries[position].1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the mapping holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl<V> Default for Mapping<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PartialEq> PartialEq for Mapping<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V: Eq> Eq for Mapping<V> {}

impl<V: fmt::Debug> fmt::Debug for Mapping<V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<&str> for Mapping<V> {
    type Output = V;

    fn index(&self, key: &str) -> &Self::Output {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key {key:?} is not present in the mapping"),
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Mapping<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut mapping = Self::with_capacity(iter.size_hint().0);
        mapping.extend(iter);
        mapping
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for Mapping<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<V> IntoIterator for Mapping<V> {
    type Item = (String, V);
    type IntoIter = std::vec::IntoIter<(String, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<V: serde::Serialize> serde::Serialize for Mapping<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct MappingVisitor<V> {
    marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<'de, V> serde::de::Visitor<'de> for MappingVisitor<V>
where
    V: serde::Deserialize<'de>,
{
    type Value = Mapping<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        const MAX_PREALLOCATE: usize = 4096;
        let capacity = map.size_hint().unwrap_or(0).min(MAX_PREALLOCATE);
        let mut mapping = Mapping::with_capacity(capacity);
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            mapping.insert(key, value);
        }
        Ok(mapping)
    }
}

#[cfg(feature = "serde")]
impl<'de, V> serde::Deserialize<'de> for Mapping<V>
where
    V: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(MappingVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
