use alloc::string::String;
use core::fmt;

use indexmap::IndexMap;
use serde_core::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde_core::ser::{Serialize, SerializeMap, Serializer};
use tymap_utils::hash::KeyHashState;

use crate::Section;

// -----------------------------------------------------------------------------
// SectionMap

/// An insertion-ordered map from string keys to [`Section`]s.
///
/// - Inserting an existing key replaces its value in place, the key keeps
///   the position of its first insertion.
/// - Removing a key keeps the relative order of the remaining keys.
/// - Equality is order sensitive.
///
/// # Examples
///
/// ```
/// use tymap_section::{Section, SectionMap};
///
/// let mut map = SectionMap::new();
/// map.insert("b", 1);
/// map.insert("a", 2);
/// map.insert("b", 3);
///
/// assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&Section::Int(3)));
/// ```
#[derive(Clone, Default)]
pub struct SectionMap {
    entries: IndexMap<String, Section, KeyHashState>,
}

impl SectionMap {
    /// Creates an empty map.
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: IndexMap::with_hasher(KeyHashState),
        }
    }

    /// Creates an empty map with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity_and_hasher(capacity, KeyHashState),
        }
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Section>) -> Option<Section> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Section> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.entries.get_mut(key)
    }

    /// Removes a key, keeping the order of the other entries.
    pub fn remove(&mut self, key: &str) -> Option<Section> {
        self.entries.shift_remove(key)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Section)> + DoubleEndedIterator {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over the keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + DoubleEndedIterator {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the values in insertion order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &Section> + DoubleEndedIterator {
        self.entries.values()
    }
}

// -----------------------------------------------------------------------------
// Traits

impl PartialEq for SectionMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl fmt::Debug for SectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl IntoIterator for SectionMap {
    type Item = (String, Section);
    type IntoIter = indexmap::map::IntoIter<String, Section>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<Section>> FromIterator<(K, V)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SectionMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Into<String>, V: Into<Section>> Extend<(K, V)> for SectionMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            state.serialize_entry(key, value)?;
        }
        state.end()
    }
}

struct SectionMapVisitor;

impl<'de> Visitor<'de> for SectionMapVisitor {
    type Value = SectionMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map with string keys")
    }

    fn visit_unit<E>(self) -> Result<SectionMap, E> {
        Ok(SectionMap::new())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<SectionMap, A::Error> {
        let mut map = SectionMap::with_capacity(access.size_hint().unwrap_or(0).min(1024));
        while let Some((key, value)) = access.next_entry::<String, Section>()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SectionMapVisitor)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::SectionMap;
    use crate::Section;

    #[test]
    fn remove_keeps_order() {
        let mut map: SectionMap = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(map.remove("b"), Some(Section::Int(2)));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["a", "c"]);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn equality_is_order_sensitive() {
        let ab: SectionMap = [("a", 1), ("b", 2)].into_iter().collect();
        let ba: SectionMap = [("b", 2), ("a", 1)].into_iter().collect();
        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn ron_round_trip() {
        let map: SectionMap = [("name", Section::from("db")), ("size", Section::from(3))]
            .into_iter()
            .collect();

        let text = ron::to_string(&map).unwrap();
        let back: SectionMap = ron::from_str(&text).unwrap();
        assert_eq!(back, map);
    }
}
