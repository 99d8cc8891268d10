use core::any::TypeId;
use core::fmt::Debug;

use indexmap::IndexMap;

use crate::hash::TypeIdHashState;

// -----------------------------------------------------------------------------
// TypeIdIndexMap

/// An insertion-ordered map with [`TypeId`] as the fixed key type.
///
/// - Inserting an existing key replaces its value but keeps its position.
/// - Removing a key keeps the relative order of the remaining keys.
///
/// # Examples
///
/// ```
/// use core::any::TypeId;
/// use tymap_utils::TypeIdIndexMap;
///
/// let mut map = TypeIdIndexMap::new();
/// map.insert(TypeId::of::<u32>(), "a");
/// map.insert(TypeId::of::<u8>(), "b");
/// map.insert(TypeId::of::<u32>(), "c");
///
/// let values: Vec<_> = map.values().copied().collect();
/// assert_eq!(values, ["c", "b"]);
/// ```
pub struct TypeIdIndexMap<V>(IndexMap<TypeId, V, TypeIdHashState>);

impl<V> TypeIdIndexMap<V> {
    /// Creates an empty `TypeIdIndexMap`.
    #[inline]
    pub const fn new() -> Self {
        Self(IndexMap::with_hasher(TypeIdHashState))
    }

    /// Creates an empty `TypeIdIndexMap` with the specified capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity_and_hasher(capacity, TypeIdHashState))
    }

    /// Inserts a key-value pair, returning the previous value of the key.
    ///
    /// An existing key keeps its position.
    pub fn insert(&mut self, type_id: TypeId, v: V) -> Option<V> {
        self.0.insert(type_id, v)
    }

    /// Returns a reference to the value corresponding to the type.
    pub fn get(&self, type_id: &TypeId) -> Option<&V> {
        self.0.get(type_id)
    }

    /// Returns a mutable reference to the value corresponding to the type.
    pub fn get_mut(&mut self, type_id: &TypeId) -> Option<&mut V> {
        self.0.get_mut(type_id)
    }

    /// Removes a key, shifting every later entry one position forward.
    pub fn shift_remove(&mut self, type_id: &TypeId) -> Option<V> {
        self.0.shift_remove(type_id)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains(&self, type_id: &TypeId) -> bool {
        self.0.contains_key(type_id)
    }

    /// Returns the number of elements in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Clears the map, removing all key-value pairs.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// An iterator visiting all key-value pairs in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&TypeId, &V)> + DoubleEndedIterator {
        self.0.iter()
    }

    /// An iterator visiting all key-value pairs in insertion order,
    /// with mutable references to the values.
    #[inline]
    pub fn iter_mut(&mut self) -> impl ExactSizeIterator<Item = (&TypeId, &mut V)> {
        self.0.iter_mut()
    }

    /// An iterator visiting all values in insertion order.
    #[inline]
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.0.values()
    }

    /// An iterator visiting all keys in insertion order.
    #[inline]
    pub fn types(&self) -> impl ExactSizeIterator<Item = &TypeId> {
        self.0.keys()
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<V> Default for TypeIdIndexMap<V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for TypeIdIndexMap<V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl<V> IntoIterator for TypeIdIndexMap<V> {
    type Item = (TypeId, V);
    type IntoIter = indexmap::map::IntoIter<TypeId, V>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// -----------------------------------------------------------------------------
// Tests
