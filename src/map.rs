//! String-keyed maps of values.
//!
//! [`ValueMap`] wraps an [`IndexMap`] and keeps its entries sorted by key.
//! Sorted order is the iteration order used everywhere: formatting,
//! serialization and equality checks all see the same sequence, independent
//! of insertion order.
//!
//! Keys are unique. Inserting an existing key replaces its value (last write
//! wins), which is also how duplicate keys on the wire are resolved.
//!
//! ## Examples
//!
//! ```rust
//! use polyvalue::{ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.insert("zeta", Value::from(1i32));
//! map.insert("alpha", Value::from(2i32));
//!
//! let keys: Vec<_> = map.keys().cloned().collect();
//! assert_eq!(keys, vec!["alpha", "zeta"]);
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// A sorted map of string keys to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<String, Value>);

impl ValueMap {
    /// Creates an empty `ValueMap`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polyvalue::ValueMap;
    ///
    /// let map = ValueMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    /// Creates an empty `ValueMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair, keeping keys sorted.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the new one takes its place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polyvalue::{ValueMap, Value};
    ///
    /// let mut map = ValueMap::new();
    /// assert!(map.insert("key", Value::from(42i32)).is_none());
    /// assert!(map.insert("key", Value::from(43i32)).is_some());
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.0.binary_search_keys(&key) {
            Ok(index) => self
                .0
                .get_index_mut(index)
                .map(|(_, slot)| std::mem::replace(slot, value)),
            Err(index) => {
                self.0.shift_insert(index, key, value);
                None
            }
        }
    }

    /// Sorts entries collected in any order, once.
    pub(crate) fn from_unsorted(mut entries: IndexMap<String, Value>) -> Self {
        entries.sort_unstable_keys();
        ValueMap(entries)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Removes a key, returning its value. Remaining keys stay sorted.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns the number of entries in the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in sorted order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values, in key order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the entries, in key order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let mut entries = IndexMap::new();
        for (key, value) in iter {
            entries.insert(key.into(), value);
        }
        ValueMap::from_unsorted(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for ValueMap {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().map(|(k, v)| (k, v.into())).collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<HashMap<K, V>> for ValueMap {
    fn from(map: HashMap<K, V>) -> Self {
        map.into_iter().map(|(k, v)| (k, v.into())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(map: &ValueMap) -> Vec<&str> {
        map.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_sorted_regardless_of_insertion_order() {
        let mut map = ValueMap::new();
        for key in ["delta", "alpha", "charlie", "bravo"] {
            map.insert(key, Value::from(0u8));
        }
        assert_eq!(keys(&map), vec!["alpha", "bravo", "charlie", "delta"]);
    }

    #[test]
    fn test_descending_inserts_stay_sorted() {
        let mut map = ValueMap::new();
        for i in (0..2_000u32).rev() {
            map.insert(format!("{:05}", i), Value::from(i));
        }
        assert_eq!(map.len(), 2_000);
        let keys = keys(&map);
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(map.get("01234"), Some(&Value::from(1234u32)));
    }

    #[test]
    fn test_collect_keeps_last_duplicate() {
        let map: ValueMap = [
            ("b", Value::from(1u8)),
            ("a", Value::from(2u8)),
            ("b", Value::from(3u8)),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys(&map), vec!["a", "b"]);
        assert_eq!(map.get("b"), Some(&Value::from(3u8)));
    }

    #[test]
    fn test_insert_replaces_existing_key() {
        let mut map = ValueMap::new();
        map.insert("a", Value::from(1i32));
        let old = map.insert("a", Value::from(2i32));
        assert_eq!(old, Some(Value::from(1i32)));
        assert_eq!(map.get("a"), Some(&Value::from(2i32)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: ValueMap = [("c", Value::from(3i8)), ("a", Value::from(1i8)), ("b", Value::from(2i8))]
            .into_iter()
            .collect();
        assert_eq!(map.remove("b"), Some(Value::from(2i8)));
        assert_eq!(keys(&map), vec!["a", "c"]);
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn test_from_std_maps() {
        let mut hash = HashMap::new();
        hash.insert("y".to_string(), 2u16);
        hash.insert("x".to_string(), 1u16);
        let map = ValueMap::from(hash);
        assert_eq!(keys(&map), vec!["x", "y"]);

        let mut tree = BTreeMap::new();
        tree.insert("k", vec![1.0f32, 2.0]);
        let map = ValueMap::from(tree);
        assert_eq!(map.get("k"), Some(&Value::from(vec![1.0f32, 2.0])));
    }

    #[test]
    fn test_equality_ignores_construction_order() {
        let a: ValueMap = [("one", Value::from(1u8)), ("two", Value::from(2u8))]
            .into_iter()
            .collect();
        let b: ValueMap = [("two", Value::from(2u8)), ("one", Value::from(1u8))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }
}
