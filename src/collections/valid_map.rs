//! ValidMap — a hash map whose keys and values always pass their validators.

use std::fmt;
use std::hash::Hash;

use hashbrown::HashMap;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use smallvec::SmallVec;

use super::valid_set::INLINE_BATCH;
use super::{RemoveKeys, Validate, Validator};
use crate::Result;

/// Map in which every key and every value is valid. Iteration order is
/// unspecified.
pub struct ValidMap<K, V> {
    entries: HashMap<K, V>,
    key_validator: Validator<K>,
    value_validator: Validator<V>,
}

impl<K: Eq + Hash + Validate, V: Validate> ValidMap<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    /// `capacity` is a hint; `None` leaves it unspecified.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self::with_validators(capacity, Validator::default(), Validator::default())
    }
}

impl<K: Eq + Hash + Validate, V: Validate> ValidMap<K, V> {
    /// Wrap entries taken from another valid collection, with the default
    /// validators. Nothing is re-checked in release builds.
    pub(crate) fn from_checked(entries: HashMap<K, V>) -> Self {
        debug_assert!(entries.iter().all(|(k, v)| k.is_valid() && v.is_valid()));
        Self {
            entries,
            key_validator: Validator::default(),
            value_validator: Validator::default(),
        }
    }
}

impl<K: Eq + Hash + Validate, V: Validate> Default for ValidMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> ValidMap<K, V> {
    pub fn with_validators(
        capacity: Option<usize>,
        key_validator: Validator<K>,
        value_validator: Validator<V>,
    ) -> Self {
        let entries = match capacity {
            Some(n) => HashMap::with_capacity(n),
            None => HashMap::new(),
        };
        Self {
            entries,
            key_validator,
            value_validator,
        }
    }

    fn check(&self, key: &K, value: &V) -> Result<()> {
        self.key_validator.check(key)?;
        self.value_validator.check(value)
    }

    // ========================================================================
    // Growing (validated, all-or-nothing)
    // ========================================================================

    pub fn set(&mut self, key: K, value: V) -> Result<()> {
        self.get_and_set(key, value).map(|_| ())
    }

    /// Like [`set`](Self::set), returning the value previously under `key`.
    pub fn get_and_set(&mut self, key: K, value: V) -> Result<Option<V>> {
        self.check(&key, &value)?;
        Ok(self.entries.insert(key, value))
    }

    /// Set every entry of `entries`. Fails without setting anything if any
    /// key or value is invalid.
    pub fn set_all(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> Result<()> {
        let batch: SmallVec<[(K, V); INLINE_BATCH]> = entries.into_iter().collect();
        for (k, v) in &batch {
            self.check(k, v)?;
        }
        self.entries.extend(batch);
        Ok(())
    }

    /// Like [`set_all`](Self::set_all), returning the previous value of each
    /// key that was already present.
    pub fn get_and_set_all(&mut self, entries: impl IntoIterator<Item = (K, V)>) -> Result<Vec<(K, V)>>
    where
        K: Clone,
    {
        let batch: SmallVec<[(K, V); INLINE_BATCH]> = entries.into_iter().collect();
        for (k, v) in &batch {
            self.check(k, v)?;
        }
        let mut previous = Vec::new();
        for (k, v) in batch {
            if let Some(old) = self.entries.insert(k.clone(), v) {
                previous.push((k, old));
            }
        }
        Ok(previous)
    }

    /// Copy every entry of `other` into `self`.
    pub fn set_map(&mut self, other: &ValidMap<K, V>) -> Result<()>
    where
        K: Clone,
        V: Clone,
    {
        self.set_all(other.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Like [`set_map`](Self::set_map), returning the replaced entries.
    pub fn get_and_set_map(&mut self, other: &ValidMap<K, V>) -> Result<ValidMap<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        let previous = self.get_and_set_all(other.iter().map(|(k, v)| (k.clone(), v.clone())))?;
        let mut out = ValidMap::with_validators(Some(previous.len()), self.key_validator, self.value_validator);
        out.entries.extend(previous);
        Ok(out)
    }

    // ========================================================================
    // Shrinking (never fails)
    // ========================================================================

    pub fn remove<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>)
    where
        K: 'a,
    {
        for k in keys {
            self.entries.remove(k);
        }
    }

    pub fn get_and_remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key)
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.entries.retain(keep);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V> RemoveKeys<K> for ValidMap<K, V> {
    fn remove_keys(&mut self, keys: &[K]) {
        self.remove(keys);
    }
}

impl<'a, K: Eq + Hash, V> IntoIterator for &'a ValidMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = hashbrown::hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Clone, V: Clone> Clone for ValidMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            key_validator: self.key_validator,
            value_validator: self.value_validator,
        }
    }
}

/// Equal when the entries are equal; validators are not compared.
impl<K: Eq + Hash, V: PartialEq> PartialEq for ValidMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ValidMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Serialize, V: Serialize> Serialize for ValidMap<K, V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(&self.entries)
    }
}

impl<'de, K, V> Deserialize<'de> for ValidMap<K, V>
where
    K: Deserialize<'de> + Eq + Hash + Validate,
    V: Deserialize<'de> + Validate,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let entries = HashMap::<K, V>::deserialize(deserializer)?;
        let mut map = ValidMap::with_capacity(Some(entries.len()));
        map.set_all(entries).map_err(serde::de::Error::custom)?;
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn positive_map() -> ValidMap<String, i64> {
        ValidMap::with_validators(
            Some(4),
            Validator::from_fn(|k: &String| !k.is_empty()),
            Validator::from_fn(|v| *v > 0),
        )
    }

    #[test]
    fn test_set_validates_key_then_value() {
        let mut m = positive_map();
        m.set("a".into(), 1).unwrap();
        assert_eq!(m.set(String::new(), 1), Err(Error::InvalidItem("\"\"".into())));
        assert_eq!(m.set("b".into(), -1), Err(Error::InvalidItem("-1".into())));
        assert_eq!(m.get_and_set("a".into(), 2).unwrap(), Some(1));
        assert_eq!(m.get(&"a".into()), Some(&2));
    }

    #[test]
    fn test_set_all_is_all_or_nothing() {
        let mut m = positive_map();
        m.set("a".into(), 1).unwrap();
        let before = m.clone();
        let err = m.set_all([("b".to_string(), 2), ("c".to_string(), 0)]).unwrap_err();
        assert_eq!(err, Error::InvalidItem("0".into()));
        assert_eq!(m, before);
    }

    #[test]
    fn test_get_and_set_map() {
        let mut m = positive_map();
        m.set_all([("a".to_string(), 1), ("b".to_string(), 2)]).unwrap();
        let mut other = positive_map();
        other.set_all([("b".to_string(), 20), ("c".to_string(), 30)]).unwrap();

        let previous = m.get_and_set_map(&other).unwrap();
        assert_eq!(previous.len(), 1);
        assert_eq!(previous.get(&"b".into()), Some(&2));
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(&"b".into()), Some(&20));
    }

    #[test]
    fn test_remove() {
        let mut m = positive_map();
        m.set_all([("a".to_string(), 1), ("b".to_string(), 2), ("c".to_string(), 3)]).unwrap();
        m.remove(&["a".to_string(), "zz".to_string()]);
        assert_eq!(m.get_and_remove(&"b".into()), Some(2));
        assert_eq!(m.get_and_remove(&"b".into()), None);
        m.retain(|_, v| *v > 5);
        assert!(m.is_empty());
    }
}
