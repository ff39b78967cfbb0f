//! Mutually-exclusive collections.
//!
//! A family of sibling collections in which a key belongs to at most one
//! member. Inserting methods take the siblings as `&mut [&mut dyn
//! RemoveKeys<K>]` and remove every inserted key from each of them once the
//! insertion has succeeded. A failed insertion leaves both the collection
//! and its siblings untouched.
//!
//! Read access goes through `Deref` to the underlying validated collection.

use std::fmt;
use std::hash::Hash;
use std::ops::Deref;

use smallvec::SmallVec;

use super::valid_set::INLINE_BATCH;
use super::{RemoveKeys, Validate, ValidMap, ValidSet, Validator};
use crate::Result;

/// Sibling collections of a mutually-exclusive family.
pub type Siblings<'a, 'b, K> = &'a mut [&'b mut dyn RemoveKeys<K>];

fn evict<K>(siblings: Siblings<'_, '_, K>, keys: &[K]) {
    if keys.is_empty() {
        return;
    }
    for sibling in siblings.iter_mut() {
        sibling.remove_keys(keys);
    }
}

// ============================================================================
// MutExclSet
// ============================================================================

/// A [`ValidSet`] that evicts inserted items from its siblings.
pub struct MutExclSet<T> {
    set: ValidSet<T>,
}

impl<T: Eq + Hash + Validate> MutExclSet<T> {
    pub fn new() -> Self {
        Self { set: ValidSet::new() }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            set: ValidSet::with_capacity(capacity),
        }
    }
}

impl<T: Eq + Hash + Validate> Default for MutExclSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash + Clone> MutExclSet<T> {
    pub fn with_validator(capacity: Option<usize>, validator: Validator<T>) -> Self {
        Self {
            set: ValidSet::with_validator(capacity, validator),
        }
    }

    pub fn add(&mut self, items: impl IntoIterator<Item = T>, siblings: Siblings<'_, '_, T>) -> Result<()> {
        let batch: SmallVec<[T; INLINE_BATCH]> = items.into_iter().collect();
        self.set.add(batch.iter().cloned())?;
        evict(siblings, &batch);
        Ok(())
    }

    pub fn union(&mut self, other: &ValidSet<T>, siblings: Siblings<'_, '_, T>) -> Result<()> {
        self.set.union(other)?;
        let keys: SmallVec<[T; INLINE_BATCH]> = other.iter().cloned().collect();
        evict(siblings, &keys);
        Ok(())
    }

    /// Only the items that end up in `self` are evicted from the siblings.
    pub fn disjunctive_union(&mut self, other: &ValidSet<T>, siblings: Siblings<'_, '_, T>) -> Result<()> {
        let added: SmallVec<[T; INLINE_BATCH]> =
            other.iter().filter(|x| !self.set.contains(x)).cloned().collect();
        self.set.disjunctive_union(other)?;
        evict(siblings, &added);
        Ok(())
    }

    pub fn remove<'a>(&mut self, items: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        self.set.remove(items);
    }

    pub fn intersect(&mut self, other: &ValidSet<T>) {
        self.set.intersect(other);
    }

    pub fn subtract(&mut self, other: &ValidSet<T>) {
        self.set.subtract(other);
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.set.retain(keep);
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }

    pub fn into_inner(self) -> ValidSet<T> {
        self.set
    }
}

impl<T> Deref for MutExclSet<T> {
    type Target = ValidSet<T>;

    fn deref(&self) -> &ValidSet<T> {
        &self.set
    }
}

impl<T: Eq + Hash> RemoveKeys<T> for MutExclSet<T> {
    fn remove_keys(&mut self, keys: &[T]) {
        self.set.remove_keys(keys);
    }
}

impl<T: Clone> Clone for MutExclSet<T> {
    fn clone(&self) -> Self {
        Self { set: self.set.clone() }
    }
}

impl<T: Eq + Hash> PartialEq for MutExclSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.set == other.set
    }
}

impl<T: fmt::Debug> fmt::Debug for MutExclSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.set, f)
    }
}

// ============================================================================
// MutExclMap
// ============================================================================

/// A [`ValidMap`] that evicts inserted keys from its siblings.
pub struct MutExclMap<K, V> {
    map: ValidMap<K, V>,
}

impl<K: Eq + Hash + Validate, V: Validate> MutExclMap<K, V> {
    pub fn new() -> Self {
        Self { map: ValidMap::new() }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            map: ValidMap::with_capacity(capacity),
        }
    }
}

impl<K: Eq + Hash + Validate, V: Validate> Default for MutExclMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V> MutExclMap<K, V> {
    pub fn with_validators(
        capacity: Option<usize>,
        key_validator: Validator<K>,
        value_validator: Validator<V>,
    ) -> Self {
        Self {
            map: ValidMap::with_validators(capacity, key_validator, value_validator),
        }
    }

    pub fn set(&mut self, key: K, value: V, siblings: Siblings<'_, '_, K>) -> Result<()> {
        self.get_and_set(key, value, siblings).map(|_| ())
    }

    pub fn get_and_set(&mut self, key: K, value: V, siblings: Siblings<'_, '_, K>) -> Result<Option<V>> {
        let previous = self.map.get_and_set(key.clone(), value)?;
        evict(siblings, std::slice::from_ref(&key));
        Ok(previous)
    }

    pub fn set_all(&mut self, entries: impl IntoIterator<Item = (K, V)>, siblings: Siblings<'_, '_, K>) -> Result<()> {
        let batch: SmallVec<[(K, V); INLINE_BATCH]> = entries.into_iter().collect();
        let keys: SmallVec<[K; INLINE_BATCH]> = batch.iter().map(|(k, _)| k.clone()).collect();
        self.map.set_all(batch)?;
        evict(siblings, &keys);
        Ok(())
    }

    pub fn set_map(&mut self, other: &ValidMap<K, V>, siblings: Siblings<'_, '_, K>) -> Result<()>
    where
        V: Clone,
    {
        self.map.set_map(other)?;
        let keys: SmallVec<[K; INLINE_BATCH]> = other.keys().cloned().collect();
        evict(siblings, &keys);
        Ok(())
    }

    pub fn get_and_set_map(&mut self, other: &ValidMap<K, V>, siblings: Siblings<'_, '_, K>) -> Result<ValidMap<K, V>>
    where
        V: Clone,
    {
        let previous = self.map.get_and_set_map(other)?;
        let keys: SmallVec<[K; INLINE_BATCH]> = other.keys().cloned().collect();
        evict(siblings, &keys);
        Ok(previous)
    }

    pub fn remove<'a>(&mut self, keys: impl IntoIterator<Item = &'a K>)
    where
        K: 'a,
    {
        self.map.remove(keys);
    }

    pub fn get_and_remove(&mut self, key: &K) -> Option<V> {
        self.map.get_and_remove(key)
    }

    pub fn retain(&mut self, keep: impl FnMut(&K, &mut V) -> bool) {
        self.map.retain(keep);
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn into_inner(self) -> ValidMap<K, V> {
        self.map
    }
}

impl<K, V> Deref for MutExclMap<K, V> {
    type Target = ValidMap<K, V>;

    fn deref(&self) -> &ValidMap<K, V> {
        &self.map
    }
}

impl<K: Eq + Hash, V> RemoveKeys<K> for MutExclMap<K, V> {
    fn remove_keys(&mut self, keys: &[K]) {
        self.map.remove_keys(keys);
    }
}

impl<K: Clone, V: Clone> Clone for MutExclMap<K, V> {
    fn clone(&self) -> Self {
        Self { map: self.map.clone() }
    }
}

impl<K: Eq + Hash, V: PartialEq> PartialEq for MutExclMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for MutExclMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.map, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PropName, PropValue};
    use pretty_assertions::assert_eq;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    #[test]
    fn test_three_way_exclusion() {
        let mut a: MutExclSet<PropName> = MutExclSet::new();
        let mut b: MutExclSet<PropName> = MutExclSet::new();
        let mut c: MutExclSet<PropName> = MutExclSet::new();

        a.add([name("x"), name("y")], &mut [&mut b, &mut c]).unwrap();
        b.add([name("x")], &mut [&mut a, &mut c]).unwrap();
        c.add([name("x"), name("z")], &mut [&mut a, &mut b]).unwrap();

        assert!(!a.contains(&name("x")) && !b.contains(&name("x")) && c.contains(&name("x")));
        assert!(a.contains(&name("y")));
        assert_eq!(b.len(), 0);
    }

    #[test]
    fn test_failed_insert_leaves_siblings() {
        let mut a: MutExclSet<PropName> = MutExclSet::new();
        let mut b: MutExclSet<PropName> = MutExclSet::new();
        b.add([name("x")], &mut [&mut a]).unwrap();

        let err = a.add([name("x"), PropName::default()], &mut [&mut b]);
        assert!(err.is_err());
        assert!(a.is_empty());
        assert!(b.contains(&name("x")));
    }

    #[test]
    fn test_disjunctive_union_evicts_only_added() {
        let mut a: MutExclSet<PropName> = MutExclSet::new();
        let mut b: MutExclSet<PropName> = MutExclSet::new();
        a.add([name("p")], &mut []).unwrap();
        b.add([name("q")], &mut []).unwrap();
        // p is in both a and b only in this test setup, bypassing exclusivity.
        b.add([name("p")], &mut []).unwrap();

        let mut other: ValidSet<PropName> = ValidSet::new();
        other.add([name("p"), name("q")]).unwrap();
        a.disjunctive_union(&other, &mut [&mut b]).unwrap();

        assert!(!a.contains(&name("p")));
        assert!(a.contains(&name("q")));
        assert!(b.contains(&name("p")));
        assert!(!b.contains(&name("q")));
    }

    #[test]
    fn test_map_and_set_siblings() {
        let mut to_set: MutExclMap<PropName, PropValue> = MutExclMap::new();
        let mut to_remove: MutExclSet<PropName> = MutExclSet::new();

        to_remove.add([name("a"), name("b")], &mut [&mut to_set]).unwrap();
        to_set.set(name("a"), PropValue::Int(1), &mut [&mut to_remove]).unwrap();
        assert!(!to_remove.contains(&name("a")));
        assert!(to_remove.contains(&name("b")));

        to_set
            .set_all([(name("b"), PropValue::Bool(true))], &mut [&mut to_remove])
            .unwrap();
        assert!(to_remove.is_empty());

        to_remove.add([name("a")], &mut [&mut to_set]).unwrap();
        assert!(!to_set.contains_key(&name("a")));
        assert_eq!(to_set.len(), 1);
    }
}
