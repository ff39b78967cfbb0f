//! ValidSet — a hash set whose items always pass a validator.

use std::fmt;
use std::hash::Hash;

use hashbrown::HashSet;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use smallvec::SmallVec;

use super::{RemoveKeys, Validate, Validator};
use crate::Result;

/// Batches up to this size are staged on the stack while validating.
pub(crate) const INLINE_BATCH: usize = 8;

/// Set in which every item is valid. Iteration order is unspecified.
pub struct ValidSet<T> {
    items: HashSet<T>,
    validator: Validator<T>,
}

impl<T: Eq + Hash + Validate> ValidSet<T> {
    pub fn new() -> Self {
        Self::with_validator(None, Validator::default())
    }

    /// `capacity` is a hint; `None` leaves it unspecified.
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self::with_validator(capacity, Validator::default())
    }
}

impl<T: Eq + Hash + Validate> Default for ValidSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash> ValidSet<T> {
    pub fn with_validator(capacity: Option<usize>, validator: Validator<T>) -> Self {
        let items = match capacity {
            Some(n) => HashSet::with_capacity(n),
            None => HashSet::new(),
        };
        Self { items, validator }
    }

    pub fn validator(&self) -> Validator<T> {
        self.validator
    }

    // ========================================================================
    // Growing (validated, all-or-nothing)
    // ========================================================================

    /// Insert `items`. Fails without inserting anything if any item is
    /// invalid.
    pub fn add(&mut self, items: impl IntoIterator<Item = T>) -> Result<()> {
        let batch: SmallVec<[T; INLINE_BATCH]> = items.into_iter().collect();
        for x in &batch {
            self.validator.check(x)?;
        }
        self.items.extend(batch);
        Ok(())
    }

    /// Insert every item of `other`.
    pub fn union(&mut self, other: &ValidSet<T>) -> Result<()>
    where
        T: Clone,
    {
        self.add(other.items.iter().cloned())
    }

    /// Keep the items in exactly one of `self` and `other`.
    ///
    /// Only items new to `self` are validated; items present in both are
    /// removed.
    pub fn disjunctive_union(&mut self, other: &ValidSet<T>) -> Result<()>
    where
        T: Clone,
    {
        for x in other.items.difference(&self.items) {
            self.validator.check(x)?;
        }
        for x in &other.items {
            if !self.items.remove(x) {
                self.items.insert(x.clone());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Shrinking (never fails)
    // ========================================================================

    pub fn remove<'a>(&mut self, items: impl IntoIterator<Item = &'a T>)
    where
        T: 'a,
    {
        for x in items {
            self.items.remove(x);
        }
    }

    /// Keep only the items also in `other`.
    pub fn intersect(&mut self, other: &ValidSet<T>) {
        self.items.retain(|x| other.items.contains(x));
    }

    /// Drop the items also in `other`.
    pub fn subtract(&mut self, other: &ValidSet<T>) {
        self.items.retain(|x| !other.items.contains(x));
    }

    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn contains(&self, x: &T) -> bool {
        self.items.contains(x)
    }

    /// Whether every item of `other` is in `self`.
    pub fn contains_all(&self, other: &ValidSet<T>) -> bool {
        other.items.is_subset(&self.items)
    }

    /// Whether `self` and `other` share an item.
    pub fn contains_any(&self, other: &ValidSet<T>) -> bool {
        !self.items.is_disjoint(&other.items)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Eq + Hash> RemoveKeys<T> for ValidSet<T> {
    fn remove_keys(&mut self, keys: &[T]) {
        self.remove(keys);
    }
}

impl<'a, T: Eq + Hash> IntoIterator for &'a ValidSet<T> {
    type Item = &'a T;
    type IntoIter = hashbrown::hash_set::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Clone> Clone for ValidSet<T> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            validator: self.validator,
        }
    }
}

/// Equal when the items are equal; validators are not compared.
impl<T: Eq + Hash> PartialEq for ValidSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq + Hash> Eq for ValidSet<T> {}

impl<T: fmt::Debug> fmt::Debug for ValidSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.iter()).finish()
    }
}

impl<T: Serialize> Serialize for ValidSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.items)
    }
}

impl<'de, T> Deserialize<'de> for ValidSet<T>
where
    T: Deserialize<'de> + Eq + Hash + Validate,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut set = ValidSet::with_capacity(Some(items.len()));
        set.add(items).map_err(serde::de::Error::custom)?;
        Ok(set)
    }
}
