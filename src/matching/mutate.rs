//! PropMutateArg — a batch of property updates.

use crate::collections::{MutExclMap, MutExclSet};
use crate::model::{PropMap, PropName, PropNameSet, PropValue};
use crate::Result;

/// Properties to set and properties to remove, applied together.
///
/// A name is in at most one of the two: setting a name drops it from the
/// removal list and removing a name drops it from the set list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropMutateArg {
    to_be_set: MutExclMap<PropName, PropValue>,
    to_be_removed: MutExclSet<PropName>,
}

impl PropMutateArg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(set_capacity: Option<usize>, remove_capacity: Option<usize>) -> Self {
        Self {
            to_be_set: MutExclMap::with_capacity(set_capacity),
            to_be_removed: MutExclSet::with_capacity(remove_capacity),
        }
    }

    pub fn set(&mut self, name: PropName, value: impl Into<PropValue>) -> Result<()> {
        self.to_be_set.set(name, value.into(), &mut [&mut self.to_be_removed])
    }

    pub fn set_map(&mut self, props: &PropMap) -> Result<()> {
        self.to_be_set.set_map(props, &mut [&mut self.to_be_removed])
    }

    pub fn remove(&mut self, names: impl IntoIterator<Item = PropName>) -> Result<()> {
        self.to_be_removed.add(names, &mut [&mut self.to_be_set])
    }

    /// Forget `names` entirely: neither set nor remove them.
    pub fn discard(&mut self, names: &[PropName]) {
        self.to_be_set.remove(names);
        self.to_be_removed.remove(names);
    }

    pub fn clear(&mut self) {
        self.to_be_set.clear();
        self.to_be_removed.clear();
    }

    pub fn to_be_set(&self) -> &PropMap {
        &self.to_be_set
    }

    pub fn to_be_removed(&self) -> &PropNameSet {
        &self.to_be_removed
    }

    pub fn is_empty(&self) -> bool {
        self.to_be_set.is_empty() && self.to_be_removed.is_empty()
    }

    /// Apply the updates to `props`.
    pub fn apply_to(&self, props: &mut PropMap) -> Result<()> {
        props.set_map(&self.to_be_set)?;
        props.remove(self.to_be_removed.iter());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    #[test]
    fn test_set_and_remove_exclude_each_other() {
        let mut pma = PropMutateArg::new();
        pma.remove([name("a"), name("b")]).unwrap();
        pma.set(name("a"), 1i64).unwrap();
        assert!(pma.to_be_set().contains_key(&name("a")));
        assert!(!pma.to_be_removed().contains(&name("a")));
        assert!(pma.to_be_removed().contains(&name("b")));

        pma.remove([name("a")]).unwrap();
        assert!(pma.to_be_set().is_empty());
        assert_eq!(pma.to_be_removed().len(), 2);
    }

    #[test]
    fn test_invalid_name_leaves_arg_unchanged() {
        let mut pma = PropMutateArg::new();
        pma.set(name("a"), true).unwrap();
        let before = pma.clone();
        assert!(pma.remove([name("a"), PropName::default()]).is_err());
        assert_eq!(pma, before);
    }

    #[test]
    fn test_apply_to() {
        let mut props = PropMap::new();
        props.set_prop(name("keep"), 1i64).unwrap();
        props.set_prop(name("drop"), 2i64).unwrap();
        props.set_prop(name("change"), 3i64).unwrap();

        let mut pma = PropMutateArg::new();
        pma.set(name("change"), "three").unwrap();
        pma.set(name("added"), 4.0f64).unwrap();
        pma.remove([name("drop"), name("never_there")]).unwrap();
        pma.apply_to(&mut props).unwrap();

        assert_eq!(props.len(), 3);
        assert_eq!(props.get(&name("change")), Some(&PropValue::from("three")));
        assert_eq!(props.get(&name("added")), Some(&PropValue::Float64(4.0)));
        assert!(!props.contains_key(&name("drop")));
    }

    #[test]
    fn test_discard_and_clear() {
        let mut pma = PropMutateArg::new();
        pma.set(name("a"), 1i64).unwrap();
        pma.remove([name("b")]).unwrap();
        pma.discard(&[name("a")]);
        assert!(pma.to_be_set().is_empty());
        pma.clear();
        assert!(pma.is_empty());
    }
}
