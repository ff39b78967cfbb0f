//! PropMatchClause — constraints on the properties of one entity.

use super::Clause;
use crate::collections::{MutExclMap, MutExclSet};
use crate::model::{PropMap, PropName, PropNameSet, PropValue};
use crate::Result;

/// Property constraints that must all hold.
///
/// - `equal`: the property exists with an equal value (same kind, same
///   value; no cross-kind conversion)
/// - `present`: the property exists
/// - `absent`: the property does not exist
///
/// A name is in at most one of the three.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropMatchClause {
    equal: MutExclMap<PropName, PropValue>,
    present: MutExclSet<PropName>,
    absent: MutExclSet<PropName>,
}

impl PropMatchClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(equal: Option<usize>, present: Option<usize>, absent: Option<usize>) -> Self {
        Self {
            equal: MutExclMap::with_capacity(equal),
            present: MutExclSet::with_capacity(present),
            absent: MutExclSet::with_capacity(absent),
        }
    }

    // ========================================================================
    // Building
    // ========================================================================

    pub fn set_equal(&mut self, name: PropName, value: impl Into<PropValue>) -> Result<()> {
        self.equal
            .set(name, value.into(), &mut [&mut self.present, &mut self.absent])
    }

    pub fn set_equal_map(&mut self, props: &PropMap) -> Result<()> {
        self.equal
            .set_map(props, &mut [&mut self.present, &mut self.absent])
    }

    pub fn add_present(&mut self, names: impl IntoIterator<Item = PropName>) -> Result<()> {
        self.present
            .add(names, &mut [&mut self.equal, &mut self.absent])
    }

    pub fn add_absent(&mut self, names: impl IntoIterator<Item = PropName>) -> Result<()> {
        self.absent
            .add(names, &mut [&mut self.equal, &mut self.present])
    }

    pub fn with_equal(mut self, name: PropName, value: impl Into<PropValue>) -> Result<Self> {
        self.set_equal(name, value)?;
        Ok(self)
    }

    pub fn with_present(mut self, names: impl IntoIterator<Item = PropName>) -> Result<Self> {
        self.add_present(names)?;
        Ok(self)
    }

    pub fn with_absent(mut self, names: impl IntoIterator<Item = PropName>) -> Result<Self> {
        self.add_absent(names)?;
        Ok(self)
    }

    /// Drop every constraint on `names`.
    pub fn discard(&mut self, names: &[PropName]) {
        self.equal.remove(names);
        self.present.remove(names);
        self.absent.remove(names);
    }

    pub fn clear(&mut self) {
        self.equal.clear();
        self.present.clear();
        self.absent.clear();
    }

    // ========================================================================
    // Reading
    // ========================================================================

    pub fn equal(&self) -> &PropMap {
        &self.equal
    }

    pub fn present(&self) -> &PropNameSet {
        &self.present
    }

    pub fn absent(&self) -> &PropNameSet {
        &self.absent
    }

    pub fn is_empty(&self) -> bool {
        self.equal.is_empty() && self.present.is_empty() && self.absent.is_empty()
    }
}

impl Clause for PropMatchClause {
    type Target = PropMap;

    /// With no properties (absent or empty), only a clause without
    /// `equal` and `present` constraints matches.
    fn matches(&self, props: Option<&PropMap>) -> bool {
        let Some(props) = props.filter(|p| !p.is_empty()) else {
            return self.equal.is_empty() && self.present.is_empty();
        };
        self.equal
            .iter()
            .all(|(name, want)| props.get(name) == Some(want))
            && self.present.iter().all(|name| props.contains_key(name))
            && !self.absent.iter().any(|name| props.contains_key(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    fn props(pairs: &[(&str, PropValue)]) -> PropMap {
        let mut pm = PropMap::new();
        for (k, v) in pairs {
            pm.set(name(k), v.clone()).unwrap();
        }
        pm
    }

    #[test]
    fn test_equal() {
        let pmc = PropMatchClause::new().with_equal(name("age"), 30i64).unwrap();
        assert!(pmc.matches(Some(&props(&[("age", 30i64.into()), ("city", "X".into())]))));
        assert!(!pmc.matches(Some(&props(&[("age", 31i64.into())]))));
        assert!(!pmc.matches(Some(&props(&[]))));
        assert!(!pmc.matches(None));
        // Same number, different kind.
        assert!(!pmc.matches(Some(&props(&[("age", 30i32.into())]))));
    }

    #[test]
    fn test_present_and_absent() {
        let pmc = PropMatchClause::new()
            .with_present([name("x")])
            .unwrap()
            .with_absent([name("y")])
            .unwrap();
        assert!(pmc.matches(Some(&props(&[("x", 1i64.into())]))));
        assert!(!pmc.matches(Some(&props(&[("x", 1i64.into()), ("y", 1i64.into())]))));
        assert!(!pmc.matches(None));
    }

    #[test]
    fn test_absent_only_matches_no_props() {
        let pmc = PropMatchClause::new().with_absent([name("y")]).unwrap();
        assert!(pmc.matches(None));
        assert!(pmc.matches(Some(&PropMap::new())));
        assert!(PropMatchClause::new().matches(None));
    }

    #[test]
    fn test_three_way_exclusion() {
        let mut pmc = PropMatchClause::new();
        pmc.set_equal(name("k"), 1i64).unwrap();
        pmc.add_present([name("k")]).unwrap();
        assert!(pmc.equal().is_empty());
        assert!(pmc.present().contains(&name("k")));

        pmc.add_absent([name("k")]).unwrap();
        assert!(pmc.present().is_empty());
        assert!(pmc.absent().contains(&name("k")));

        pmc.set_equal(name("k"), 2i64).unwrap();
        assert!(pmc.absent().is_empty());
        assert_eq!(pmc.equal().len(), 1);

        pmc.discard(&[name("k")]);
        assert!(pmc.is_empty());
    }
}
