//! Match conditions: disjunctions of clauses.

use super::{LinkMatchClause, NodeMatchClause, PropMatchClause};

/// A conjunction of constraints tested against one target.
pub trait Clause {
    type Target;

    /// Whether `target` satisfies every constraint. An absent target
    /// satisfies no node or link clause.
    fn matches(&self, target: Option<&Self::Target>) -> bool;
}

/// A list of clauses; the condition holds if any clause holds.
///
/// An empty condition matches nothing. "No condition at all" is spelled
/// `Option::<&MatchCond<_>>::None` and matches everything; see
/// [`cond_matches`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCond<C>(Vec<C>);

pub type PropMatchCond = MatchCond<PropMatchClause>;
pub type NodeMatchCond = MatchCond<NodeMatchClause>;
pub type LinkMatchCond = MatchCond<LinkMatchClause>;

impl<C> MatchCond<C> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, clause: C) {
        self.0.push(clause);
    }

    pub fn clauses(&self) -> &[C] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C: Clause> MatchCond<C> {
    /// Whether any clause matches `target`.
    pub fn matches(&self, target: Option<&C::Target>) -> bool {
        self.0.iter().any(|clause| clause.matches(target))
    }
}

impl<C> Default for MatchCond<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> From<Vec<C>> for MatchCond<C> {
    fn from(clauses: Vec<C>) -> Self {
        Self(clauses)
    }
}

impl<C> FromIterator<C> for MatchCond<C> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a, C> IntoIterator for &'a MatchCond<C> {
    type Item = &'a C;
    type IntoIter = std::slice::Iter<'a, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Evaluate an optional condition. `None` matches every target, including
/// an absent one.
pub fn cond_matches<C: Clause>(cond: Option<&MatchCond<C>>, target: Option<&C::Target>) -> bool {
    cond.is_none_or(|cond| cond.matches(target))
}
