//! Node and link match clauses.

use super::{Clause, PropMatchClause};
use crate::model::{Id, Link, Node, PropMap, Type};

/// Constraints shared by node and link clauses. `None` means unconstrained.
#[derive(Debug, Clone, PartialEq, Default)]
struct EntityConds {
    id: Option<Id>,
    typ: Option<Type>,
    props: Option<PropMatchClause>,
}

impl EntityConds {
    fn set_id(&mut self, id: Id) {
        self.id = id.is_valid().then_some(id);
    }

    fn set_type(&mut self, typ: Type) {
        self.typ = typ.is_valid().then_some(typ);
    }

    fn matches(&self, id: &Id, typ: &Type, props: &PropMap) -> bool {
        self.id.as_ref().is_none_or(|want| want == id)
            && self.typ.as_ref().is_none_or(|want| want == typ)
            && self.props.as_ref().is_none_or(|pmc| pmc.matches(Some(props)))
    }
}

macro_rules! entity_conds_accessors {
    () => {
        /// The required id, if any.
        pub fn id(&self) -> Option<&Id> {
            self.conds.id.as_ref()
        }

        /// Require id `id`. An invalid id lifts the constraint.
        pub fn set_id(&mut self, id: Id) {
            self.conds.set_id(id);
        }

        pub fn typ(&self) -> Option<&Type> {
            self.conds.typ.as_ref()
        }

        /// Require type `typ`. An invalid type lifts the constraint.
        pub fn set_type(&mut self, typ: Type) {
            self.conds.set_type(typ);
        }

        pub fn prop_clause(&self) -> Option<&PropMatchClause> {
            self.conds.props.as_ref()
        }

        pub fn set_prop_clause(&mut self, pmc: Option<PropMatchClause>) {
            self.conds.props = pmc;
        }

        pub fn with_id(mut self, id: Id) -> Self {
            self.set_id(id);
            self
        }

        pub fn with_type(mut self, typ: Type) -> Self {
            self.set_type(typ);
            self
        }

        pub fn with_prop_clause(mut self, pmc: PropMatchClause) -> Self {
            self.conds.props = Some(pmc);
            self
        }
    };
}

// ============================================================================
// NodeMatchClause
// ============================================================================

/// Constraints on one node: id, type, and properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeMatchClause {
    conds: EntityConds,
}

impl NodeMatchClause {
    pub fn new() -> Self {
        Self::default()
    }

    entity_conds_accessors!();

    /// Require id `id` and drop every other constraint.
    pub fn set_id_and_clear_other_conds(&mut self, id: Id) {
        self.conds = EntityConds::default();
        self.conds.set_id(id);
    }
}

impl Clause for NodeMatchClause {
    type Target = Node;

    fn matches(&self, node: Option<&Node>) -> bool {
        node.is_some_and(|n| self.conds.matches(&n.id, &n.typ, &n.props))
    }
}

// ============================================================================
// LinkMatchClause
// ============================================================================

/// Constraints on one link: id, type, properties, and either endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkMatchClause {
    conds: EntityConds,
    from: Option<NodeMatchClause>,
    to: Option<NodeMatchClause>,
}

impl LinkMatchClause {
    pub fn new() -> Self {
        Self::default()
    }

    entity_conds_accessors!();

    /// Require id `id` and drop every other constraint, endpoints included.
    pub fn set_id_and_clear_other_conds(&mut self, id: Id) {
        self.conds = EntityConds::default();
        self.conds.set_id(id);
        self.from = None;
        self.to = None;
    }

    pub fn from_clause(&self) -> Option<&NodeMatchClause> {
        self.from.as_ref()
    }

    pub fn set_from_clause(&mut self, nmc: Option<NodeMatchClause>) {
        self.from = nmc;
    }

    pub fn to_clause(&self) -> Option<&NodeMatchClause> {
        self.to.as_ref()
    }

    pub fn set_to_clause(&mut self, nmc: Option<NodeMatchClause>) {
        self.to = nmc;
    }

    pub fn with_from(mut self, nmc: NodeMatchClause) -> Self {
        self.from = Some(nmc);
        self
    }

    pub fn with_to(mut self, nmc: NodeMatchClause) -> Self {
        self.to = Some(nmc);
        self
    }
}

impl Clause for LinkMatchClause {
    type Target = Link;

    fn matches(&self, link: Option<&Link>) -> bool {
        let Some(link) = link else {
            return false;
        };
        self.conds.matches(&link.id, &link.typ, &link.props)
            && self.from.as_ref().is_none_or(|c| c.matches(Some(&link.from)))
            && self.to.as_ref().is_none_or(|c| c.matches(Some(&link.to)))
    }
}
