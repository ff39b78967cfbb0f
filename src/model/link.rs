//! Link (directed, typed edge) in the Semantic Link Network.

use serde::{Deserialize, Serialize};

use super::{Id, Node, PropMap, PropName, PropValue, Type};
use crate::Result;

/// A semantic link from one node to another.
///
/// The endpoints are node snapshots taken when the link was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: Id,
    pub typ: Type,
    pub props: PropMap,
    pub from: Node,
    pub to: Node,
}

impl Link {
    pub fn new(id: Id, from: Node, to: Node) -> Self {
        let typ = id.typ().clone();
        Self {
            id,
            typ,
            props: PropMap::new(),
            from,
            to,
        }
    }

    pub fn with_props(mut self, props: PropMap) -> Self {
        self.props = props;
        self
    }

    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Result<Self> {
        self.props.set_prop(PropName::new(name)?, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &PropName) -> Option<&PropValue> {
        self.props.get(name)
    }

    /// The node at the other end from `node`, if `node` is an endpoint.
    pub fn other_node(&self, node: &Id) -> Option<&Node> {
        if *node == self.from.id {
            Some(&self.to)
        } else if *node == self.to.id {
            Some(&self.from)
        } else {
            None
        }
    }
}
