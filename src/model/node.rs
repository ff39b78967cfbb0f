//! Node in the Semantic Link Network.

use serde::{Deserialize, Serialize};

use super::{Id, PropMap, PropName, PropValue, Type};
use crate::Result;

/// A semantic node: a snapshot of its id, type, and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: Id,
    pub typ: Type,
    pub props: PropMap,
}

impl Node {
    /// A node of the id's own type with no properties.
    pub fn new(id: Id) -> Self {
        let typ = id.typ().clone();
        Self {
            id,
            typ,
            props: PropMap::new(),
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
}
