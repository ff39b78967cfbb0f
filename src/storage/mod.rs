//! # SLN Façade
//!
//! [`Sln`] is THE contract between the data model and any store that keeps
//! nodes and links. Everything a caller can do to a Semantic Link Network
//! goes through it.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryBackend` | `memory` | In-memory, for testing and embedding |
//!
//! The [`cypher`] module holds the pieces a Cypher-speaking backend needs to
//! translate ids, property maps, and match conditions.
//!
//! ## Contract
//!
//! - Implementations are safe for concurrent use.
//! - Every operation takes a [`Context`] and gives up with
//!   `Error::Cancelled` / `Error::DeadlineExceeded` once it is done.
//! - [`Sln::close`] waits for in-flight operations instead of interrupting
//!   them. Operations started after close fail with `Error::Closed`. Later
//!   calls to `close` wait for the first one and return its outcome.

pub mod memory;
pub mod cypher;

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::matching::{LinkMatchCond, NodeMatchCond, PropMutateArg};
use crate::model::*;
use crate::{Error, Result};

pub use memory::{MemoryBackend, MemoryConfig};

// ============================================================================
// Backend Configuration
// ============================================================================

/// Which backend to open, and how.
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// In-memory (no persistence)
    Memory(MemoryConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Memory(MemoryConfig::default())
    }
}

/// Open the backend described by `config`.
pub fn open(config: &BackendConfig) -> Result<Arc<dyn Sln>> {
    match config {
        BackendConfig::Memory(mc) => Ok(Arc::new(MemoryBackend::with_config(mc.clone()))),
    }
}

// ============================================================================
// Sln Trait
// ============================================================================

/// CRUD on a Semantic Link Network.
///
/// `prop_types` arguments project the returned properties: names not in the
/// map are dropped, and the rest are converted to the listed kind (failing
/// with `PropTypeMismatch` when the stored kind does not convert). `None`
/// returns every property as stored.
///
/// `cond` arguments filter entities; `None` selects all of them.
#[async_trait]
pub trait Sln: Send + Sync {
    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Mark the network unusable and release its resources.
    async fn close(&self) -> Result<()>;

    // ========================================================================
    // Types and counts
    // ========================================================================

    async fn node_types(&self, ctx: &Context) -> Result<Vec<Type>>;

    async fn link_types(&self, ctx: &Context) -> Result<Vec<Type>>;

    async fn num_node_types(&self, ctx: &Context) -> Result<usize> {
        Ok(self.node_types(ctx).await?.len())
    }

    async fn num_link_types(&self, ctx: &Context) -> Result<usize> {
        Ok(self.link_types(ctx).await?.len())
    }

    async fn num_nodes(&self, ctx: &Context, cond: Option<&NodeMatchCond>) -> Result<usize> {
        Ok(self.all_nodes(ctx, None, cond).await?.len())
    }

    async fn num_links(&self, ctx: &Context, cond: Option<&LinkMatchCond>) -> Result<usize> {
        Ok(self.all_links(ctx, None, cond).await?.len())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Fails with `NodeNotFound` if there is no such node.
    async fn node_by_id(&self, ctx: &Context, id: &Id, prop_types: Option<&PropTypeMap>) -> Result<Node>;

    /// Fails with `LinkNotFound` if there is no such link.
    async fn link_by_id(&self, ctx: &Context, id: &Id, prop_types: Option<&PropTypeMap>) -> Result<Link>;

    async fn all_nodes(
        &self,
        ctx: &Context,
        prop_types: Option<&PropTypeMap>,
        cond: Option<&NodeMatchCond>,
    ) -> Result<Vec<Node>>;

    async fn all_links(
        &self,
        ctx: &Context,
        prop_types: Option<&PropTypeMap>,
        cond: Option<&LinkMatchCond>,
    ) -> Result<Vec<Link>>;

    // ========================================================================
    // Writes
    // ========================================================================

    /// Fails with `InvalidType` if `typ` is invalid.
    async fn create_node(&self, ctx: &Context, typ: &Type, props: PropMap) -> Result<Node>;

    /// Fails with `InvalidType` if `typ` is invalid and with `NodeNotFound`
    /// if either endpoint does not exist.
    async fn create_link(&self, ctx: &Context, typ: &Type, from: &Id, to: &Id, props: PropMap) -> Result<Link>;

    /// Remove a node and every link attached to it. Succeeds if there is no
    /// such node.
    async fn remove_node_by_id(&self, ctx: &Context, id: &Id) -> Result<()>;

    /// Succeeds if there is no such link.
    async fn remove_link_by_id(&self, ctx: &Context, id: &Id) -> Result<()>;

    /// Replace every property on a node. An empty map removes them all.
    async fn set_node_props(&self, ctx: &Context, id: &Id, props: PropMap) -> Result<Node>;

    /// Replace every property on a link. An empty map removes them all.
    async fn set_link_props(&self, ctx: &Context, id: &Id, props: PropMap) -> Result<Link>;

    async fn mutate_node_props(&self, ctx: &Context, id: &Id, pma: &PropMutateArg) -> Result<Node>;

    async fn mutate_link_props(&self, ctx: &Context, id: &Id, pma: &PropMutateArg) -> Result<Link>;
}

// ============================================================================
// Projection helper
// ============================================================================

/// Keep only the properties named in `prop_types`, converted to the listed
/// kinds. `None` keeps everything unchanged.
pub fn project_props(props: &PropMap, prop_types: Option<&PropTypeMap>) -> Result<PropMap> {
    let Some(prop_types) = prop_types else {
        return Ok(props.clone());
    };
    let mut out = PropMap::with_capacity(Some(prop_types.len()));
    for (name, &want) in prop_types {
        let Some(value) = props.get(name) else {
            continue;
        };
        let converted = value.convert(want).ok_or_else(|| Error::PropTypeMismatch {
            name: name.to_string(),
            got: value.prop_type(),
            want,
        })?;
        out.set(name.clone(), converted)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> PropName {
        PropName::new(s).unwrap()
    }

    #[test]
    fn test_project_props() {
        let mut props = PropMap::new();
        props.set_prop(name("age"), 30i8).unwrap();
        props.set_prop(name("nick"), "ada").unwrap();
        props.set_prop(name("hidden"), true).unwrap();

        let types = PropTypeMap::from_pairs([
            ("age", PropType::Int64),
            ("nick", PropType::Bytes),
            ("missing", PropType::Bool),
        ])
        .unwrap();
        let out = project_props(&props, Some(&types)).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(&name("age")), Some(&PropValue::Int64(30)));
        assert_eq!(out.get(&name("nick")), Some(&PropValue::Bytes(b"ada".to_vec())));

        assert_eq!(project_props(&props, None).unwrap(), props);
    }

    #[test]
    fn test_project_props_mismatch() {
        let mut props = PropMap::new();
        props.set_prop(name("flag"), true).unwrap();
        let types = PropTypeMap::from_pairs([("flag", PropType::Int)]).unwrap();
        assert_eq!(
            project_props(&props, Some(&types)),
            Err(Error::PropTypeMismatch {
                name: "flag".into(),
                got: PropType::Bool,
                want: PropType::Int,
            })
        );
    }

    #[test]
    fn test_open_memory() {
        let net = open(&BackendConfig::default());
        assert!(net.is_ok());
    }
}
