//! In-memory storage backend.
//!
//! This is the reference implementation of `Sln`. Nodes and links live in
//! hash maps behind `parking_lot` locks; match conditions are evaluated
//! in memory against each stored entity.
//!
//! ## Limitations
//!
//! - **No persistence**: everything is dropped on close.
//! - **Full scans**: `all_nodes` / `all_links` test every entity against
//!   the condition. There are no property indexes.
//!
//! ## Locking
//!
//! A `tokio::sync::RwLock<bool>` gates the whole backend. Every operation
//! holds it shared; `close` takes it exclusively, so it waits for in-flight
//! operations, and anything queued behind it sees the closed flag. The
//! entity maps are always locked nodes first, then links.

use std::sync::Arc;

use async_trait::async_trait;
use hashbrown::HashMap;
use parking_lot::RwLock;
use tokio::sync::{OnceCell, RwLockReadGuard};
use tracing::{debug, info, instrument};

use crate::context::Context;
use crate::matching::{cond_matches, LinkMatchCond, NodeMatchCond, PropMutateArg};
use crate::model::*;
use crate::{Error, Result};
use super::{project_props, Sln};

// ============================================================================
// Configuration
// ============================================================================

/// Capacity hints for the in-memory maps. `None` leaves them unspecified.
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    pub node_capacity: Option<usize>,
    pub link_capacity: Option<usize>,
}

// ============================================================================
// MemoryBackend
// ============================================================================

/// In-memory Semantic Link Network.
///
/// Cloning yields another handle to the same network.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    /// `true` once closed.
    gate: tokio::sync::RwLock<bool>,
    close_outcome: OnceCell<Result<()>>,
    nodes: RwLock<HashMap<Id, Node>>,
    links: RwLock<HashMap<Id, StoredLink>>,
    serials: SerialAllocator,
}

/// A link as stored: endpoints by id, resolved to nodes on read.
#[derive(Debug, Clone)]
struct StoredLink {
    typ: Type,
    props: PropMap,
    from: Id,
    to: Id,
}

impl StoredLink {
    fn materialize(&self, id: &Id, nodes: &HashMap<Id, Node>) -> Result<Link> {
        let endpoint = |nid: &Id| {
            nodes
                .get(nid)
                .cloned()
                .ok_or_else(|| Error::NodeNotFound(nid.clone()))
        };
        Ok(Link {
            id: id.clone(),
            typ: self.typ.clone(),
            props: self.props.clone(),
            from: endpoint(&self.from)?,
            to: endpoint(&self.to)?,
        })
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        let nodes = config.node_capacity.map_or_else(HashMap::new, HashMap::with_capacity);
        let links = config.link_capacity.map_or_else(HashMap::new, HashMap::with_capacity);
        Self {
            inner: Arc::new(MemoryInner {
                gate: tokio::sync::RwLock::new(false),
                close_outcome: OnceCell::new(),
                nodes: RwLock::new(nodes),
                links: RwLock::new(links),
                serials: SerialAllocator::new(),
            }),
        }
    }

    /// Check the context, then hold the gate open for one operation.
    async fn enter(&self, ctx: &Context) -> Result<RwLockReadGuard<'_, bool>> {
        ctx.check()?;
        let guard = tokio::select! {
            biased;
            guard = self.inner.gate.read() => guard,
            _ = ctx.done() => return Err(ctx.err().unwrap_or(Error::Cancelled)),
        };
        if *guard {
            return Err(Error::Closed);
        }
        Ok(guard)
    }

    fn issue_id(&self, typ: &Type) -> Id {
        self.inner.serials.issue(typ, Date::now())
    }

    fn link_snapshot(&self, id: &Id) -> Result<Link> {
        let nodes = self.inner.nodes.read();
        let links = self.inner.links.read();
        let stored = links.get(id).ok_or_else(|| Error::LinkNotFound(id.clone()))?;
        stored.materialize(id, &nodes)
    }

    fn update_node(&self, id: &Id, update: impl FnOnce(&mut PropMap) -> Result<()>) -> Result<Node> {
        let mut nodes = self.inner.nodes.write();
        let node = nodes.get_mut(id).ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        let mut props = node.props.clone();
        update(&mut props)?;
        node.props = props;
        Ok(node.clone())
    }

    fn update_link(&self, id: &Id, update: impl FnOnce(&mut PropMap) -> Result<()>) -> Result<Link> {
        let nodes = self.inner.nodes.read();
        let mut links = self.inner.links.write();
        let stored = links.get_mut(id).ok_or_else(|| Error::LinkNotFound(id.clone()))?;
        let mut props = stored.props.clone();
        update(&mut props)?;
        stored.props = props;
        stored.materialize(id, &nodes)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_types(types: impl Iterator<Item = Type>) -> Vec<Type> {
    let mut types: Vec<Type> = types.collect();
    types.sort();
    types.dedup();
    types
}

// ============================================================================
// Sln impl
// ============================================================================

#[async_trait]
impl Sln for MemoryBackend {
    #[instrument(skip(self))]
    async fn close(&self) -> Result<()> {
        self.inner
            .close_outcome
            .get_or_init(|| async {
                let mut closed = self.inner.gate.write().await;
                *closed = true;
                let (n, l) = {
                    let mut nodes = self.inner.nodes.write();
                    let mut links = self.inner.links.write();
                    let counts = (nodes.len(), links.len());
                    nodes.clear();
                    links.clear();
                    counts
                };
                info!(nodes = n, links = l, "memory SLN closed");
                Ok(())
            })
            .await
            .clone()
    }

    // ========================================================================
    // Types and counts
    // ========================================================================

    async fn node_types(&self, ctx: &Context) -> Result<Vec<Type>> {
        let _gate = self.enter(ctx).await?;
        let nodes = self.inner.nodes.read();
        Ok(sorted_types(nodes.values().map(|n| n.typ.clone())))
    }

    async fn link_types(&self, ctx: &Context) -> Result<Vec<Type>> {
        let _gate = self.enter(ctx).await?;
        let links = self.inner.links.read();
        Ok(sorted_types(links.values().map(|l| l.typ.clone())))
    }

    async fn num_nodes(&self, ctx: &Context, cond: Option<&NodeMatchCond>) -> Result<usize> {
        let _gate = self.enter(ctx).await?;
        let nodes = self.inner.nodes.read();
        Ok(nodes.values().filter(|n| cond_matches(cond, Some(*n))).count())
    }

    // ========================================================================
    // Reads
    // ========================================================================

    async fn node_by_id(&self, ctx: &Context, id: &Id, prop_types: Option<&PropTypeMap>) -> Result<Node> {
        let _gate = self.enter(ctx).await?;
        let mut node = self
            .inner
            .nodes
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NodeNotFound(id.clone()))?;
        node.props = project_props(&node.props, prop_types)?;
        Ok(node)
    }

    async fn link_by_id(&self, ctx: &Context, id: &Id, prop_types: Option<&PropTypeMap>) -> Result<Link> {
        let _gate = self.enter(ctx).await?;
        let mut link = self.link_snapshot(id)?;
        link.props = project_props(&link.props, prop_types)?;
        Ok(link)
    }

    async fn all_nodes(
        &self,
        ctx: &Context,
        prop_types: Option<&PropTypeMap>,
        cond: Option<&NodeMatchCond>,
    ) -> Result<Vec<Node>> {
        let _gate = self.enter(ctx).await?;
        let matched: Vec<Node> = {
            let nodes = self.inner.nodes.read();
            nodes
                .values()
                .filter(|n| cond_matches(cond, Some(*n)))
                .cloned()
                .collect()
        };
        matched
            .into_iter()
            .map(|mut node| {
                node.props = project_props(&node.props, prop_types)?;
                Ok(node)
            })
            .collect()
    }

    async fn all_links(
        &self,
        ctx: &Context,
        prop_types: Option<&PropTypeMap>,
        cond: Option<&LinkMatchCond>,
    ) -> Result<Vec<Link>> {
        let _gate = self.enter(ctx).await?;
        let matched: Vec<Link> = {
            let nodes = self.inner.nodes.read();
            let links = self.inner.links.read();
            let mut matched = Vec::new();
            for (id, stored) in links.iter() {
                let link = stored.materialize(id, &nodes)?;
                if cond_matches(cond, Some(&link)) {
                    matched.push(link);
                }
            }
            matched
        };
        matched
            .into_iter()
            .map(|mut link| {
                link.props = project_props(&link.props, prop_types)?;
                Ok(link)
            })
            .collect()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    #[instrument(skip(self, ctx, props), fields(typ = %typ))]
    async fn create_node(&self, ctx: &Context, typ: &Type, props: PropMap) -> Result<Node> {
        let _gate = self.enter(ctx).await?;
        if !typ.is_valid() {
            return Err(Error::InvalidType(typ.to_string()));
        }
        let node = Node::new(self.issue_id(typ)).with_props(props);
        self.inner.nodes.write().insert(node.id.clone(), node.clone());
        debug!(id = %node.id, "node created");
        Ok(node)
    }

    #[instrument(skip(self, ctx, props), fields(typ = %typ, from = %from, to = %to))]
    async fn create_link(&self, ctx: &Context, typ: &Type, from: &Id, to: &Id, props: PropMap) -> Result<Link> {
        let _gate = self.enter(ctx).await?;
        if !typ.is_valid() {
            return Err(Error::InvalidType(typ.to_string()));
        }
        let nodes = self.inner.nodes.read();
        let mut links = self.inner.links.write();
        for endpoint in [from, to] {
            if !nodes.contains_key(endpoint) {
                return Err(Error::NodeNotFound(endpoint.clone()));
            }
        }
        let id = self.issue_id(typ);
        let stored = StoredLink {
            typ: typ.clone(),
            props,
            from: from.clone(),
            to: to.clone(),
        };
        let link = stored.materialize(&id, &nodes)?;
        links.insert(id, stored);
        debug!(id = %link.id, "link created");
        Ok(link)
    }

    #[instrument(skip(self, ctx), fields(id = %id))]
    async fn remove_node_by_id(&self, ctx: &Context, id: &Id) -> Result<()> {
        let _gate = self.enter(ctx).await?;
        let mut nodes = self.inner.nodes.write();
        let mut links = self.inner.links.write();
        if nodes.remove(id).is_none() {
            return Ok(());
        }
        let before = links.len();
        links.retain(|_, l| l.from != *id && l.to != *id);
        debug!(detached = before - links.len(), "node removed");
        Ok(())
    }

    async fn remove_link_by_id(&self, ctx: &Context, id: &Id) -> Result<()> {
        let _gate = self.enter(ctx).await?;
        if self.inner.links.write().remove(id).is_some() {
            debug!(id = %id, "link removed");
        }
        Ok(())
    }

    async fn set_node_props(&self, ctx: &Context, id: &Id, props: PropMap) -> Result<Node> {
        let _gate = self.enter(ctx).await?;
        self.update_node(id, |p| {
            *p = props;
            Ok(())
        })
    }

    async fn set_link_props(&self, ctx: &Context, id: &Id, props: PropMap) -> Result<Link> {
        let _gate = self.enter(ctx).await?;
        self.update_link(id, |p| {
            *p = props;
            Ok(())
        })
    }

    async fn mutate_node_props(&self, ctx: &Context, id: &Id, pma: &PropMutateArg) -> Result<Node> {
        let _gate = self.enter(ctx).await?;
        self.update_node(id, |p| pma.apply_to(p))
    }

    async fn mutate_link_props(&self, ctx: &Context, id: &Id, pma: &PropMutateArg) -> Result<Link> {
        let _gate = self.enter(ctx).await?;
        self.update_link(id, |p| pma.apply_to(p))
    }
}
