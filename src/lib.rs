//! # sln — Semantic Link Network data model
//!
//! A typed modeling layer for a property graph of semantic nodes and
//! directed, typed links. Every node and link carries a set of named
//! properties whose values come from a closed set of primitive kinds.
//!
//! ## Design Principles
//!
//! 1. **Closed value set**: `PropValue` is a sum type; the compiler checks
//!    that every kind is handled.
//! 2. **Validate on mutation**: `ValidSet` / `ValidMap` reject bad keys and
//!    values before touching their contents, all-or-nothing.
//! 3. **Pure matching**: match clauses and conditions test one entity at a
//!    time, in memory, without I/O.
//! 4. **Trait-first storage**: `Sln` is the contract between the model and
//!    any backend that persists nodes and links.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sln::{Context, MemoryBackend, NodeMatchClause, NodeMatchCond, PropMap, PropName, Sln, Type};
//!
//! # async fn example() -> sln::Result<()> {
//! let net = MemoryBackend::new();
//! let ctx = Context::background();
//!
//! let person = Type::new("Person")?;
//! let mut props = PropMap::new();
//! props.set_prop(PropName::new("name")?, "Ada")?;
//! let node = net.create_node(&ctx, &person, props).await?;
//!
//! let cond: NodeMatchCond = vec![NodeMatchClause::new().with_id(node.id.clone())].into();
//! assert_eq!(net.num_nodes(&ctx, Some(&cond)).await?, 1);
//! net.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod collections;
pub mod matching;
pub mod storage;
pub mod context;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    Complex64, Complex128, Date, FromPropValue, Id, IdSet, Link, Node, PropMap, PropName,
    PropNameSet, PropType, PropTypeMap, PropValue, SerialAllocator, Type,
};

// ============================================================================
// Re-exports: Collections and matching
// ============================================================================

pub use collections::{MutExclMap, MutExclSet, RemoveKeys, Validate, ValidMap, ValidSet, Validator};
pub use matching::{
    Clause, LinkMatchClause, LinkMatchCond, MatchCond, NodeMatchClause, NodeMatchCond,
    PropMatchClause, PropMatchCond, PropMutateArg,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{BackendConfig, MemoryBackend, MemoryConfig, Sln};
pub use context::{CancellationHandle, Context};

// ============================================================================
// Error Types
// ============================================================================

/// Every recoverable fault raised by the model, the collections, and the
/// storage façade.
///
/// Programmer errors (a negative serial number handed to [`Id::new`]) are
/// not represented here: they panic.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(
        "type {0:?} is invalid; a valid type consists of alphanumeric characters and underscores, \
         begins with an uppercase letter, does not begin with \"SLN\", and is up to 65535 bytes long"
    )]
    InvalidType(String),

    #[error(
        "property name {0:?} is invalid; a valid property name consists of alphanumeric characters \
         and underscores, begins with a lowercase letter, does not begin with \"sln\", and is up to \
         65535 bytes long"
    )]
    InvalidPropName(String),

    #[error("property type {0} is invalid")]
    InvalidPropType(PropType),

    #[error("property value of type {0} is invalid; it must be one of the supported property kinds")]
    InvalidPropValue(String),

    #[error("ID {0:?} is invalid")]
    InvalidId(String),

    #[error("item {0} is invalid")]
    InvalidItem(String),

    #[error("property {0} does not exist")]
    PropNotFound(String),

    #[error("property {name} has wrong type {got}; want {want}")]
    PropTypeMismatch {
        name: String,
        got: PropType,
        want: PropType,
    },

    #[error("node {0} does not exist")]
    NodeNotFound(Id),

    #[error("link {0} does not exist")]
    LinkNotFound(Id),

    #[error("parameter name is empty")]
    InvalidParameterName,

    #[error("SLN is closed")]
    Closed,

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
