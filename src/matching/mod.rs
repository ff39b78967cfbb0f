//! # Mutation and Match DSL
//!
//! Small value types a caller builds and hands to an [`Sln`](crate::Sln):
//!
//! - [`PropMutateArg`]: properties to set and properties to remove.
//! - [`PropMatchClause`]: equal / present / absent property constraints.
//! - [`NodeMatchClause`] / [`LinkMatchClause`]: id, type, property, and
//!   (for links) endpoint constraints, all of which must hold.
//! - [`MatchCond`]: a list of clauses, any of which may hold.
//!
//! Matching is pure and in-memory. It never fails; "no match" is `false`.

pub mod mutate;
pub mod props;
pub mod entity;
pub mod cond;

pub use cond::{cond_matches, Clause, LinkMatchCond, MatchCond, NodeMatchCond, PropMatchCond};
pub use entity::{LinkMatchClause, NodeMatchClause};
pub use mutate::PropMutateArg;
pub use props::PropMatchClause;
