//! # Validated Collections
//!
//! Sets and maps that refuse to hold an invalid item.
//!
//! Every inserting operation checks **all** incoming items before it
//! touches the collection: a batch with one bad item fails with that
//! item's error and leaves the contents exactly as they were. Shrinking
//! operations (`remove`, `intersect`, `subtract`, `retain`, `clear`) never
//! validate and never fail.
//!
//! The mutually-exclusive variants in [`mut_excl`] add one more rule: a key
//! inserted into one collection is removed from the sibling collections
//! passed alongside it, so a key lives in at most one of them.

pub mod valid_set;
pub mod valid_map;
pub mod mut_excl;

use std::fmt;

use crate::{Error, Result};

pub use mut_excl::{MutExclMap, MutExclSet};
pub use valid_map::ValidMap;
pub use valid_set::ValidSet;

// ============================================================================
// Validation
// ============================================================================

/// Types with a canonical "is this instance well-formed" check.
pub trait Validate {
    fn is_valid(&self) -> bool;

    /// The error reported when an invalid instance is about to be stored.
    fn invalid_error(&self) -> Error;
}

/// A validation predicate paired with the error it raises.
pub struct Validator<T: ?Sized> {
    validate: fn(&T) -> bool,
    error: fn(&T) -> Error,
}

impl<T: ?Sized> Validator<T> {
    pub const fn new(validate: fn(&T) -> bool, error: fn(&T) -> Error) -> Self {
        Self { validate, error }
    }

    /// Predicate only; failures report [`Error::InvalidItem`].
    pub fn from_fn(validate: fn(&T) -> bool) -> Self
    where
        T: fmt::Debug,
    {
        Self::new(validate, default_error::<T>)
    }

    /// Accepts everything.
    pub fn accept_all() -> Self
    where
        T: fmt::Debug,
    {
        Self::new(|_| true, default_error::<T>)
    }

    pub fn is_valid(&self, x: &T) -> bool {
        (self.validate)(x)
    }

    pub fn check(&self, x: &T) -> Result<()> {
        if (self.validate)(x) { Ok(()) } else { Err((self.error)(x)) }
    }
}

fn default_error<T: fmt::Debug + ?Sized>(x: &T) -> Error {
    Error::InvalidItem(format!("{x:?}"))
}

impl<T: Validate> Default for Validator<T> {
    fn default() -> Self {
        Self::new(T::is_valid, T::invalid_error)
    }
}

impl<T: ?Sized> Clone for Validator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for Validator<T> {}

impl<T: ?Sized> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validator")
    }
}

// ============================================================================
// Sibling removal
// ============================================================================

/// A collection that keys can be removed from.
///
/// Implemented by every set and map here so that any of them can act as a
/// sibling of a mutually-exclusive collection.
pub trait RemoveKeys<K> {
    fn remove_keys(&mut self, keys: &[K]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Even(u32);

    #[test]
    fn test_validator_default_error() {
        let v: Validator<Even> = Validator::from_fn(|x| x.0 % 2 == 0);
        assert!(v.check(&Even(2)).is_ok());
        assert_eq!(v.check(&Even(3)), Err(Error::InvalidItem("Even(3)".into())));
    }

    #[test]
    fn test_validator_from_trait() {
        let v: Validator<crate::Type> = Validator::default();
        assert!(!v.is_valid(&crate::Type::default()));
        assert!(matches!(v.check(&crate::Type::default()), Err(Error::InvalidType(_))));
    }
}
