//! PropName — validated property names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ident::is_valid_name;
use crate::collections::{Validate, ValidSet};
use crate::{Error, Result};

/// Whether `name` is a valid [`PropName`].
pub fn is_valid_prop_name(name: &str) -> bool {
    is_valid_name(name, b'a'..=b'z', "sln")
}

/// Validated property name.
///
/// Same charset as [`Type`](super::Type) but beginning with a lowercase
/// letter. Names starting with `sln` are reserved for storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropName(String);

impl PropName {
    pub fn new(name: impl Into<String>) -> Result<PropName> {
        let name = name.into();
        if is_valid_prop_name(&name) {
            Ok(PropName(name))
        } else {
            Err(Error::InvalidPropName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for PropName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PropName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PropName::new(s)
    }
}

impl TryFrom<String> for PropName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        PropName::new(s)
    }
}

impl TryFrom<&str> for PropName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        PropName::new(s)
    }
}

impl From<PropName> for String {
    fn from(name: PropName) -> String {
        name.0
    }
}

impl Validate for PropName {
    fn is_valid(&self) -> bool {
        PropName::is_valid(self)
    }

    fn invalid_error(&self) -> Error {
        Error::InvalidPropName(self.0.clone())
    }
}

/// Set of property names. Rejects the zero name.
pub type PropNameSet = ValidSet<PropName>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prop_names() {
        let long_ok = format!("a{}", "B".repeat(65534));
        let too_long = format!("a{}", "B".repeat(65535));
        for name in ["a", "abc", "aB_4", long_ok.as_str()] {
            assert!(is_valid_prop_name(name), "{name:.8} should be valid");
            assert!(PropName::new(name).is_ok());
        }
        for name in ["", "A", "0bc", "_bc", "ab-", "sln", "slnID", "slnType", too_long.as_str()] {
            assert!(!is_valid_prop_name(name), "{name:.8} should be invalid");
            assert!(matches!(PropName::new(name), Err(Error::InvalidPropName(_))));
        }
    }

    #[test]
    fn test_prop_name_set_rejects_zero() {
        let mut set = PropNameSet::new();
        set.add([PropName::new("a").unwrap()]).unwrap();
        let err = set.add([PropName::new("b").unwrap(), PropName::default()]).unwrap_err();
        assert!(matches!(err, Error::InvalidPropName(_)));
        assert_eq!(set.len(), 1);
    }
}
