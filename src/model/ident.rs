//! Entity types and identifiers.
//!
//! An [`Id`] reads `<Type>#<Date>-<digits>`. The digits encode a serial
//! number in a bijective base-64 numeral, least significant digit first,
//! so every serial has exactly one spelling and no spelling is a prefix
//! collision of another.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::Date;
use crate::collections::Validate;
use crate::{Error, Result};

/// Longest valid type or property name, in bytes.
pub const MAX_NAME_LEN: usize = 65535;

/// Shared rule for type and property names: 1..=65535 bytes, first byte in
/// `first`, the rest ASCII alphanumerics or `_`, no `reserved` prefix.
pub(crate) fn is_valid_name(name: &str, first: RangeInclusive<u8>, reserved: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(b) if first.contains(b) => {}
        _ => return false,
    }
    bytes.len() <= MAX_NAME_LEN
        && !name.starts_with(reserved)
        && bytes[1..].iter().all(|b| b.is_ascii_alphanumeric() || *b == b'_')
}

/// Whether `name` is a valid [`Type`].
pub fn is_valid_type_name(name: &str) -> bool {
    is_valid_name(name, b'A'..=b'Z', "SLN")
}

// ============================================================================
// Type
// ============================================================================

/// Validated entity type name.
///
/// A valid type consists of ASCII alphanumerics and underscores, begins with
/// an uppercase letter, does not begin with `SLN`, and is at most 65535
/// bytes long. `Type::default()` is the invalid zero type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Type(String);

impl Type {
    pub fn new(name: impl Into<String>) -> Result<Type> {
        let name = name.into();
        if is_valid_type_name(&name) {
            Ok(Type(name))
        } else {
            Err(Error::InvalidType(name))
        }
    }

    /// The name, or `""` for the zero type.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Type {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Type::new(s)
    }
}

impl TryFrom<String> for Type {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Type::new(s)
    }
}

impl From<Type> for String {
    fn from(t: Type) -> String {
        t.0
    }
}

impl Validate for Type {
    fn is_valid(&self) -> bool {
        Type::is_valid(self)
    }

    fn invalid_error(&self) -> Error {
        Error::InvalidType(self.0.clone())
    }
}

// ============================================================================
// Serial encoding
// ============================================================================

/// Digit alphabet of the serial encoding; digit value is the index.
pub const SERIAL_ALPHABET: &[u8; 64] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Encode a serial number, least significant digit first.
///
/// # Panics
///
/// Panics if `serial` is negative.
pub fn encode_serial(serial: i64) -> String {
    assert!(serial >= 0, "serial number {serial} is negative");
    let mut n = serial;
    let mut out = String::with_capacity(11);
    loop {
        out.push(SERIAL_ALPHABET[(n & 0o77) as usize] as char);
        n >>= 6;
        if n == 0 {
            return out;
        }
        n -= 1;
    }
}

/// Inverse of [`encode_serial`]. `None` for an empty string, a byte outside
/// the alphabet, or a value beyond `i64::MAX`.
pub fn decode_serial(digits: &str) -> Option<i64> {
    let mut value: Option<i64> = None;
    for b in digits.bytes().rev() {
        let d = SERIAL_ALPHABET.iter().position(|&a| a == b)? as i64;
        value = Some(match value {
            None => d,
            Some(v) => v.checked_add(1)?.checked_mul(64)?.checked_add(d)?,
        });
    }
    value
}

// ============================================================================
// Id
// ============================================================================

/// Identifier of one node or link.
///
/// Equality and hashing are by `(type, suffix)`, which is the same as
/// comparing the text forms. `Id::default()` is the invalid zero id and
/// formats as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Id {
    typ: Type,
    suffix: String,
}

impl Id {
    /// Build the id of entity number `serial` of type `typ` created on `date`.
    ///
    /// Returns the zero id if `typ` is invalid.
    ///
    /// # Panics
    ///
    /// Panics if `serial` is negative.
    pub fn new(typ: &Type, date: Date, serial: i64) -> Id {
        assert!(serial >= 0, "serial number {serial} is negative");
        if !typ.is_valid() {
            return Id::default();
        }
        Id {
            typ: typ.clone(),
            suffix: format!("{date}-{}", encode_serial(serial)),
        }
    }

    /// Parse the text form `<Type>#<Date>-<digits>`. The empty string
    /// parses to the zero id. Text that [`Id::new`] would not produce is
    /// rejected.
    pub fn parse(s: &str) -> Result<Id> {
        if s.is_empty() {
            return Ok(Id::default());
        }
        let invalid = || Error::InvalidId(s.to_owned());
        let (typ, suffix) = s.split_once('#').ok_or_else(invalid)?;
        let typ = Type::new(typ).map_err(|_| invalid())?;
        let (date, digits) = split_suffix(suffix).ok_or_else(invalid)?;
        let serial = decode_serial(digits).ok_or_else(invalid)?;
        let id = Id::new(&typ, date, serial);
        if id.suffix != suffix {
            return Err(invalid());
        }
        Ok(id)
    }

    pub fn is_valid(&self) -> bool {
        self.typ.is_valid()
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }

    /// The part after `#`. Unique among ids of the same type.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Creation date encoded in the suffix. `None` for the zero id.
    pub fn date(&self) -> Option<Date> {
        split_suffix(&self.suffix).map(|(date, _)| date)
    }

    /// Serial number encoded in the suffix. `None` for the zero id.
    pub fn serial(&self) -> Option<i64> {
        split_suffix(&self.suffix).and_then(|(_, digits)| decode_serial(digits))
    }
}

/// Split `<year>-<ddd>-<digits>` into its date and digits. The year may be
/// negative, and the digits may themselves contain `-`.
fn split_suffix(suffix: &str) -> Option<(Date, &str)> {
    let sign = usize::from(suffix.starts_with('-'));
    let year_end = sign + suffix.get(sign..)?.find('-')?;
    let date_end = year_end + 4;
    let date: Date = suffix.get(..date_end)?.parse().ok()?;
    let digits = suffix.get(date_end..)?.strip_prefix('-')?;
    if digits.is_empty() {
        return None;
    }
    Some((date, digits))
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(f, "{}#{}", self.typ, self.suffix)
    }
}

impl FromStr for Id {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Id::parse(s)
    }
}

impl Validate for Id {
    fn is_valid(&self) -> bool {
        Id::is_valid(self)
    }

    fn invalid_error(&self) -> Error {
        Error::InvalidId(self.to_string())
    }
}

impl Serialize for Id {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Id::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// IdSet
// ============================================================================

/// Set of ids grouped by type.
///
/// The zero id may be stored; it is grouped under the zero type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdSet {
    by_type: HashMap<Type, HashSet<String>>,
}

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<'a>(&mut self, ids: impl IntoIterator<Item = &'a Id>) {
        for id in ids {
            self.by_type
                .entry(id.typ.clone())
                .or_default()
                .insert(id.suffix.clone());
        }
    }

    pub fn remove<'a>(&mut self, ids: impl IntoIterator<Item = &'a Id>) {
        for id in ids {
            if let Some(suffixes) = self.by_type.get_mut(&id.typ) {
                suffixes.remove(&id.suffix);
                if suffixes.is_empty() {
                    self.by_type.remove(&id.typ);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.by_type.clear();
    }

    pub fn len(&self) -> usize {
        self.by_type.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    /// Number of ids of type `typ`.
    pub fn len_type(&self, typ: &Type) -> usize {
        self.by_type.get(typ).map_or(0, HashSet::len)
    }

    /// Number of distinct types among the ids.
    pub fn num_type(&self) -> usize {
        self.by_type.len()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.by_type
            .get(&id.typ)
            .is_some_and(|suffixes| suffixes.contains(&id.suffix))
    }

    pub fn contains_type(&self, typ: &Type) -> bool {
        self.by_type.contains_key(typ)
    }

    /// Iterate in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
        self.by_type.iter().flat_map(|(typ, suffixes)| {
            suffixes.iter().map(move |suffix| Id {
                typ: typ.clone(),
                suffix: suffix.clone(),
            })
        })
    }

    pub fn iter_type<'a>(&'a self, typ: &'a Type) -> impl Iterator<Item = Id> + 'a {
        self.by_type.get(typ).into_iter().flat_map(move |suffixes| {
            suffixes.iter().map(move |suffix| Id {
                typ: typ.clone(),
                suffix: suffix.clone(),
            })
        })
    }
}

impl<'a> FromIterator<&'a Id> for IdSet {
    fn from_iter<I: IntoIterator<Item = &'a Id>>(iter: I) -> Self {
        let mut set = IdSet::new();
        set.add(iter);
        set
    }
}

// ============================================================================
// SerialAllocator
// ============================================================================

/// Issues serial numbers, counting from 0 for each `(Type, Date)` pair.
#[derive(Debug, Default)]
pub struct SerialAllocator {
    next: Mutex<HashMap<(Type, Date), i64>>,
}

impl SerialAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next unused serial for `(typ, date)`.
    pub fn next(&self, typ: &Type, date: Date) -> i64 {
        let mut next = self.next.lock();
        let counter = next.entry((typ.clone(), date)).or_insert(0);
        let serial = *counter;
        *counter += 1;
        serial
    }

    /// Issue a fresh id of type `typ` dated `date`.
    pub fn issue(&self, typ: &Type, date: Date) -> Id {
        Id::new(typ, date, self.next(typ, date))
    }
}
