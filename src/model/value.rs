//! PropValue — the closed set of values a property can hold.

use std::any::Any;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Date, PropType};
use crate::collections::Validate;
use crate::{Error, Result};

/// Complex number with `f32` parts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex64 {
    pub re: f32,
    pub im: f32,
}

/// Complex number with `f64` parts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex128 {
    pub re: f64,
    pub im: f64,
}

impl Complex64 {
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

impl Complex128 {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// A property value.
///
/// Covers every kind named by [`PropType`]:
/// - Boolean: Bool
/// - Signed integers: Int (native width), Int8 .. Int64
/// - Unsigned integers: Uint (native width), Uint8 .. Uint64, Uintptr
/// - Floats and complex numbers
/// - Byte strings: Bytes, String
/// - Temporal: Time (UTC timestamp), Date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum PropValue {
    Bool(bool),
    Int(isize),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint(usize),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Uintptr(usize),
    Float32(f32),
    Float64(f64),
    Complex64(Complex64),
    Complex128(Complex128),
    Bytes(Vec<u8>),
    String(String),
    Time(DateTime<Utc>),
    Date(Date),
}

// ============================================================================
// Type identification
// ============================================================================

impl PropValue {
    /// The kind of this value. Never `Invalid`.
    pub fn prop_type(&self) -> PropType {
        match self {
            PropValue::Bool(_) => PropType::Bool,
            PropValue::Int(_) => PropType::Int,
            PropValue::Int8(_) => PropType::Int8,
            PropValue::Int16(_) => PropType::Int16,
            PropValue::Int32(_) => PropType::Int32,
            PropValue::Int64(_) => PropType::Int64,
            PropValue::Uint(_) => PropType::Uint,
            PropValue::Uint8(_) => PropType::Uint8,
            PropValue::Uint16(_) => PropType::Uint16,
            PropValue::Uint32(_) => PropType::Uint32,
            PropValue::Uint64(_) => PropType::Uint64,
            PropValue::Uintptr(_) => PropType::Uintptr,
            PropValue::Float32(_) => PropType::Float32,
            PropValue::Float64(_) => PropType::Float64,
            PropValue::Complex64(_) => PropType::Complex64,
            PropValue::Complex128(_) => PropType::Complex128,
            PropValue::Bytes(_) => PropType::Bytes,
            PropValue::String(_) => PropType::String,
            PropValue::Time(_) => PropType::Time,
            PropValue::Date(_) => PropType::Date,
        }
    }

    /// The zero value of `kind`, or `None` for `Invalid`.
    pub fn zero(kind: PropType) -> Option<PropValue> {
        Some(match kind {
            PropType::Invalid => return None,
            PropType::Bool => PropValue::Bool(false),
            PropType::Int => PropValue::Int(0),
            PropType::Int8 => PropValue::Int8(0),
            PropType::Int16 => PropValue::Int16(0),
            PropType::Int32 => PropValue::Int32(0),
            PropType::Int64 => PropValue::Int64(0),
            PropType::Uint => PropValue::Uint(0),
            PropType::Uint8 => PropValue::Uint8(0),
            PropType::Uint16 => PropValue::Uint16(0),
            PropType::Uint32 => PropValue::Uint32(0),
            PropType::Uint64 => PropValue::Uint64(0),
            PropType::Uintptr => PropValue::Uintptr(0),
            PropType::Float32 => PropValue::Float32(0.0),
            PropType::Float64 => PropValue::Float64(0.0),
            PropType::Complex64 => PropValue::Complex64(Complex64::default()),
            PropType::Complex128 => PropValue::Complex128(Complex128::default()),
            PropType::Bytes => PropValue::Bytes(Vec::new()),
            PropType::String => PropValue::String(String::new()),
            PropType::Time => PropValue::Time(DateTime::<Utc>::UNIX_EPOCH),
            PropType::Date => PropValue::Date(Date::default()),
        })
    }

    /// Move a dynamically typed value into the closed value set.
    ///
    /// Fails with `InvalidPropValue` when the concrete type is not one of
    /// the supported kinds (see [`PropType::of`]).
    pub fn from_any(value: Box<dyn Any>) -> Result<PropValue> {
        macro_rules! downcast {
            ($value:ident; $($t:ty => $variant:ident),* $(,)?) => {
                $(
                    let $value = match $value.downcast::<$t>() {
                        Ok(v) => return Ok(PropValue::$variant(*v)),
                        Err(v) => v,
                    };
                )*
            };
        }
        downcast!(value;
            bool => Bool,
            isize => Int,
            i8 => Int8,
            i16 => Int16,
            i32 => Int32,
            i64 => Int64,
            usize => Uint,
            u8 => Uint8,
            u16 => Uint16,
            u32 => Uint32,
            u64 => Uint64,
            f32 => Float32,
            f64 => Float64,
            Complex64 => Complex64,
            Complex128 => Complex128,
            Vec<u8> => Bytes,
            String => String,
            DateTime<Utc> => Time,
            Date => Date,
        );
        Err(Error::InvalidPropValue("unsupported dynamic type".to_string()))
    }

    /// Convert to the kind `to`.
    ///
    /// Returns `None` when the kinds are not convertible. Narrowing numeric
    /// conversions truncate (integers) or saturate (float to integer).
    pub fn convert(&self, to: PropType) -> Option<PropValue> {
        if !self.prop_type().is_convertible_to(to) {
            return None;
        }
        match to {
            PropType::Invalid => None,
            PropType::Bool => bool::from_prop_value(self).map(PropValue::Bool),
            PropType::Int => isize::from_prop_value(self).map(PropValue::Int),
            PropType::Int8 => i8::from_prop_value(self).map(PropValue::Int8),
            PropType::Int16 => i16::from_prop_value(self).map(PropValue::Int16),
            PropType::Int32 => i32::from_prop_value(self).map(PropValue::Int32),
            PropType::Int64 => i64::from_prop_value(self).map(PropValue::Int64),
            PropType::Uint => usize::from_prop_value(self).map(PropValue::Uint),
            PropType::Uint8 => u8::from_prop_value(self).map(PropValue::Uint8),
            PropType::Uint16 => u16::from_prop_value(self).map(PropValue::Uint16),
            PropType::Uint32 => u32::from_prop_value(self).map(PropValue::Uint32),
            PropType::Uint64 => u64::from_prop_value(self).map(PropValue::Uint64),
            PropType::Uintptr => usize::from_prop_value(self).map(PropValue::Uintptr),
            PropType::Float32 => f32::from_prop_value(self).map(PropValue::Float32),
            PropType::Float64 => f64::from_prop_value(self).map(PropValue::Float64),
            PropType::Complex64 => Complex64::from_prop_value(self).map(PropValue::Complex64),
            PropType::Complex128 => Complex128::from_prop_value(self).map(PropValue::Complex128),
            PropType::Bytes => Vec::<u8>::from_prop_value(self).map(PropValue::Bytes),
            PropType::String => String::from_prop_value(self).map(PropValue::String),
            PropType::Time => DateTime::<Utc>::from_prop_value(self).map(PropValue::Time),
            PropType::Date => Date::from_prop_value(self).map(PropValue::Date),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value of any integer kind, widened without loss.
    pub fn as_integer(&self) -> Option<i128> {
        Some(match *self {
            PropValue::Int(v) => v as i128,
            PropValue::Int8(v) => i128::from(v),
            PropValue::Int16(v) => i128::from(v),
            PropValue::Int32(v) => i128::from(v),
            PropValue::Int64(v) => i128::from(v),
            PropValue::Uint(v) | PropValue::Uintptr(v) => v as i128,
            PropValue::Uint8(v) => i128::from(v),
            PropValue::Uint16(v) => i128::from(v),
            PropValue::Uint32(v) => i128::from(v),
            PropValue::Uint64(v) => i128::from(v),
            _ => return None,
        })
    }
}

impl Validate for PropValue {
    fn is_valid(&self) -> bool {
        self.prop_type().is_valid()
    }

    fn invalid_error(&self) -> Error {
        Error::InvalidPropValue(self.prop_type().to_string())
    }
}

// ============================================================================
// Typed extraction
// ============================================================================

/// Extract a concrete Rust value from a `PropValue`, converting across
/// kinds where [`PropType::is_convertible_to`] allows it.
pub trait FromPropValue: Sized {
    /// The kind this Rust type corresponds to.
    const PROP_TYPE: PropType;

    fn from_prop_value(value: &PropValue) -> Option<Self>;
}

macro_rules! real_number_from_prop_value {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl FromPropValue for $t {
            const PROP_TYPE: PropType = PropType::$kind;

            #[allow(clippy::unnecessary_cast)]
            fn from_prop_value(value: &PropValue) -> Option<Self> {
                Some(match *value {
                    PropValue::Int(v) => v as $t,
                    PropValue::Int8(v) => v as $t,
                    PropValue::Int16(v) => v as $t,
                    PropValue::Int32(v) => v as $t,
                    PropValue::Int64(v) => v as $t,
                    PropValue::Uint(v) => v as $t,
                    PropValue::Uint8(v) => v as $t,
                    PropValue::Uint16(v) => v as $t,
                    PropValue::Uint32(v) => v as $t,
                    PropValue::Uint64(v) => v as $t,
                    PropValue::Uintptr(v) => v as $t,
                    PropValue::Float32(v) => v as $t,
                    PropValue::Float64(v) => v as $t,
                    _ => return None,
                })
            }
        }
    )*};
}

real_number_from_prop_value!(
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
);

impl FromPropValue for bool {
    const PROP_TYPE: PropType = PropType::Bool;

    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromPropValue for Complex64 {
    const PROP_TYPE: PropType = PropType::Complex64;

    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Complex64(c) => Some(*c),
            PropValue::Complex128(c) => Some(Complex64::new(c.re as f32, c.im as f32)),
            _ => None,
        }
    }
}

impl FromPropValue for Complex128 {
    const PROP_TYPE: PropType = PropType::Complex128;

    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Complex64(c) => Some(Complex128::new(f64::from(c.re), f64::from(c.im))),
            PropValue::Complex128(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromPropValue for Vec<u8> {
    const PROP_TYPE: PropType = PropType::Bytes;

    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Bytes(b) => Some(b.clone()),
            PropValue::String(s) => Some(s.as_bytes().to_vec()),
            _ => None,
        }
    }
}

impl FromPropValue for String {
    const PROP_TYPE: PropType = PropType::String;

    /// Bytes that are not UTF-8 are replaced with U+FFFD. An integer reads
    /// as the one character with that code point, or U+FFFD if it is not a
    /// Unicode scalar value.
    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::String(s) => Some(s.clone()),
            PropValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => {
                let code = value.as_integer()?;
                let c = u32::try_from(code)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                Some(c.to_string())
            }
        }
    }
}

impl FromPropValue for DateTime<Utc> {
    const PROP_TYPE: PropType = PropType::Time;

    /// A date reads as midnight UTC of that day. The zero date stands for
    /// "no date" and has no time: it reads as `None`, which `get_as` and
    /// `convert` report as a kind mismatch.
    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Time(t) => Some(*t),
            PropValue::Date(d) => d.to_datetime(),
            _ => None,
        }
    }
}

impl FromPropValue for Date {
    const PROP_TYPE: PropType = PropType::Date;

    /// A timestamp is truncated to its UTC day.
    fn from_prop_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Date(d) => Some(*d),
            PropValue::Time(t) => Some(Date::of(t)),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions (From impls)
// ============================================================================

macro_rules! prop_value_from {
    ($($t:ty => $variant:ident),* $(,)?) => {$(
        impl From<$t> for PropValue {
            fn from(v: $t) -> Self {
                PropValue::$variant(v)
            }
        }
    )*};
}

prop_value_from!(
    bool => Bool,
    isize => Int,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    usize => Uint,
    u8 => Uint8,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    f32 => Float32,
    f64 => Float64,
    Complex64 => Complex64,
    Complex128 => Complex128,
    Vec<u8> => Bytes,
    String => String,
    DateTime<Utc> => Time,
    Date => Date,
);

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        PropValue::String(v.to_owned())
    }
}

impl From<&[u8]> for PropValue {
    fn from(v: &[u8]) -> Self {
        PropValue::Bytes(v.to_vec())
    }
}

// ============================================================================
// Display
// ============================================================================

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Bool(v) => write!(f, "{v}"),
            PropValue::Int(v) => write!(f, "{v}"),
            PropValue::Int8(v) => write!(f, "{v}"),
            PropValue::Int16(v) => write!(f, "{v}"),
            PropValue::Int32(v) => write!(f, "{v}"),
            PropValue::Int64(v) => write!(f, "{v}"),
            PropValue::Uint(v) | PropValue::Uintptr(v) => write!(f, "{v}"),
            PropValue::Uint8(v) => write!(f, "{v}"),
            PropValue::Uint16(v) => write!(f, "{v}"),
            PropValue::Uint32(v) => write!(f, "{v}"),
            PropValue::Uint64(v) => write!(f, "{v}"),
            PropValue::Float32(v) => write!(f, "{v}"),
            PropValue::Float64(v) => write!(f, "{v}"),
            PropValue::Complex64(c) => write!(f, "({}{:+}i)", c.re, c.im),
            PropValue::Complex128(c) => write!(f, "({}{:+}i)", c.re, c.im),
            PropValue::Bytes(b) => write!(f, "<bytes[{}]>", b.len()),
            PropValue::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            PropValue::Time(t) => write!(f, "{}", t.to_rfc3339()),
            PropValue::Date(d) => write!(f, "{d}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_zero_value_kinds() {
        for kind in PropType::ALL {
            let zero = PropValue::zero(kind).unwrap();
            assert_eq!(zero.prop_type(), kind);
        }
        assert_eq!(PropValue::zero(PropType::Invalid), None);
    }

    #[test]
    fn test_from_any() {
        assert_eq!(PropValue::from_any(Box::new(7i16)).unwrap(), PropValue::Int16(7));
        assert_eq!(
            PropValue::from_any(Box::new(String::from("x"))).unwrap(),
            PropValue::String("x".into())
        );
        let err = PropValue::from_any(Box::new(crate::Type::default())).unwrap_err();
        assert_eq!(err, Error::InvalidPropValue("unsupported dynamic type".into()));
    }

    #[test]
    fn test_numeric_conversion() {
        let v = PropValue::Int32('G' as i32);
        assert_eq!(i64::from_prop_value(&v), Some(71));
        assert_eq!(i8::from_prop_value(&v), Some(71));
        assert_eq!(u8::from_prop_value(&v), Some(71));
        assert_eq!(usize::from_prop_value(&v), Some(71));
        assert_eq!(f32::from_prop_value(&v), Some(71.0));
        assert_eq!(bool::from_prop_value(&v), None);
        assert_eq!(String::from_prop_value(&v), Some("G".to_string()));
    }

    #[test]
    fn test_integer_to_string() {
        assert_eq!(String::from_prop_value(&PropValue::Uint8(0xe9)), Some("é".to_string()));
        assert_eq!(String::from_prop_value(&PropValue::Int64(-1)), Some("\u{fffd}".to_string()));
        assert_eq!(String::from_prop_value(&PropValue::Uint32(0xd800)), Some("\u{fffd}".to_string()));
        assert_eq!(String::from_prop_value(&PropValue::Uint64(u64::MAX)), Some("\u{fffd}".to_string()));
        assert_eq!(
            PropValue::Int32(0x1F600).convert(PropType::String),
            Some(PropValue::String("\u{1F600}".to_string()))
        );
        assert_eq!(String::from_prop_value(&PropValue::Float64(71.0)), None);
    }

    #[test]
    fn test_convert() {
        assert_eq!(PropValue::Int8(-3).convert(PropType::Int64), Some(PropValue::Int64(-3)));
        assert_eq!(PropValue::Int8(-3).convert(PropType::Uintptr), Some(PropValue::Uintptr(-3i8 as usize)));
        assert_eq!(
            PropValue::from("hi").convert(PropType::Bytes),
            Some(PropValue::Bytes(b"hi".to_vec()))
        );
        assert_eq!(PropValue::Bool(true).convert(PropType::Int), None);
        assert_eq!(PropValue::Bool(true).convert(PropType::Invalid), None);
    }

    #[test]
    fn test_date_time_conversion() {
        let date = Date::from_ymd(2023, 3, 12);
        let midnight = Utc.with_ymd_and_hms(2023, 3, 12, 0, 0, 0).unwrap();
        assert_eq!(DateTime::<Utc>::from_prop_value(&PropValue::Date(date)), Some(midnight));

        let afternoon = Utc.with_ymd_and_hms(2023, 3, 12, 15, 4, 5).unwrap();
        assert_eq!(Date::from_prop_value(&PropValue::Time(afternoon)), Some(date));
    }

    #[test]
    fn test_zero_date_has_no_time() {
        let zero = PropValue::Date(Date::default());
        assert_eq!(DateTime::<Utc>::from_prop_value(&zero), None);
        assert_eq!(zero.convert(PropType::Time), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(PropValue::from("a\"b").to_string(), "\"a\\\"b\"");
        assert_eq!(PropValue::Bytes(vec![1, 2]).to_string(), "<bytes[2]>");
        assert_eq!(PropValue::Complex128(Complex128::new(1.0, -2.0)).to_string(), "(1-2i)");
    }
}
