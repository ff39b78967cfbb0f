//! PropType — the tag naming each kind of property value.

use std::any::{Any, TypeId};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Complex64, Complex128, Date};
use crate::collections::Validate;
use crate::Error;

/// Kind of a property value.
///
/// `Invalid` (discriminant 0) is the "unknown" tag. Every value of
/// [`PropValue`](super::PropValue) maps to exactly one of the other tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(i8)]
pub enum PropType {
    #[default]
    Invalid = 0,
    Bool = 1,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    Bytes,
    String,
    Time,
    Date,
}

impl PropType {
    /// All valid tags, in discriminant order.
    pub const ALL: [PropType; 20] = [
        PropType::Bool,
        PropType::Int,
        PropType::Int8,
        PropType::Int16,
        PropType::Int32,
        PropType::Int64,
        PropType::Uint,
        PropType::Uint8,
        PropType::Uint16,
        PropType::Uint32,
        PropType::Uint64,
        PropType::Uintptr,
        PropType::Float32,
        PropType::Float64,
        PropType::Complex64,
        PropType::Complex128,
        PropType::Bytes,
        PropType::String,
        PropType::Time,
        PropType::Date,
    ];

    const NAMES: [&'static str; 20] = [
        "bool",
        "int",
        "int8",
        "int16",
        "int32",
        "int64",
        "uint",
        "uint8",
        "uint16",
        "uint32",
        "uint64",
        "uintptr",
        "float32",
        "float64",
        "complex64",
        "complex128",
        "bytes",
        "string",
        "time",
        "date",
    ];

    /// Tag for a raw discriminant. Anything out of range is `Invalid`.
    pub const fn from_repr(repr: i8) -> PropType {
        if repr >= 1 && repr as usize <= Self::ALL.len() {
            Self::ALL[repr as usize - 1]
        } else {
            PropType::Invalid
        }
    }

    /// Tag of the Rust type `T`.
    ///
    /// Only the exact types carried by `PropValue` are recognized. A newtype
    /// wrapping one of them, a reference, or a pointer yields `Invalid`.
    /// `usize` maps to `Uint`; `Uintptr` has no distinct Rust type.
    pub fn of<T: ?Sized + Any>() -> PropType {
        Self::from_type_id(TypeId::of::<T>())
    }

    /// Tag of a dynamically typed value.
    pub fn of_val(value: &dyn Any) -> PropType {
        Self::from_type_id(value.type_id())
    }

    fn from_type_id(id: TypeId) -> PropType {
        let table: [(TypeId, PropType); 19] = [
            (TypeId::of::<bool>(), PropType::Bool),
            (TypeId::of::<isize>(), PropType::Int),
            (TypeId::of::<i8>(), PropType::Int8),
            (TypeId::of::<i16>(), PropType::Int16),
            (TypeId::of::<i32>(), PropType::Int32),
            (TypeId::of::<i64>(), PropType::Int64),
            (TypeId::of::<usize>(), PropType::Uint),
            (TypeId::of::<u8>(), PropType::Uint8),
            (TypeId::of::<u16>(), PropType::Uint16),
            (TypeId::of::<u32>(), PropType::Uint32),
            (TypeId::of::<u64>(), PropType::Uint64),
            (TypeId::of::<f32>(), PropType::Float32),
            (TypeId::of::<f64>(), PropType::Float64),
            (TypeId::of::<Complex64>(), PropType::Complex64),
            (TypeId::of::<Complex128>(), PropType::Complex128),
            (TypeId::of::<Vec<u8>>(), PropType::Bytes),
            (TypeId::of::<String>(), PropType::String),
            (TypeId::of::<DateTime<Utc>>(), PropType::Time),
            (TypeId::of::<Date>(), PropType::Date),
        ];
        table
            .iter()
            .find(|(tid, _)| *tid == id)
            .map_or(PropType::Invalid, |(_, t)| *t)
    }

    /// Whether the tag names a known kind.
    pub const fn is_valid(self) -> bool {
        !matches!(self, PropType::Invalid)
    }

    /// Whether a value of this kind can be converted to `other`.
    ///
    /// Real numbers convert among themselves, as do complex numbers, byte
    /// strings, and the two temporal kinds. Integers also convert to
    /// `String`, as the character with that code point. Overflow while
    /// narrowing is a property of the value, not the kind, and is not
    /// considered here.
    pub const fn is_convertible_to(self, other: PropType) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }
        if self as i8 == other as i8 {
            return true;
        }
        (self.is_real_number() && other.is_real_number())
            || (self.is_complex() && other.is_complex())
            || (self.is_byte_string() && other.is_byte_string())
            || (self.is_temporal() && other.is_temporal())
            || (self.is_integer() && matches!(other, PropType::String))
    }

    pub const fn is_signed_integer(self) -> bool {
        matches!(
            self,
            PropType::Int | PropType::Int8 | PropType::Int16 | PropType::Int32 | PropType::Int64
        )
    }

    pub const fn is_unsigned_integer(self) -> bool {
        matches!(
            self,
            PropType::Uint
                | PropType::Uint8
                | PropType::Uint16
                | PropType::Uint32
                | PropType::Uint64
                | PropType::Uintptr
        )
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            PropType::Int
                | PropType::Int8
                | PropType::Int16
                | PropType::Int32
                | PropType::Int64
                | PropType::Uint
                | PropType::Uint8
                | PropType::Uint16
                | PropType::Uint32
                | PropType::Uint64
                | PropType::Uintptr
        )
    }

    pub const fn is_float(self) -> bool {
        matches!(self, PropType::Float32 | PropType::Float64)
    }

    /// Integers and floats.
    pub const fn is_real_number(self) -> bool {
        matches!(
            self,
            PropType::Int
                | PropType::Int8
                | PropType::Int16
                | PropType::Int32
                | PropType::Int64
                | PropType::Uint
                | PropType::Uint8
                | PropType::Uint16
                | PropType::Uint32
                | PropType::Uint64
                | PropType::Uintptr
                | PropType::Float32
                | PropType::Float64
        )
    }

    pub const fn is_complex(self) -> bool {
        matches!(self, PropType::Complex64 | PropType::Complex128)
    }

    /// Real and complex numbers.
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            PropType::Int
                | PropType::Int8
                | PropType::Int16
                | PropType::Int32
                | PropType::Int64
                | PropType::Uint
                | PropType::Uint8
                | PropType::Uint16
                | PropType::Uint32
                | PropType::Uint64
                | PropType::Uintptr
                | PropType::Float32
                | PropType::Float64
                | PropType::Complex64
                | PropType::Complex128
        )
    }

    /// `Bytes` and `String`.
    pub const fn is_byte_string(self) -> bool {
        matches!(self, PropType::Bytes | PropType::String)
    }

    /// `Time` and `Date`.
    pub const fn is_temporal(self) -> bool {
        matches!(self, PropType::Time | PropType::Date)
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropType::Invalid => write!(f, "PropType(0)"),
            t => f.write_str(Self::NAMES[*t as usize - 1]),
        }
    }
}

impl Validate for PropType {
    fn is_valid(&self) -> bool {
        PropType::is_valid(*self)
    }

    fn invalid_error(&self) -> Error {
        Error::InvalidPropType(*self)
    }
}
