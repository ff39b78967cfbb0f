//! # Semantic Link Network Model
//!
//! Value types shared by every layer: property kinds and values, validated
//! names, dates, identifiers, and the node and link records.
//!
//! Design rule: pure data. No I/O, no shared state, no async.

pub mod prop_type;
pub mod value;
pub mod date;
pub mod ident;
pub mod prop_name;
pub mod prop_map;
pub mod node;
pub mod link;

pub use prop_type::PropType;
pub use value::{Complex64, Complex128, FromPropValue, PropValue};
pub use date::Date;
pub use ident::{decode_serial, encode_serial, is_valid_type_name, Id, IdSet, SerialAllocator, Type};
pub use prop_name::{is_valid_prop_name, PropName, PropNameSet};
pub use prop_map::{PropMap, PropTypeMap};
pub use node::Node;
pub use link::Link;
