//! JSON on top of the combinator core: the value type, its grammar,
//! accessors, text output and typed conversions.

pub mod access;
pub mod convert;
pub mod encode;
pub mod grammar;
pub mod interop;
pub mod value;

pub use access::{JsonIndex, Lookup};
pub use convert::{FromJson, ToJson};
pub use grammar::{
    json_array, json_bool, json_null, json_number, json_object, json_string, json_value,
    parse_json, string_literal, whitespace,
};
pub use value::{Json, Map};
