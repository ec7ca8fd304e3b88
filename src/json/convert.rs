//! Conversion between `Json` trees and native values.
//!
//! A type opts in by implementing [`FromJson`] (build from a tree) and/or
//! [`ToJson`] (render to a tree). Primitives and standard containers are covered
//! here; record types compose field conversions, usually through
//! [`json_record!`](crate::json_record).

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;

use indexmap::IndexMap;

use super::value::{Json, Map};
use crate::errors::ConversionError;

/// Build a native value from a `Json` tree.
pub trait FromJson: Sized {
    fn from_json(json: &Json) -> Result<Self, ConversionError>;
}

/// Render a native value as a `Json` tree.
pub trait ToJson {
    fn to_json(&self) -> Json;
}

fn mismatch(expected: &'static str, json: &Json) -> ConversionError {
    ConversionError::type_mismatch(expected, json.type_name())
}

// ============================================================================
// RECORD HELPERS
// ============================================================================

impl Json {
    /// Converts this value into `T`.
    pub fn decode_as<T: FromJson>(&self) -> Result<T, ConversionError> {
        T::from_json(self)
    }

    /// Converts the required field `key` of an object.
    pub fn field<T: FromJson>(&self, key: &str) -> Result<T, ConversionError> {
        let map = self.raw_object().ok_or_else(|| mismatch("object", self))?;
        let value = map
            .get(key)
            .ok_or_else(|| ConversionError::missing_field(key))?;
        T::from_json(value).map_err(|err| err.in_field(key))
    }

    /// Converts field `key` if it is present and not null.
    pub fn optional_field<T: FromJson>(&self, key: &str) -> Result<Option<T>, ConversionError> {
        let map = self.raw_object().ok_or_else(|| mismatch("object", self))?;
        match map.get(key) {
            None | Some(Json::Null) => Ok(None),
            Some(value) => T::from_json(value)
                .map(Some)
                .map_err(|err| err.in_field(key)),
        }
    }

    /// Converts field `key`, falling back to `T::default()` when absent or null.
    pub fn field_or_default<T: FromJson + Default>(&self, key: &str) -> Result<T, ConversionError> {
        self.optional_field(key).map(Option::unwrap_or_default)
    }
}

/// Implements [`FromJson`] and [`ToJson`] for a struct, field by field.
///
/// Every listed field is required when decoding and its name is used as the
/// object key.
///
/// ```rust
/// use parsnip::{decode, encode, json_record};
///
/// #[derive(Debug, PartialEq)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// json_record!(Point { x, y });
///
/// let p: Point = decode(r#"{ "x": 1, "y": 2 }"#).unwrap();
/// assert_eq!(p, Point { x: 1.0, y: 2.0 });
/// assert_eq!(encode(&p), r#"{"x":1,"y":2}"#);
/// ```
#[macro_export]
macro_rules! json_record {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::FromJson for $ty {
            fn from_json(json: &$crate::Json) -> ::std::result::Result<Self, $crate::ConversionError> {
                Ok($ty {
                    $($field: json.field(stringify!($field))?,)*
                })
            }
        }

        impl $crate::ToJson for $ty {
            fn to_json(&self) -> $crate::Json {
                $crate::Json::object([
                    $((stringify!($field), $crate::ToJson::to_json(&self.$field)),)*
                ])
            }
        }
    };
}

// ============================================================================
// PRIMITIVES
// ============================================================================

impl FromJson for Json {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        Ok(json.clone())
    }
}

impl ToJson for Json {
    fn to_json(&self) -> Json {
        self.clone()
    }
}

impl FromJson for () {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        json.raw_null().ok_or_else(|| mismatch("null", json))
    }
}

impl ToJson for () {
    fn to_json(&self) -> Json {
        Json::Null
    }
}

impl FromJson for bool {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        json.raw_bool().ok_or_else(|| mismatch("bool", json))
    }
}

impl ToJson for bool {
    fn to_json(&self) -> Json {
        Json::Bool(*self)
    }
}

impl FromJson for f64 {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        json.raw_number().ok_or_else(|| mismatch("number", json))
    }
}

impl ToJson for f64 {
    fn to_json(&self) -> Json {
        Json::Number(*self)
    }
}

impl FromJson for f32 {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        let n = f64::from_json(json)?;
        if n.is_finite() && n.abs() > f32::MAX as f64 {
            return Err(ConversionError::NumberOutOfRange {
                target: "f32",
                value: n,
            });
        }
        Ok(n as f32)
    }
}

impl ToJson for f32 {
    fn to_json(&self) -> Json {
        Json::Number(f64::from(*self))
    }
}

macro_rules! integer_decoding {
    ($($int:ty),*) => {
        $(
            impl FromJson for $int {
                fn from_json(json: &Json) -> Result<Self, ConversionError> {
                    let n = f64::from_json(json)?;
                    // bounds as f64; MAX rounds up for 64-bit types, hence the strict upper check
                    if n.fract() != 0.0 || n < <$int>::MIN as f64 || n >= (<$int>::MAX as f64) + 1.0 {
                        return Err(ConversionError::NumberOutOfRange {
                            target: stringify!($int),
                            value: n,
                        });
                    }
                    Ok(n as $int)
                }
            }
        )*
    };
}

// Only types whose every value is exactly representable as f64 can be encoded.
// 64-bit integers decode but have no `ToJson`: above 2^53 the text would name a
// different number.
macro_rules! integer_encoding {
    ($($int:ty),*) => {
        $(
            impl ToJson for $int {
                fn to_json(&self) -> Json {
                    Json::Number(f64::from(*self))
                }
            }
        )*
    };
}

integer_decoding!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
integer_encoding!(i8, i16, i32, u8, u16, u32);

impl FromJson for String {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        json.raw_string()
            .map(str::to_string)
            .ok_or_else(|| mismatch("string", json))
    }
}

impl ToJson for String {
    fn to_json(&self) -> Json {
        Json::String(self.clone())
    }
}

impl ToJson for str {
    fn to_json(&self) -> Json {
        Json::String(self.to_string())
    }
}

impl FromJson for char {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        let s = json.raw_string().ok_or_else(|| mismatch("string", json))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::custom(format!(
                "expected a single character, found {:?}",
                s
            ))),
        }
    }
}

impl ToJson for char {
    fn to_json(&self) -> Json {
        Json::String(self.to_string())
    }
}

// ============================================================================
// WRAPPERS
// ============================================================================

impl<T: FromJson> FromJson for Option<T> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        if json.is_null() {
            return Ok(None);
        }
        json.decode_as().map(Some)
    }
}

impl<T: ToJson> ToJson for Option<T> {
    fn to_json(&self) -> Json {
        self.as_ref().map_or(Json::Null, ToJson::to_json)
    }
}

impl<T: FromJson> FromJson for Box<T> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        T::from_json(json).map(Box::new)
    }
}

impl<T: ToJson + ?Sized> ToJson for Box<T> {
    fn to_json(&self) -> Json {
        (**self).to_json()
    }
}

impl<T: ToJson + ?Sized> ToJson for &T {
    fn to_json(&self) -> Json {
        (**self).to_json()
    }
}

// ============================================================================
// SEQUENCES
// ============================================================================

fn decode_elements<T: FromJson>(json: &Json) -> Result<Vec<T>, ConversionError> {
    let items = json.raw_array().ok_or_else(|| mismatch("array", json))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| T::from_json(item).map_err(|err| err.in_element(index)))
        .collect()
}

impl<T: FromJson> FromJson for Vec<T> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        decode_elements(json)
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Json {
        self.as_slice().to_json()
    }
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: FromJson> FromJson for VecDeque<T> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        decode_elements(json).map(VecDeque::from)
    }
}

impl<T: ToJson> ToJson for VecDeque<T> {
    fn to_json(&self) -> Json {
        Json::Array(self.iter().map(ToJson::to_json).collect())
    }
}

// ============================================================================
// STRING-KEYED MAPPINGS
// ============================================================================

fn decode_entries<T: FromJson>(json: &Json) -> Result<Vec<(String, T)>, ConversionError> {
    let map = json.raw_object().ok_or_else(|| mismatch("object", json))?;
    map.iter()
        .map(|(key, value)| {
            T::from_json(value)
                .map(|v| (key.clone(), v))
                .map_err(|err| err.in_field(key.as_str()))
        })
        .collect()
}

fn encode_entries<'a, T, I>(entries: I) -> Json
where
    T: ToJson + 'a,
    I: IntoIterator<Item = (&'a String, &'a T)>,
{
    Json::Object(
        entries
            .into_iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect::<Map>(),
    )
}

impl<T: FromJson, S: BuildHasher + Default> FromJson for HashMap<String, T, S> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        decode_entries(json).map(|entries| entries.into_iter().collect())
    }
}

impl<T: ToJson, S: BuildHasher> ToJson for HashMap<String, T, S> {
    fn to_json(&self) -> Json {
        encode_entries(self.iter())
    }
}

impl<T: FromJson> FromJson for BTreeMap<String, T> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        decode_entries(json).map(|entries| entries.into_iter().collect())
    }
}

impl<T: ToJson> ToJson for BTreeMap<String, T> {
    fn to_json(&self) -> Json {
        encode_entries(self.iter())
    }
}

impl<T: FromJson, S: BuildHasher + Default> FromJson for IndexMap<String, T, S> {
    fn from_json(json: &Json) -> Result<Self, ConversionError> {
        decode_entries(json).map(|entries| entries.into_iter().collect())
    }
}

impl<T: ToJson, S: BuildHasher> ToJson for IndexMap<String, T, S> {
    fn to_json(&self) -> Json {
        encode_entries(self.iter())
    }
}
