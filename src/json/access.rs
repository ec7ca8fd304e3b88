//! Safe navigation through `Json` trees.
//!
//! Lookups return `Option`; a missing step anywhere in a chain yields `None`.
//! The [`Lookup`] trait continues a chain on an `Option<&Json>`:
//!
//! ```rust
//! use parsnip::{parse_json, Lookup};
//! let json = parse_json(r#"{ "items": [ { "hidden": true } ] }"#).unwrap();
//! assert_eq!(json.get("items").get(0).get("hidden").raw_bool(), Some(true));
//! assert_eq!(json.get("nope").get(0).get("hidden").raw_bool(), None);
//! ```

use super::value::Json;

/// Types usable as a key or position into a `Json` value.
pub trait JsonIndex {
    fn index_into<'a>(&self, json: &'a Json) -> Option<&'a Json>;
}

impl JsonIndex for usize {
    fn index_into<'a>(&self, json: &'a Json) -> Option<&'a Json> {
        match json {
            Json::Array(items) => items.get(*self),
            _ => None,
        }
    }
}

impl JsonIndex for str {
    fn index_into<'a>(&self, json: &'a Json) -> Option<&'a Json> {
        match json {
            Json::Object(map) => map.get(self),
            _ => None,
        }
    }
}

impl JsonIndex for String {
    fn index_into<'a>(&self, json: &'a Json) -> Option<&'a Json> {
        self.as_str().index_into(json)
    }
}

impl<T: JsonIndex + ?Sized> JsonIndex for &T {
    fn index_into<'a>(&self, json: &'a Json) -> Option<&'a Json> {
        (**self).index_into(json)
    }
}

impl Json {
    /// Keyed lookup on objects, positional lookup on arrays. `None` otherwise.
    pub fn get<I: JsonIndex>(&self, index: I) -> Option<&Json> {
        index.index_into(self)
    }
}

/// Chained accessors over a possibly-missing value.
pub trait Lookup<'a> {
    fn get<I: JsonIndex>(self, index: I) -> Option<&'a Json>;
    fn raw_null(self) -> Option<()>;
    fn raw_bool(self) -> Option<bool>;
    fn raw_number(self) -> Option<f64>;
    fn raw_string(self) -> Option<&'a str>;
    fn raw_array(self) -> Option<&'a [Json]>;
}

impl<'a> Lookup<'a> for Option<&'a Json> {
    fn get<I: JsonIndex>(self, index: I) -> Option<&'a Json> {
        self.and_then(|json| json.get(index))
    }

    fn raw_null(self) -> Option<()> {
        self.and_then(Json::raw_null)
    }

    fn raw_bool(self) -> Option<bool> {
        self.and_then(Json::raw_bool)
    }

    fn raw_number(self) -> Option<f64> {
        self.and_then(Json::raw_number)
    }

    fn raw_string(self) -> Option<&'a str> {
        self.and_then(Json::raw_string)
    }

    fn raw_array(self) -> Option<&'a [Json]> {
        self.and_then(Json::raw_array)
    }
}
