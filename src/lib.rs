//! Parsnip: a parser combinator engine with a JSON grammar and typed
//! decode/encode layer built on it.
//!
//! Parsers are immutable values composed with sequencing, alternation,
//! repetition and labels. Alternation never backtracks over consumed input
//! unless the branch is wrapped in [`attempt`].
//!
//! ```rust
//! use parsnip::{parse, string, Reply};
//!
//! let p = string("ab").or(string("ac"));
//! assert!(parse(&p, "ac").is_fail());
//!
//! let p = string("ab").attempt().or(string("ac"));
//! assert!(matches!(parse(&p, "ac"), Reply::Done { .. }));
//! ```

pub mod combinators;
pub mod errors;
pub mod input;
pub mod json;
pub mod parser;
pub mod reply;

pub use combinators::*;
pub use errors::{ConversionError, Error, ParseError};
pub use input::Input;
pub use json::{parse_json, FromJson, Json, JsonIndex, Lookup, ToJson};
pub use parser::{parse, Parser};
pub use reply::Reply;

/// Parses `text` as JSON and converts the result into `T`.
pub fn decode<T: FromJson>(text: &str) -> Result<T, Error> {
    let json = parse_json(text)?;
    json.decode_as::<T>().map_err(|err| {
        log::debug!(
            "json decode failed: target={} path={} error={}",
            std::any::type_name::<T>(),
            err.path(),
            err.root()
        );
        Error::Conversion(err)
    })
}

/// Renders `value` as compact JSON text.
///
/// Every encodable value decodes back to an equal one, with two exceptions:
/// NaN is written as `null`, and `Some(None)` of a nested `Option` collapses to
/// `null`. 64-bit integers are not encodable, as f64 cannot hold all of them:
///
/// ```compile_fail
/// parsnip::encode(&9_007_199_254_740_993_i64);
/// ```
pub fn encode<T: ToJson + ?Sized>(value: &T) -> String {
    value.to_json().to_string()
}
