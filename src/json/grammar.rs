//! JSON grammar built from the combinator core.
//!
//! Each production is exposed so grammar fragments can be tested on their own.
//! JSON whitespace (space, tab, newline, carriage return) is allowed between
//! tokens; a leaf value does not consume trailing whitespace. Failures below an
//! array or object carry the contexts
//! `"array element"`, `"object key"` or `"object value"`.

use once_cell::sync::Lazy;

use super::value::{Json, Map};
use crate::combinators::{
    between, char, choice, count, end_of_input, lazy, many, many1, one_of, optional, recognize,
    satisfy, sep_by, skip_many, string,
};
use crate::errors::ParseError;
use crate::input::Input;
use crate::parser::Parser;
use crate::reply::Reply;

pub const ARRAY_ELEMENT: &str = "array element";
pub const OBJECT_KEY: &str = "object key";
pub const OBJECT_VALUE: &str = "object value";

// Nested values recurse through this one parser, so nesting depth never
// builds more grammar.
static VALUE: Lazy<Parser<Json>> = Lazy::new(|| {
    choice([
        json_object(),
        json_array(),
        json_string(),
        json_number(),
        json_bool(),
        json_null(),
    ])
});

static DOCUMENT: Lazy<Parser<Json>> =
    Lazy::new(|| whitespace().then(json_value()).skip(whitespace()).skip(end_of_input()));

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parses a complete JSON document; surrounding whitespace is allowed.
pub fn parse_json(text: &str) -> Result<Json, ParseError> {
    match DOCUMENT.run(&Input::new(text)) {
        Reply::Done { output, .. } => {
            log::trace!("parsed json document: bytes={}", text.len());
            Ok(output)
        }
        Reply::Fail {
            remaining,
            contexts,
            message,
        } => {
            log::debug!(
                "json parse failed: offset={} message={} contexts={:?}",
                remaining.offset(),
                message,
                contexts
            );
            Err(ParseError::new(&remaining, contexts, message))
        }
    }
}

// ============================================================================
// PRODUCTIONS
// ============================================================================

/// `object | array | string | number | bool | null`
pub fn json_value() -> Parser<Json> {
    VALUE.clone()
}

/// Zero or more of the four JSON whitespace characters.
pub fn whitespace() -> Parser<()> {
    skip_many(one_of(" \t\n\r"))
}

pub fn json_null() -> Parser<Json> {
    string("null").map_to(Json::Null)
}

/// `true | false`, lowercase only.
pub fn json_bool() -> Parser<Json> {
    string("true")
        .map_to(Json::Bool(true))
        .or(string("false").map_to(Json::Bool(false)))
}

/// `-? digits (. digits)? ([eE] [+-]? digits)?` as a double.
pub fn json_number() -> Parser<Json> {
    let digits = || many1(satisfy(|c| c.is_ascii_digit()));
    let fraction = char('.').then(digits());
    let exponent = one_of("eE").then(optional(one_of("+-"))).then(digits());
    let literal = optional(char('-'))
        .then(digits())
        .then(optional(fraction))
        .then(optional(exponent));
    recognize(literal).try_map(|text| {
        text.parse::<f64>()
            .map(Json::Number)
            .map_err(|err| format!("number: {err}"))
    })
}

pub fn json_string() -> Parser<Json> {
    string_literal().map(Json::String)
}

/// `[ value, ... ]`
pub fn json_array() -> Parser<Json> {
    let element = lazy(json_value).label(ARRAY_ELEMENT).skip(whitespace());
    between(
        char('[').skip(whitespace()),
        sep_by(element, char(',').skip(whitespace())),
        char(']'),
    )
    .map(Json::Array)
}

/// `{ "key": value, ... }`; a repeated key takes the last value.
pub fn json_object() -> Parser<Json> {
    let key = string_literal()
        .label(OBJECT_KEY)
        .skip(whitespace())
        .skip(char(':'))
        .skip(whitespace());
    let value = lazy(json_value).label(OBJECT_VALUE).skip(whitespace());
    let pair = key.zip(value);
    between(
        char('{').skip(whitespace()),
        sep_by(pair, char(',').skip(whitespace())),
        char('}'),
    )
    .map(|pairs| {
        let mut map = Map::with_capacity(pairs.len());
        for (key, value) in pairs {
            map.insert(key, value);
        }
        Json::Object(map)
    })
}

// ============================================================================
// STRING LITERALS
// ============================================================================

/// Piece of a string literal: a literal character or one `\uXXXX` UTF-16 unit.
#[derive(Debug, Clone, Copy)]
enum Fragment {
    Char(char),
    Unit(u16),
}

/// A double-quoted string with backslash escapes. Raw control characters
/// (including newlines) are accepted as content.
pub fn string_literal() -> Parser<String> {
    let plain = satisfy(|c| c != '"' && c != '\\').map(Fragment::Char);
    let simple = one_of("\"\\/bfnrt").map(|c| Fragment::Char(unescape(c)));
    let unicode = char('u')
        .then(count(4, satisfy(|c| c.is_ascii_hexdigit())))
        .map(|digits| {
            Fragment::Unit(digits.iter().fold(0u16, |acc, d| {
                (acc << 4) | d.to_digit(16).unwrap_or(0) as u16
            }))
        });
    let escape = char('\\').then(simple.or(unicode));
    between(char('"'), many(plain.or(escape)), char('"')).map(|fragments| assemble(&fragments))
}

fn unescape(c: char) -> char {
    match c {
        'b' => '\u{0008}',
        'f' => '\u{000C}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        other => other,
    }
}

/// Joins fragments, pairing UTF-16 surrogates; unpaired ones become U+FFFD.
fn assemble(fragments: &[Fragment]) -> String {
    let mut text = String::with_capacity(fragments.len());
    let mut units = Vec::new();
    for fragment in fragments {
        match fragment {
            Fragment::Unit(unit) => units.push(*unit),
            Fragment::Char(c) => {
                flush_units(&mut text, &mut units);
                text.push(*c);
            }
        }
    }
    flush_units(&mut text, &mut units);
    text
}

fn flush_units(text: &mut String, units: &mut Vec<u16>) {
    text.extend(char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)));
}
