//! Compact JSON text output.
//!
//! Output parses back to an equal `Json` value. Numbers use Rust's shortest
//! round-trip formatting. Infinities are written as `1e999` / `-1e999`, which
//! overflow back to infinity when read; NaN has no JSON form and is written as
//! `null`.

use std::fmt::{self, Write};

use super::value::Json;

impl fmt::Display for Json {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_json(f, self)
    }
}

impl Json {
    /// Serializes this value as compact JSON text.
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }
}

fn write_json<W: Write>(out: &mut W, json: &Json) -> fmt::Result {
    match json {
        Json::Null => out.write_str("null"),
        Json::Bool(b) => out.write_str(if *b { "true" } else { "false" }),
        Json::Number(n) => write_number(out, *n),
        Json::String(s) => write_string(out, s),
        Json::Array(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_json(out, item)?;
            }
            out.write_char(']')
        }
        Json::Object(map) => {
            out.write_char('{')?;
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    out.write_char(',')?;
                }
                write_string(out, key)?;
                out.write_char(':')?;
                write_json(out, value)?;
            }
            out.write_char('}')
        }
    }
}

fn write_number<W: Write>(out: &mut W, n: f64) -> fmt::Result {
    if n.is_nan() {
        out.write_str("null")
    } else if n.is_infinite() {
        out.write_str(if n > 0.0 { "1e999" } else { "-1e999" })
    } else {
        write!(out, "{}", n)
    }
}

fn write_string<W: Write>(out: &mut W, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            '\u{0008}' => out.write_str("\\b")?,
            '\u{000C}' => out.write_str("\\f")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}
