//! Error types surfaced to callers of `parse_json`, `decode` and the conversion traits.
//!
//! Engine-level failures are plain [`Reply::Fail`](crate::Reply) values. They only
//! become errors at the top level, where [`ParseError`] snapshots the failure together
//! with the source text so it can be rendered as a `miette` diagnostic.

use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::input::Input;

pub type SourceArc = Arc<NamedSource<String>>;

// ============================================================================
// SYNTAX ERRORS
// ============================================================================

/// A grammar-level parse failure that reached the top level un-recovered.
#[derive(Debug, Clone, Error, Diagnostic)]
#[error("{message} at line {line}, column {column}{}", render_contexts(.contexts))]
#[diagnostic(code(parsnip::syntax))]
pub struct ParseError {
    /// The unconsumed input at the point of failure.
    pub remaining: String,
    /// Labels of the parsers active at the failure, outermost first.
    pub contexts: Vec<String>,
    /// Name of the primitive check that failed.
    pub message: String,
    /// Byte offset of the failure in the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
    #[source_code]
    src: SourceArc,
    #[label("{message}")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl ParseError {
    /// Snapshots a failure at `remaining` with the given context stack and message.
    pub fn new<I>(remaining: &Input, contexts: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let contexts: Vec<String> = contexts.into_iter().collect();
        let (line, column) = remaining.line_column();
        let width = remaining.peek().map_or(0, char::len_utf8);
        let help = (!contexts.is_empty()).then(|| format!("while parsing {}", contexts.join(" > ")));
        Self {
            remaining: remaining.remainder().to_string(),
            message: message.into(),
            offset: remaining.offset(),
            line,
            column,
            src: Arc::new(NamedSource::new("input", remaining.source().to_string())),
            span: (remaining.offset(), width).into(),
            help,
            contexts,
        }
    }
}

fn render_contexts(contexts: &[String]) -> String {
    if contexts.is_empty() {
        String::new()
    } else {
        format!(" (in {})", contexts.join(" > "))
    }
}

// ============================================================================
// CONVERSION ERRORS
// ============================================================================

/// Failure to convert between a `Json` tree and a native value.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ConversionError {
    #[error("type mismatch: expected {expected}, found {actual}")]
    #[diagnostic(code(parsnip::convert::type_mismatch))]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("missing field `{key}`")]
    #[diagnostic(code(parsnip::convert::missing_field))]
    MissingField { key: String },

    #[error("number {value} does not fit in {target}")]
    #[diagnostic(code(parsnip::convert::number_out_of_range))]
    NumberOutOfRange { target: &'static str, value: f64 },

    #[error("in field `{key}`: {inner}")]
    #[diagnostic(code(parsnip::convert::field))]
    InField {
        key: String,
        inner: Box<ConversionError>,
    },

    #[error("in element {index}: {inner}")]
    #[diagnostic(code(parsnip::convert::element))]
    InElement {
        index: usize,
        inner: Box<ConversionError>,
    },

    #[error("{0}")]
    #[diagnostic(code(parsnip::convert::custom))]
    Custom(String),
}

impl ConversionError {
    pub fn type_mismatch(expected: &'static str, actual: &'static str) -> Self {
        ConversionError::TypeMismatch { expected, actual }
    }

    pub fn missing_field(key: impl Into<String>) -> Self {
        ConversionError::MissingField { key: key.into() }
    }

    pub fn custom(message: impl Into<String>) -> Self {
        ConversionError::Custom(message.into())
    }

    /// Wraps this error as having occurred under object key `key`.
    pub fn in_field(self, key: impl Into<String>) -> Self {
        ConversionError::InField {
            key: key.into(),
            inner: Box::new(self),
        }
    }

    /// Wraps this error as having occurred at array position `index`.
    pub fn in_element(self, index: usize) -> Self {
        ConversionError::InElement {
            index,
            inner: Box::new(self),
        }
    }

    /// The innermost error, with all field/element wrappers removed.
    pub fn root(&self) -> &ConversionError {
        match self {
            ConversionError::InField { inner, .. } | ConversionError::InElement { inner, .. } => {
                inner.root()
            }
            other => other,
        }
    }

    /// Location of the innermost error, e.g. `items[2].name`. Empty at the root.
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut current = self;
        loop {
            match current {
                ConversionError::InField { key, inner } => {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(key);
                    current = inner;
                }
                ConversionError::InElement { index, inner } => {
                    path.push_str(&format!("[{index}]"));
                    current = inner;
                }
                _ => return path,
            }
        }
    }
}

// ============================================================================
// TOP-LEVEL ERROR
// ============================================================================

/// Error returned by [`decode`](crate::decode): either stage can fail.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Conversion(#[from] ConversionError),
}

impl Error {
    pub fn as_syntax(&self) -> Option<&ParseError> {
        match self {
            Error::Syntax(err) => Some(err),
            Error::Conversion(_) => None,
        }
    }

    pub fn as_conversion(&self) -> Option<&ConversionError> {
        match self {
            Error::Conversion(err) => Some(err),
            Error::Syntax(_) => None,
        }
    }
}
