//! Input cursor for the combinator engine.
//!
//! An [`Input`] is an immutable view over a shared text buffer plus a byte offset.
//! Advancing produces a new cursor over the same buffer; nothing is copied.

use std::fmt;
use std::sync::Arc;

/// Immutable parse position over a shared character sequence.
///
/// The offset is a byte offset that always sits on a character boundary
/// within `0..=len`. Cloning is O(1).
#[derive(Clone)]
pub struct Input {
    source: Arc<str>,
    offset: usize,
}

impl Input {
    /// Creates a cursor at the start of `text`.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            source: text.into(),
            offset: 0,
        }
    }

    /// Returns the character at the current position, or `None` at end of input.
    pub fn peek(&self) -> Option<char> {
        self.remainder().chars().next()
    }

    /// Returns a new cursor moved forward by `n` characters, clamped at end of input.
    pub fn advance(&self, n: usize) -> Self {
        let step: usize = self
            .remainder()
            .chars()
            .take(n)
            .map(char::len_utf8)
            .sum();
        Self {
            source: Arc::clone(&self.source),
            offset: self.offset + step,
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    /// The unconsumed suffix.
    pub fn remainder(&self) -> &str {
        &self.source[self.offset..]
    }

    /// Byte offset into the underlying source.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The complete underlying text, independent of the current position.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the text consumed between `start` and `self`.
    ///
    /// Both cursors must view the same buffer and `start` must not be ahead of `self`;
    /// otherwise the result is empty.
    pub fn consumed_since(&self, start: &Input) -> &str {
        if !Arc::ptr_eq(&self.source, &start.source) || start.offset > self.offset {
            return "";
        }
        &self.source[start.offset..self.offset]
    }

    /// 1-based line and column (in characters) of the current position.
    pub fn line_column(&self) -> (usize, usize) {
        let before = &self.source[..self.offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }
}

impl PartialEq for Input {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.source, &other.source) && self.offset == other.offset
    }
}

impl Eq for Input {}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("offset", &self.offset)
            .field("remainder", &self.remainder())
            .finish()
    }
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::new(text)
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_counts_characters_not_bytes() {
        let input = Input::new("héllo");
        let next = input.advance(2);
        assert_eq!(next.remainder(), "llo");
        assert_eq!(next.offset(), 3);
        assert_eq!(input.remainder(), "héllo");
    }

    #[test]
    fn test_advance_clamps_at_end() {
        let input = Input::new("ab").advance(10);
        assert!(input.is_at_end());
        assert_eq!(input.peek(), None);
        assert_eq!(input.remainder(), "");
    }

    #[test]
    fn test_equality_is_identity_and_offset() {
        let input = Input::new("abc");
        assert_eq!(input.advance(1), input.advance(1));
        assert_ne!(input.advance(1), input.advance(2));
        assert_ne!(Input::new("abc"), Input::new("abc"));
    }

    #[test]
    fn test_line_column() {
        let input = Input::new("ab\ncd\nef").advance(7);
        assert_eq!(input.line_column(), (3, 2));
        assert_eq!(Input::new("x").line_column(), (1, 1));
    }

    #[test]
    fn test_consumed_since() {
        let start = Input::new("hello world");
        let end = start.advance(5);
        assert_eq!(end.consumed_since(&start), "hello");
        assert_eq!(start.consumed_since(&end), "");
    }
}
