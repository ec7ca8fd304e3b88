//! The `Parser` type and its method combinators.
//!
//! A parser is a shared, immutable closure from an [`Input`] to a [`Reply`].
//! Composition never mutates a parser; every method returns a new one.
//!
//! Alternation does not backtrack over consumed input. [`Parser::or`] only tries
//! its second branch when the first failed without moving past its start; wrap
//! the first branch in [`Parser::attempt`] to lift that restriction.

use std::fmt;
use std::sync::Arc;

use crate::input::Input;
use crate::reply::Reply;

type RunFn<T> = dyn Fn(&Input) -> Reply<T> + Send + Sync;

/// A composable parsing function producing values of type `T`.
pub struct Parser<T> {
    run: Arc<RunFn<T>>,
}

impl<T> Clone for Parser<T> {
    fn clone(&self) -> Self {
        Self {
            run: Arc::clone(&self.run),
        }
    }
}

impl<T> fmt::Debug for Parser<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("output", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: 'static> Parser<T> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Input) -> Reply<T> + Send + Sync + 'static,
    {
        Self { run: Arc::new(f) }
    }

    /// Runs the parser against `input`.
    pub fn run(&self, input: &Input) -> Reply<T> {
        (self.run)(input)
    }

    /// True when both handles share the same underlying parser.
    pub fn ptr_eq(&self, other: &Parser<T>) -> bool {
        Arc::ptr_eq(&self.run, &other.run)
    }

    /// Transforms a successful output. Failures pass through unchanged.
    pub fn map<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        Parser::new(move |input| self.run(input).map(&f))
    }

    /// Replaces a successful output with a fixed value.
    pub fn map_to<U>(self, value: U) -> Parser<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        self.map(move |_| value.clone())
    }

    /// Like [`Parser::map`], but `f` may reject the output.
    ///
    /// A rejection fails at the position where this parser started, with the
    /// returned message.
    pub fn try_map<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> Result<U, String> + Send + Sync + 'static,
    {
        Parser::new(move |input| match self.run(input) {
            Reply::Done { remaining, output } => match f(output) {
                Ok(output) => Reply::Done { remaining, output },
                Err(message) => Reply::fail(input.clone(), message),
            },
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => Reply::Fail {
                remaining,
                contexts,
                message,
            },
        })
    }

    /// Sequencing (monadic bind): on success runs `f(output)` from the new position.
    pub fn and_then<U, F>(self, f: F) -> Parser<U>
    where
        U: 'static,
        F: Fn(T) -> Parser<U> + Send + Sync + 'static,
    {
        Parser::new(move |input| match self.run(input) {
            Reply::Done { remaining, output } => f(output).run(&remaining),
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => Reply::Fail {
                remaining,
                contexts,
                message,
            },
        })
    }

    /// Runs `self` then `next`, keeping the output of `next`.
    pub fn then<U: 'static>(self, next: Parser<U>) -> Parser<U> {
        Parser::new(move |input| match self.run(input) {
            Reply::Done { remaining, .. } => next.run(&remaining),
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => Reply::Fail {
                remaining,
                contexts,
                message,
            },
        })
    }

    /// Runs `self` then `next`, keeping the output of `self`.
    pub fn skip<U: 'static>(self, next: Parser<U>) -> Parser<T> {
        self.zip(next).map(|(output, _)| output)
    }

    /// Runs `self` then `next`, keeping both outputs.
    pub fn zip<U: 'static>(self, next: Parser<U>) -> Parser<(T, U)> {
        Parser::new(move |input| match self.run(input) {
            Reply::Done { remaining, output } => next.run(&remaining).map(|second| (output, second)),
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => Reply::Fail {
                remaining,
                contexts,
                message,
            },
        })
    }

    /// Alternation. `other` runs from the original position only if `self`
    /// failed without consuming input; a consuming failure propagates as is.
    pub fn or(self, other: Parser<T>) -> Parser<T> {
        Parser::new(move |input| {
            let reply = self.run(input);
            if reply.is_fail() && reply.remaining().offset() == input.offset() {
                return other.run(input);
            }
            reply
        })
    }

    /// On failure, rewinds the failure position to where this parser started,
    /// so an enclosing [`Parser::or`] retries its next branch.
    pub fn attempt(self) -> Parser<T> {
        Parser::new(move |input| match self.run(input) {
            Reply::Fail {
                contexts, message, ..
            } => Reply::Fail {
                remaining: input.clone(),
                contexts,
                message,
            },
            done => done,
        })
    }

    /// On failure, pushes `name` onto the front of the context stack.
    pub fn label(self, name: impl Into<String>) -> Parser<T> {
        let name = name.into();
        Parser::new(move |input| match self.run(input) {
            Reply::Fail {
                remaining,
                mut contexts,
                message,
            } => {
                contexts.push_front(name.clone());
                Reply::Fail {
                    remaining,
                    contexts,
                    message,
                }
            }
            done => done,
        })
    }
}

/// Runs `parser` over `text` from its first character.
pub fn parse<T: 'static>(parser: &Parser<T>, text: &str) -> Reply<T> {
    parser.run(&Input::new(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::{char, string};

    #[test]
    fn test_map_transforms_output() {
        let reply = parse(&char('a').map(|c| c.to_ascii_uppercase()), "ab");
        let (remaining, output) = reply.done().unwrap();
        assert_eq!(*output, 'A');
        assert_eq!(remaining.remainder(), "b");
    }

    #[test]
    fn test_try_map_fails_at_start() {
        let p = string("ab").try_map(|_| Err::<(), _>("rejected".to_string()));
        let reply = parse(&p, "abc");
        let (remaining, contexts, message) = reply.failure().unwrap();
        assert_eq!(remaining.remainder(), "abc");
        assert!(contexts.is_empty());
        assert_eq!(message, "rejected");
    }

    #[test]
    fn test_and_then_sequences() {
        let p = char('a').and_then(|first| char('b').map(move |second| format!("{first}{second}")));
        assert_eq!(parse(&p, "ab").output().as_deref(), Some("ab"));
    }

    #[test]
    fn test_or_does_not_backtrack_after_consumption() {
        let p = string("ab").or(string("ac"));
        let reply = parse(&p, "ac");
        let (remaining, _, message) = reply.failure().unwrap();
        assert_eq!(remaining.remainder(), "c");
        assert_eq!(message, "satisfy");
    }

    #[test]
    fn test_attempt_enables_backtracking() {
        let p = string("ab").attempt().or(string("ac"));
        assert_eq!(parse(&p, "ac").output().as_deref(), Some("ac"));
    }

    #[test]
    fn test_label_prepends_outermost_first() {
        let p = char('x').label("inner").label("outer");
        let reply = parse(&p, "y");
        let (_, contexts, _) = reply.failure().unwrap();
        assert_eq!(
            contexts.iter().cloned().collect::<Vec<_>>(),
            vec!["outer".to_string(), "inner".to_string()]
        );
    }

    #[test]
    fn test_parsers_are_reusable() {
        let p = string("abc");
        let input = Input::new("abc");
        assert_eq!(p.run(&input), p.run(&input));
        assert!(parse(&p, "abd").is_fail());
        assert!(parse(&p, "abc").is_done());
        assert!(p.ptr_eq(&p.clone()));
        assert!(!p.ptr_eq(&string("abc")));
    }
}
