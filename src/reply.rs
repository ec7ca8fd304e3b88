//! The result model every parser produces.

use im::Vector;

use crate::input::Input;

/// Outcome of running a parser against an [`Input`].
///
/// `Fail::remaining` is the cursor where the lowest-level primitive gave up,
/// unless an `attempt` rewrote it back to its own start.
/// `contexts` is ordered outermost first.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Done {
        remaining: Input,
        output: T,
    },
    Fail {
        remaining: Input,
        contexts: Vector<String>,
        message: String,
    },
}

impl<T> Reply<T> {
    /// Builds a failure with an empty context stack.
    pub fn fail(remaining: Input, message: impl Into<String>) -> Self {
        Reply::Fail {
            remaining,
            contexts: Vector::new(),
            message: message.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Reply::Done { .. })
    }

    pub fn is_fail(&self) -> bool {
        matches!(self, Reply::Fail { .. })
    }

    /// The cursor after the parse, whichever way it went.
    pub fn remaining(&self) -> &Input {
        match self {
            Reply::Done { remaining, .. } | Reply::Fail { remaining, .. } => remaining,
        }
    }

    /// Consumes the reply, returning the output of a successful parse.
    pub fn output(self) -> Option<T> {
        match self {
            Reply::Done { output, .. } => Some(output),
            Reply::Fail { .. } => None,
        }
    }

    /// Borrowing view of a successful parse.
    pub fn done(&self) -> Option<(&Input, &T)> {
        match self {
            Reply::Done { remaining, output } => Some((remaining, output)),
            Reply::Fail { .. } => None,
        }
    }

    /// Borrowing view of a failed parse: remaining input, contexts, message.
    pub fn failure(&self) -> Option<(&Input, &Vector<String>, &str)> {
        match self {
            Reply::Done { .. } => None,
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => Some((remaining, contexts, message.as_str())),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reply<U> {
        match self {
            Reply::Done { remaining, output } => Reply::Done {
                remaining,
                output: f(output),
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
        }
    }
}
