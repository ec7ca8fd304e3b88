//! Primitive and derived combinators.
//!
//! Every primitive reports the message `"satisfy"` when a character test fails,
//! with the failure positioned at the offending character.

use once_cell::sync::OnceCell;

use crate::input::Input;
use crate::parser::Parser;
use crate::reply::Reply;

// ============================================================================
// PRIMITIVES
// ============================================================================

/// Consumes one character if `predicate` holds for it.
pub fn satisfy<F>(predicate: F) -> Parser<char>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(move |input| match input.peek() {
        Some(c) if predicate(c) => Reply::Done {
            remaining: input.advance(1),
            output: c,
        },
        _ => Reply::fail(input.clone(), "satisfy"),
    })
}

/// Always succeeds with `value`, consuming nothing.
pub fn pure<T>(value: T) -> Parser<T>
where
    T: Clone + Send + Sync + 'static,
{
    Parser::new(move |input| Reply::Done {
        remaining: input.clone(),
        output: value.clone(),
    })
}

/// Always fails with `message`, consuming nothing.
pub fn fail<T: 'static>(message: impl Into<String>) -> Parser<T> {
    let message = message.into();
    Parser::new(move |input| Reply::fail(input.clone(), message.clone()))
}

/// Succeeds only at end of input.
pub fn end_of_input() -> Parser<()> {
    Parser::new(|input| {
        if input.is_at_end() {
            Reply::Done {
                remaining: input.clone(),
                output: (),
            }
        } else {
            Reply::fail(input.clone(), "endOfInput")
        }
    })
}

pub fn char(expected: char) -> Parser<char> {
    satisfy(move |c| c == expected)
}

pub fn any_char() -> Parser<char> {
    satisfy(|_| true)
}

pub fn one_of(chars: &str) -> Parser<char> {
    let chars: Vec<char> = chars.chars().collect();
    satisfy(move |c| chars.contains(&c))
}

pub fn none_of(chars: &str) -> Parser<char> {
    let chars: Vec<char> = chars.chars().collect();
    satisfy(move |c| !chars.contains(&c))
}

/// Matches `expected` character by character.
///
/// Behaves as a chain of `satisfy` checks: on a mismatch the matched prefix stays
/// consumed and the failure points at the first differing character.
pub fn string(expected: &str) -> Parser<String> {
    let expected = expected.to_string();
    Parser::new(move |input| {
        let mut current = input.clone();
        for c in expected.chars() {
            if current.peek() != Some(c) {
                return Reply::fail(current, "satisfy");
            }
            current = current.advance(1);
        }
        Reply::Done {
            remaining: current,
            output: expected.clone(),
        }
    })
}

/// Consumes characters while `predicate` holds. Never fails.
pub fn take_while<F>(predicate: F) -> Parser<String>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(move |input| {
        let count = input.remainder().chars().take_while(|&c| predicate(c)).count();
        let remaining = input.advance(count);
        let output = remaining.consumed_since(input).to_string();
        Reply::Done { remaining, output }
    })
}

/// Like [`take_while`] but requires at least one character.
pub fn take_while1<F>(predicate: F) -> Parser<String>
where
    F: Fn(char) -> bool + Send + Sync + 'static,
{
    Parser::new(move |input| match input.peek() {
        Some(c) if predicate(c) => {
            let count = input.remainder().chars().take_while(|&c| predicate(c)).count();
            let remaining = input.advance(count);
            let output = remaining.consumed_since(input).to_string();
            Reply::Done { remaining, output }
        }
        _ => Reply::fail(input.clone(), "satisfy"),
    })
}

/// Consumes zero or more whitespace characters. Always succeeds.
pub fn skip_spaces() -> Parser<()> {
    skip_many(satisfy(char::is_whitespace))
}

// ============================================================================
// BACKTRACKING & CONTEXT
// ============================================================================

/// Free-function form of [`Parser::attempt`].
pub fn attempt<T: 'static>(parser: Parser<T>) -> Parser<T> {
    parser.attempt()
}

/// Free-function form of [`Parser::label`].
pub fn label<T: 'static>(parser: Parser<T>, name: impl Into<String>) -> Parser<T> {
    parser.label(name)
}

/// Runs `parser` without consuming input on success.
pub fn look_ahead<T: 'static>(parser: Parser<T>) -> Parser<T> {
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { output, .. } => Reply::Done {
            remaining: input.clone(),
            output,
        },
        fail => fail,
    })
}

/// Succeeds, consuming nothing, only when `parser` fails here.
pub fn not_followed_by<T: 'static>(parser: Parser<T>) -> Parser<()> {
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { .. } => Reply::fail(input.clone(), "notFollowedBy"),
        Reply::Fail { .. } => Reply::Done {
            remaining: input.clone(),
            output: (),
        },
    })
}

/// Defers construction of a parser until it first runs. Needed for recursive grammars.
pub fn lazy<T, F>(build: F) -> Parser<T>
where
    T: 'static,
    F: Fn() -> Parser<T> + Send + Sync + 'static,
{
    let cell: OnceCell<Parser<T>> = OnceCell::new();
    Parser::new(move |input| cell.get_or_init(&build).run(input))
}

/// Returns the text consumed by `parser` instead of its output.
pub fn recognize<T: 'static>(parser: Parser<T>) -> Parser<String> {
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { remaining, .. } => {
            let output = remaining.consumed_since(input).to_string();
            Reply::Done { remaining, output }
        }
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

// ============================================================================
// ALTERNATION
// ============================================================================

/// Tries each parser in order with [`Parser::or`] semantics.
pub fn choice<T: 'static>(parsers: impl IntoIterator<Item = Parser<T>>) -> Parser<T> {
    parsers
        .into_iter()
        .reduce(Parser::or)
        .unwrap_or_else(|| fail("choice"))
}

/// Runs `parser`, falling back to `default` if it fails without consuming input.
pub fn option<T>(default: T, parser: Parser<T>) -> Parser<T>
where
    T: Clone + Send + Sync + 'static,
{
    parser.or(pure(default))
}

/// Runs `parser`, yielding `None` if it fails without consuming input.
pub fn optional<T: 'static>(parser: Parser<T>) -> Parser<Option<T>> {
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { remaining, output } => Reply::Done {
            remaining,
            output: Some(output),
        },
        Reply::Fail { remaining, .. } if remaining.offset() == input.offset() => Reply::Done {
            remaining: input.clone(),
            output: None,
        },
        fail => fail.map(|_| None),
    })
}

// ============================================================================
// REPETITION
// ============================================================================

/// Outcome of one repetition step.
enum Step<T> {
    Item(Input, T),
    Stop,
    Abort(Reply<T>),
}

fn step<T: 'static>(parser: &Parser<T>, current: &Input) -> Step<T> {
    match parser.run(current) {
        // an item that consumed nothing would repeat forever
        Reply::Done { remaining, .. } if remaining.offset() == current.offset() => Step::Stop,
        Reply::Done { remaining, output } => Step::Item(remaining, output),
        Reply::Fail { remaining, .. } if remaining.offset() == current.offset() => Step::Stop,
        fail => Step::Abort(fail),
    }
}

fn repeat_from<T: 'static>(parser: &Parser<T>, start: Input, mut items: Vec<T>) -> Reply<Vec<T>> {
    let mut current = start;
    loop {
        match step(parser, &current) {
            Step::Item(remaining, output) => {
                items.push(output);
                current = remaining;
            }
            Step::Stop => {
                return Reply::Done {
                    remaining: current,
                    output: items,
                }
            }
            Step::Abort(fail) => return fail.map(|_| Vec::new()),
        }
    }
}

/// Zero or more repetitions.
///
/// Stops successfully at the first failure that consumed nothing. A failure after
/// consuming input propagates. An iteration that succeeds without consuming input
/// also ends the repetition and is not collected.
pub fn many<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |input| repeat_from(&parser, input.clone(), Vec::new()))
}

/// One or more repetitions.
pub fn many1<T: 'static>(parser: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { remaining, output } => repeat_from(&parser, remaining, vec![output]),
        fail => fail.map(|_| Vec::new()),
    })
}

pub fn skip_many<T: 'static>(parser: Parser<T>) -> Parser<()> {
    many(parser).map(|_| ())
}

pub fn skip_many1<T: 'static>(parser: Parser<T>) -> Parser<()> {
    many1(parser).map(|_| ())
}

/// Exactly `n` repetitions.
pub fn count<T: 'static>(n: usize, parser: Parser<T>) -> Parser<Vec<T>> {
    Parser::new(move |input| {
        let mut current = input.clone();
        let mut items = Vec::with_capacity(n);
        for _ in 0..n {
            match parser.run(&current) {
                Reply::Done { remaining, output } => {
                    items.push(output);
                    current = remaining;
                }
                fail => return fail.map(|_| Vec::new()),
            }
        }
        Reply::Done {
            remaining: current,
            output: items,
        }
    })
}

/// Repeats `parser` until `end` succeeds, returning the collected items.
pub fn many_till<T, E>(parser: Parser<T>, end: Parser<E>) -> Parser<Vec<T>>
where
    T: 'static,
    E: 'static,
{
    Parser::new(move |input| {
        let mut current = input.clone();
        let mut items = Vec::new();
        loop {
            match end.run(&current) {
                Reply::Done { remaining, .. } => {
                    return Reply::Done {
                        remaining,
                        output: items,
                    }
                }
                Reply::Fail { remaining, .. } if remaining.offset() == current.offset() => {}
                fail => return fail.map(|_| Vec::new()),
            }
            match parser.run(&current) {
                Reply::Done { remaining, output } => {
                    items.push(output);
                    current = remaining;
                }
                fail => return fail.map(|_| Vec::new()),
            }
        }
    })
}

/// Zero or more `parser` occurrences separated by `separator`.
pub fn sep_by<T, S>(parser: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    let items = sep_by1(parser, separator);
    Parser::new(move |input| match items.run(input) {
        Reply::Fail { remaining, .. } if remaining.offset() == input.offset() => Reply::Done {
            remaining: input.clone(),
            output: Vec::new(),
        },
        reply => reply,
    })
}

/// One or more `parser` occurrences separated by `separator`.
pub fn sep_by1<T, S>(parser: Parser<T>, separator: Parser<S>) -> Parser<Vec<T>>
where
    T: 'static,
    S: 'static,
{
    let rest = separator.then(parser.clone());
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { remaining, output } => repeat_from(&rest, remaining, vec![output]),
        fail => fail.map(|_| Vec::new()),
    })
}

/// Runs `open`, `parser`, `close` in order, keeping only `parser`'s output.
pub fn between<O, T, C>(open: Parser<O>, parser: Parser<T>, close: Parser<C>) -> Parser<T>
where
    O: 'static,
    T: 'static,
    C: 'static,
{
    open.then(parser).skip(close)
}

/// One or more `parser` occurrences joined by left-associative operators.
pub fn chainl1<T, F>(parser: Parser<T>, operator: Parser<F>) -> Parser<T>
where
    T: 'static,
    F: Fn(T, T) -> T + 'static,
{
    let rest = operator.zip(parser.clone());
    Parser::new(move |input| match parser.run(input) {
        Reply::Done { remaining, output } => {
            let mut acc = output;
            let mut current = remaining;
            loop {
                match step(&rest, &current) {
                    Step::Item(remaining, (apply, rhs)) => {
                        acc = apply(acc, rhs);
                        current = remaining;
                    }
                    Step::Stop => {
                        return Reply::Done {
                            remaining: current,
                            output: acc,
                        }
                    }
                    Step::Abort(fail) => return fail.map(|_| acc),
                }
            }
        }
        fail => fail,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn fail_parts<T: 'static>(reply: Reply<T>) -> (String, Vec<String>, String) {
        match reply {
            Reply::Fail {
                remaining,
                contexts,
                message,
            } => (
                remaining.remainder().to_string(),
                contexts.into_iter().collect(),
                message,
            ),
            Reply::Done { .. } => panic!("expected failure"),
        }
    }

    #[test]
    fn test_satisfy_does_not_consume_on_failure() {
        let (remaining, contexts, message) = fail_parts(parse(&satisfy(char::is_numeric), "x1"));
        assert_eq!(remaining, "x1");
        assert!(contexts.is_empty());
        assert_eq!(message, "satisfy");
    }

    #[test]
    fn test_string_keeps_partial_match_consumed() {
        let (remaining, _, message) = fail_parts(parse(&string("hello"), "help"));
        assert_eq!(remaining, "p");
        assert_eq!(message, "satisfy");
    }

    #[test]
    fn test_many_stops_on_non_consuming_failure() {
        let reply = parse(&many(char('a')), "aaab");
        let (remaining, output) = reply.done().unwrap();
        assert_eq!(output.len(), 3);
        assert_eq!(remaining.remainder(), "b");
    }

    #[test]
    fn test_many_propagates_consuming_failure() {
        let (remaining, _, _) = fail_parts(parse(&many(string("ab")), "ababac"));
        assert_eq!(remaining, "c");
    }

    #[test]
    fn test_many_terminates_on_empty_success() {
        let reply = parse(&many(skip_spaces()), "abc");
        assert_eq!(reply.output(), Some(vec![]));
    }

    #[test]
    fn test_many1_requires_one() {
        assert!(parse(&many1(char('a')), "b").is_fail());
        assert_eq!(parse(&many1(char('a')), "ab").output(), Some(vec!['a']));
    }

    #[test]
    fn test_sep_by_empty_and_trailing_separator() {
        let digits = sep_by(satisfy(|c| c.is_ascii_digit()), char(','));
        assert_eq!(parse(&digits, "").output(), Some(vec![]));
        assert_eq!(parse(&digits, "1,2,3").output(), Some(vec!['1', '2', '3']));
        let (remaining, _, _) = fail_parts(parse(&digits, "1,2,"));
        assert_eq!(remaining, "");
    }

    #[test]
    fn test_between_keeps_inner() {
        let p = between(char('('), many(none_of(")")), char(')'));
        let reply = parse(&p, "(abc)!");
        let (remaining, output) = reply.done().unwrap();
        assert_eq!(output.iter().collect::<String>(), "abc");
        assert_eq!(remaining.remainder(), "!");
    }

    #[test]
    fn test_optional_and_option() {
        assert_eq!(parse(&optional(char('-')), "5").output(), Some(None));
        assert_eq!(parse(&optional(char('-')), "-5").output(), Some(Some('-')));
        assert_eq!(parse(&option('+', one_of("+-")), "5").output(), Some('+'));
    }

    #[test]
    fn test_look_ahead_and_not_followed_by() {
        let reply = parse(&look_ahead(string("ab")), "abc");
        assert_eq!(reply.remaining().remainder(), "abc");

        let keyword = string("let").skip(not_followed_by(satisfy(char::is_alphanumeric)));
        assert!(parse(&keyword, "let x").is_done());
        let (_, _, message) = fail_parts(parse(&keyword, "letter"));
        assert_eq!(message, "notFollowedBy");
    }

    #[test]
    fn test_end_of_input() {
        assert!(parse(&char('a').skip(end_of_input()), "a").is_done());
        let (remaining, _, message) = fail_parts(parse(&char('a').skip(end_of_input()), "ab"));
        assert_eq!(remaining, "b");
        assert_eq!(message, "endOfInput");
    }

    #[test]
    fn test_count_and_many_till() {
        let hex = count(2, satisfy(|c| c.is_ascii_hexdigit()));
        assert_eq!(parse(&hex, "ff00").output(), Some(vec!['f', 'f']));

        let comment = string("/*").then(many_till(any_char(), string("*/")));
        let reply = parse(&comment, "/* hi */rest");
        assert_eq!(reply.remaining().remainder(), "rest");
        assert_eq!(reply.output().map(|cs| cs.into_iter().collect::<String>()), Some(" hi ".to_string()));
    }

    #[test]
    fn test_choice_and_recognize() {
        let p = choice(vec![string("a"), string("b"), string("c")]);
        assert_eq!(parse(&p, "c").output().as_deref(), Some("c"));
        assert!(parse(&choice(Vec::<Parser<()>>::new()), "x").is_fail());

        let word = recognize(many1(satisfy(char::is_alphabetic)));
        assert_eq!(parse(&word, "abc def").output().as_deref(), Some("abc"));
    }

    #[test]
    fn test_take_while() {
        assert_eq!(parse(&take_while(char::is_numeric), "x").output().as_deref(), Some(""));
        assert_eq!(parse(&take_while1(char::is_numeric), "12x").output().as_deref(), Some("12"));
        assert!(parse(&take_while1(char::is_numeric), "x").is_fail());
    }

    #[test]
    fn test_lazy_supports_recursion() {
        fn nested() -> Parser<usize> {
            between(char('['), optional(lazy(nested)), char(']')).map(|inner| inner.map_or(1, |d| d + 1))
        }
        assert_eq!(parse(&nested(), "[[[]]]").output(), Some(3));
    }
}
