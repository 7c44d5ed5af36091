//! Reader for automata in HOA format.
//!
//! Supports the header items needed for synthesis, including the
//! `controllable-AP` extension, and bodies with explicit labels.

use std::fmt;

use chumsky::error::Simple;
use chumsky::primitive::{any, choice, end, filter, just};
use chumsky::recursive::recursive;
use chumsky::text::{self, TextParser as _};
use chumsky::Parser;
use log::warn;

use crate::automaton::{Automaton, ModelError, State, Transition};
use crate::expr::Expr;
use crate::{ApIndex, StateId};

/// A syntax error at a position in the input.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SyntaxError {
    line: usize,
    column: usize,
    message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// An error which can be returned when reading an automaton.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ParseError {
    /// The input is not valid HOA syntax.
    Syntax(Vec<SyntaxError>),
    /// The input is syntactically valid, but describes an inconsistent automaton.
    Model(ModelError),
}

impl ParseError {
    fn syntax(source: &str, errors: Vec<Simple<char>>) -> Self {
        let errors = errors
            .into_iter()
            .map(|e| {
                // spans count characters, not bytes
                let offset = e.span().start;
                let mut line = 1;
                let mut column = 1;
                for c in source.chars().take(offset) {
                    if c == '\n' {
                        line += 1;
                        column = 1;
                    } else {
                        column += 1;
                    }
                }
                SyntaxError {
                    line,
                    column,
                    message: e.to_string(),
                }
            })
            .collect();
        Self::Syntax(errors)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(errors) => {
                write!(f, "invalid HOA syntax")?;
                for error in errors {
                    write!(f, "\n  {}", error)?;
                }
                Ok(())
            }
            Self::Model(error) => write!(f, "invalid automaton: {}", error),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Syntax(_) => None,
            Self::Model(error) => Some(error),
        }
    }
}

impl From<ModelError> for ParseError {
    fn from(error: ModelError) -> Self {
        Self::Model(error)
    }
}

/// A single item of the header of a HOA file.
#[derive(Debug, Clone)]
enum HeaderItem {
    States(usize),
    Start(Vec<StateId>),
    Aps(usize, Vec<String>),
    ControllableAps(Vec<ApIndex>),
    Alias(String, Expr),
    Acceptance(usize, Expr),
    AccName(String, Vec<String>),
    Tool(String, Option<String>),
    Name(String),
    Properties(Vec<String>),
    Other(String),
}

/// Replaces comments by whitespace, keeping line breaks so
/// that positions of errors stay valid.
fn strip_comments(source: &str) -> String {
    let mut result = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut depth = 0usize;
    let mut in_string = false;
    while let Some(c) = chars.next() {
        if depth > 0 {
            if c == '*' && chars.peek() == Some(&'/') {
                chars.next();
                depth -= 1;
                result.push_str("  ");
            } else if c == '/' && chars.peek() == Some(&'*') {
                chars.next();
                depth += 1;
                result.push_str("  ");
            } else if c == '\n' {
                result.push('\n');
            } else {
                result.push(' ');
            }
        } else if in_string {
            result.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    result.push(escaped);
                }
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            depth = 1;
            result.push_str("  ");
        } else {
            in_string = c == '"';
            result.push(c);
        }
    }
    result
}

fn number() -> impl Parser<char, usize, Error = Simple<char>> + Clone {
    text::int(10)
        .try_map(|s: String, span| s.parse::<usize>().map_err(|e| Simple::custom(span, e)))
        .padded()
}

fn string() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    let escaped = just('\\').ignore_then(any());
    let plain = filter(|c: &char| *c != '"' && *c != '\\');
    plain
        .or(escaped)
        .repeated()
        .collect::<String>()
        .delimited_by(just('"'), just('"'))
        .padded()
}

fn identifier() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|c: &char| c.is_ascii_alphabetic() || *c == '_')
        .chain::<char, Vec<_>, _>(
            filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '-').repeated(),
        )
        .collect::<String>()
}

/// The name of an alias after the `@`, which may also start with a digit or `-`.
fn alias_name() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    filter(|c: &char| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .repeated()
        .at_least(1)
        .collect::<String>()
}

/// An identifier used as a value, i.e. not directly followed by
/// a colon, which would make it the name of the next header item.
fn value_identifier() -> impl Parser<char, String, Error = Simple<char>> + Clone {
    identifier()
        .then_ignore(just(':').not().rewind())
        .padded()
}

fn label_expr() -> impl Parser<char, Expr, Error = Simple<char>> + Clone {
    recursive(|expr| {
        let atom = choice((
            just('t').to(Expr::Bool(true)),
            just('f').to(Expr::Bool(false)),
            number().map(Expr::Ap),
            just('@').ignore_then(alias_name()).map(Expr::Alias),
            expr.delimited_by(just('('), just(')')),
        ))
        .padded();
        let unary = just('!')
            .padded()
            .repeated()
            .then(atom)
            .foldr(|_, e| Expr::not(e));
        let conjunction = unary
            .clone()
            .then(just('&').padded().ignore_then(unary).repeated())
            .foldl(Expr::and);
        conjunction
            .clone()
            .then(just('|').padded().ignore_then(conjunction).repeated())
            .foldl(Expr::or)
    })
}

fn acceptance_expr() -> impl Parser<char, Expr, Error = Simple<char>> + Clone {
    recursive(|expr| {
        let set = just('!')
            .padded()
            .or_not()
            .then(number())
            .map(|(negation, index)| match negation {
                Some(_) => Expr::not(Expr::Set(index)),
                None => Expr::Set(index),
            })
            .delimited_by(just('(').padded(), just(')'));
        let atom = choice((
            just('t').to(Expr::Bool(true)),
            just('f').to(Expr::Bool(false)),
            just("Fin").ignore_then(set.clone()).map(Expr::fin),
            just("Inf").ignore_then(set).map(Expr::inf),
            expr.delimited_by(just('('), just(')')),
        ))
        .padded();
        let conjunction = atom
            .clone()
            .then(just('&').padded().ignore_then(atom).repeated())
            .foldl(Expr::and);
        conjunction
            .clone()
            .then(just('|').padded().ignore_then(conjunction).repeated())
            .foldl(Expr::or)
    })
}

fn header_item() -> impl Parser<char, HeaderItem, Error = Simple<char>> + Clone {
    let value = choice((string(), number().map(|n| n.to_string()), value_identifier()));
    choice((
        just("States:")
            .ignore_then(number())
            .map(HeaderItem::States),
        just("Start:")
            .ignore_then(number().separated_by(just('&').padded()).at_least(1))
            .map(HeaderItem::Start),
        just("AP:")
            .ignore_then(number())
            .then(string().repeated())
            .map(|(n, names)| HeaderItem::Aps(n, names)),
        just("controllable-AP:")
            .ignore_then(number().repeated())
            .map(HeaderItem::ControllableAps),
        just("Alias:")
            .ignore_then(just('@').padded())
            .ignore_then(alias_name())
            .then(label_expr())
            .map(|(name, expr)| HeaderItem::Alias(name, expr)),
        just("Acceptance:")
            .ignore_then(number())
            .then(acceptance_expr())
            .map(|(n, condition)| HeaderItem::Acceptance(n, condition)),
        just("acc-name:")
            .ignore_then(value_identifier())
            .then(value.clone().repeated())
            .map(|(name, params)| HeaderItem::AccName(name, params)),
        just("tool:")
            .ignore_then(string())
            .then(string().or_not())
            .map(|(name, version)| HeaderItem::Tool(name, version)),
        just("name:").ignore_then(string()).map(HeaderItem::Name),
        just("properties:")
            .ignore_then(value_identifier().repeated())
            .map(HeaderItem::Properties),
        identifier()
            .then_ignore(just(':'))
            .then_ignore(value.repeated())
            .map(HeaderItem::Other),
    ))
    .padded()
}

fn state() -> impl Parser<char, State, Error = Simple<char>> + Clone {
    let label = label_expr().delimited_by(just('[').padded(), just(']').padded());
    let acc_sig = number()
        .repeated()
        .delimited_by(just('{').padded(), just('}').padded());
    let successors = number().separated_by(just('&').padded()).at_least(1);
    let edge = label
        .clone()
        .or_not()
        .then(successors)
        .then(acc_sig.clone().or_not())
        .map(|((label, successors), acc_sig)| Transition::new(label, successors, acc_sig));

    just("State:")
        .padded()
        .ignore_then(label.or_not())
        .then(number())
        .then(string().or_not())
        .then(acc_sig.or_not())
        .then(edge.repeated())
        .map(|((((label, id), name), acc_sig), transitions)| {
            let mut state = State::new(id);
            if let Some(label) = label {
                state = state.with_label(label);
            }
            if let Some(name) = name {
                state = state.with_name(name);
            }
            if let Some(acc_sig) = acc_sig {
                state = state.with_acc_sig(acc_sig);
            }
            for transition in transitions {
                state.add_transition(transition);
            }
            state
        })
}

type Document = ((String, Vec<HeaderItem>), Vec<State>);

fn document() -> impl Parser<char, Document, Error = Simple<char>> {
    let header = just("HOA:")
        .padded()
        .ignore_then(identifier().padded())
        .then(header_item().repeated());
    let body = just("--BODY--")
        .padded()
        .ignore_then(state().repeated())
        .then_ignore(just("--END--").padded());
    header.then(body).then_ignore(end())
}

fn build_automaton(
    version: String,
    items: Vec<HeaderItem>,
    states: Vec<State>,
) -> Result<Automaton, ModelError> {
    let mut builder = Automaton::builder();
    builder.version(version);
    for item in items {
        match item {
            HeaderItem::States(n) => {
                builder.num_states(n);
            }
            HeaderItem::Start(start) => {
                builder.start(start);
            }
            HeaderItem::Aps(n, names) => {
                builder.aps(n, names);
            }
            HeaderItem::ControllableAps(aps) => {
                builder.controllable_aps(aps);
            }
            HeaderItem::Alias(name, expr) => {
                builder.alias(name, expr);
            }
            HeaderItem::Acceptance(n, condition) => {
                builder.acceptance(n, condition);
            }
            HeaderItem::AccName(name, params) => {
                builder.acc_name(name, params);
            }
            HeaderItem::Tool(name, version) => {
                builder.tool(name, version);
            }
            HeaderItem::Name(name) => {
                builder.name(name);
            }
            HeaderItem::Properties(properties) => {
                builder.properties(properties);
            }
            HeaderItem::Other(name) => warn!("Ignoring unsupported header item {}:", name),
        }
    }
    for state in states {
        builder.state(state);
    }
    builder.build()
}

/// Parses an automaton in HOA format.
///
/// # Errors
///
/// Returns an error if the input is not valid HOA syntax or
/// describes an inconsistent automaton.
pub fn parse(source: &str) -> Result<Automaton, ParseError> {
    let source = strip_comments(source);
    let ((version, items), states) = document()
        .parse(source.as_str())
        .map_err(|errors| ParseError::syntax(&source, errors))?;
    Ok(build_automaton(version, items, states)?)
}
