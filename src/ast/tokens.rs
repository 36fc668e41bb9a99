use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::evaluator::ExpressionFunction;

/// The lexical category of a token.
///
/// `Unknown` is never emitted by the lexer; it is the start state of the
/// syntax validator's transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Unknown,

    /// Unary operator (`-`, `!`, `~`) in value position
    Prefix,
    /// Numeric literal, widened to f64
    Numeric,
    /// `true` or `false`
    Boolean,
    /// Quoted string literal
    Str,
    /// Precompiled regex literal (produced by the optimiser pass)
    Pattern,
    /// String literal that matched one of the accepted date formats
    Time,
    /// Parameter reference, bare or bracketed
    Variable,
    /// Registered function reference
    Function,
    /// Argument separator (`,`)
    Separator,
    /// Dotted field/method path (`foo.Bar.Baz`)
    Accessor,

    /// Binary comparison (`==`, `<`, `=~`, `in`, ...)
    Comparator,
    /// `&&` or `||`
    LogicalOp,
    /// Infix arithmetic or bitwise operator
    Modifier,

    /// `(`
    Clause,
    /// `)`
    ClauseClose,

    /// `?`, `:` or `??`
    Ternary,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Unknown => "UNKNOWN",
            TokenKind::Prefix => "PREFIX",
            TokenKind::Numeric => "NUMERIC",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Str => "STRING",
            TokenKind::Pattern => "PATTERN",
            TokenKind::Time => "TIME",
            TokenKind::Variable => "VARIABLE",
            TokenKind::Function => "FUNCTION",
            TokenKind::Separator => "SEPARATOR",
            TokenKind::Accessor => "ACCESSOR",
            TokenKind::Comparator => "COMPARATOR",
            TokenKind::LogicalOp => "LOGICALOP",
            TokenKind::Modifier => "MODIFIER",
            TokenKind::Clause => "CLAUSE",
            TokenKind::ClauseClose => "CLAUSE_CLOSE",
            TokenKind::Ternary => "TERNARY",
        };
        write!(f, "{}", name)
    }
}

/// The payload of a token.
#[derive(Clone)]
pub enum TokenValue {
    /// Numeric literal value
    Number(f64),
    /// Boolean literal value
    Bool(bool),
    /// String literal contents
    Str(String),
    /// Parsed time literal, local zone
    Time(DateTime<Local>),
    /// Precompiled regex
    Pattern(Arc<Regex>),
    /// Variable name
    Ident(String),
    /// Accessor path; the first segment is a parameter name
    Accessor(Vec<String>),
    /// Function name and its registered callable
    Function(String, ExpressionFunction),
    /// Textual symbol of an operator, clause or separator token
    Symbol(String),
}

impl TokenValue {
    /// The textual symbol, if this value carries one. The planner uses this
    /// to match operator tokens against a level's symbol table.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            TokenValue::Symbol(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Debug for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "Number({})", n),
            TokenValue::Bool(b) => write!(f, "Bool({})", b),
            TokenValue::Str(s) => write!(f, "Str({:?})", s),
            TokenValue::Time(t) => write!(f, "Time({})", t),
            TokenValue::Pattern(re) => write!(f, "Pattern({:?})", re.as_str()),
            TokenValue::Ident(name) => write!(f, "Ident({:?})", name),
            TokenValue::Accessor(path) => f.debug_tuple("Accessor").field(path).finish(),
            TokenValue::Function(name, _) => write!(f, "Function({:?})", name),
            TokenValue::Symbol(text) => write!(f, "Symbol({:?})", text),
        }
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(n) => write!(f, "{}", crate::value::format_number(*n)),
            TokenValue::Bool(b) => write!(f, "{}", b),
            TokenValue::Str(s) => write!(f, "{}", s),
            TokenValue::Time(t) => write!(f, "{}", t),
            TokenValue::Pattern(re) => write!(f, "{}", re.as_str()),
            TokenValue::Ident(name) => write!(f, "{}", name),
            TokenValue::Accessor(path) => write!(f, "{}", path.join(".")),
            TokenValue::Function(name, _) => write!(f, "{}", name),
            TokenValue::Symbol(text) => write!(f, "{}", text),
        }
    }
}

/// Functions compare by callable identity, patterns by source text.
impl PartialEq for TokenValue {
    fn eq(&self, other: &TokenValue) -> bool {
        match (self, other) {
            (TokenValue::Number(a), TokenValue::Number(b)) => a == b,
            (TokenValue::Bool(a), TokenValue::Bool(b)) => a == b,
            (TokenValue::Str(a), TokenValue::Str(b)) => a == b,
            (TokenValue::Time(a), TokenValue::Time(b)) => a == b,
            (TokenValue::Pattern(a), TokenValue::Pattern(b)) => a.as_str() == b.as_str(),
            (TokenValue::Ident(a), TokenValue::Ident(b)) => a == b,
            (TokenValue::Accessor(a), TokenValue::Accessor(b)) => a == b,
            (TokenValue::Function(a, fa), TokenValue::Function(b, fb)) => {
                a == b && Arc::ptr_eq(fa, fb)
            }
            (TokenValue::Symbol(a), TokenValue::Symbol(b)) => a == b,
            _ => false,
        }
    }
}

/// A single lexed token: a kind plus its payload.
///
/// The payload is optional only for the benefit of
/// [`Expression::from_tokens`](crate::Expression::from_tokens); the syntax
/// validator rejects a missing payload on any kind other than `Clause`,
/// `ClauseClose` and `Separator`. The lexer itself always fills it in.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Option<TokenValue>,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue) -> Token {
        Token {
            kind,
            value: Some(value),
        }
    }

    /// The textual symbol of an operator token, if any.
    pub fn symbol(&self) -> Option<&str> {
        self.value.as_ref().and_then(TokenValue::symbol)
    }

    /// Renders the payload for transition-error messages; absent payloads
    /// print as `null`, matching the validator's wording.
    pub(crate) fn value_display(&self) -> String {
        match &self.value {
            Some(value) => value.to_string(),
            None => "null".to_string(),
        }
    }
}
