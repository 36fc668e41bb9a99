use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::ast::operators;
use crate::ast::tokens::{Token, TokenKind, TokenValue};
use crate::evaluator::ExpressionFunction;
use crate::syntax;

/// Errors produced while tokenising expression text.
#[derive(Debug, Clone)]
pub enum LexError {
    /// A quoted literal ran off the end of the input
    UnclosedString(String),
    /// A `[bracketed]` parameter ran off the end of the input
    UnclosedBracket,
    /// A run of symbol characters matched no known operator
    InvalidToken(String),
    /// A numeric blob that is not a valid decimal number
    InvalidNumeric(String),
    /// A `0x` blob that is not a valid hex integer
    InvalidHex(String),
    /// An accessor path ended on a dot
    HangingAccessor(String),
    /// An accessor path segment starting with a lowercase letter
    UnexportedField { field: String, token: String },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnclosedString(partial) => {
                write!(f, "Unclosed string literal '{}'", partial)
            }
            LexError::UnclosedBracket => write!(f, "Unclosed parameter bracket"),
            LexError::InvalidToken(text) => write!(f, "Invalid token: '{}'", text),
            LexError::InvalidNumeric(text) => {
                write!(f, "Unable to parse numeric value '{}' to float64", text)
            }
            LexError::InvalidHex(text) => {
                write!(f, "Unable to parse hex value '{}' to float64", text)
            }
            LexError::HangingAccessor(token) => {
                write!(f, "Hanging accessor on token '{}'", token)
            }
            LexError::UnexportedField { field, token } => {
                write!(
                    f,
                    "Unable to access unexported field '{}' in token '{}'",
                    field, token
                )
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Characters that can begin or continue an operator symbol run.
fn is_operation_char(ch: char) -> bool {
    matches!(
        ch,
        '=' | '!' | '<' | '>' | '~' | '&' | '|' | '+' | '-' | '*' | '/' | '^' | '%' | ':' | '?'
    )
}

fn is_variable_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Tokenises an expression, resolving identifiers against the registered
/// function map. Whitespace outside literals is insignificant.
pub fn tokenize(
    input: &str,
    functions: &HashMap<String, ExpressionFunction>,
) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input, functions);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }

    Ok(tokens)
}

struct Lexer<'a> {
    input: Vec<char>,
    position: usize,
    functions: &'a HashMap<String, ExpressionFunction>,
    /// Kind of the previously emitted token; decides whether a `-`/`!`/`~`
    /// run may be read as a prefix.
    last_kind: TokenKind,
}

impl<'a> Lexer<'a> {
    fn new(input: &str, functions: &'a HashMap<String, ExpressionFunction>) -> Lexer<'a> {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            functions,
            last_kind: TokenKind::Unknown,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();

        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok(None),
        };

        let token = match ch {
            '(' => {
                self.advance();
                Token::new(TokenKind::Clause, TokenValue::Symbol("(".to_string()))
            }
            ')' => {
                self.advance();
                Token::new(TokenKind::ClauseClose, TokenValue::Symbol(")".to_string()))
            }
            ',' => {
                self.advance();
                Token::new(TokenKind::Separator, TokenValue::Symbol(",".to_string()))
            }
            '[' => self.read_bracketed_variable()?,
            '\'' | '"' => self.read_string_literal(ch)?,
            _ if ch.is_ascii_digit() => self.read_number()?,
            _ if ch.is_alphabetic() => self.read_identifier_token()?,
            _ if is_operation_char(ch) => self.read_symbol()?,
            _ => return Err(LexError::InvalidToken(ch.to_string())),
        };

        self.last_kind = token.kind;
        Ok(Some(token))
    }

    /// Reads `[ ... ]`, honoring `\]` and other backslash escapes. The
    /// bracket form admits spaces and operator characters in parameter
    /// names.
    fn read_bracketed_variable(&mut self) -> Result<Token, LexError> {
        self.advance(); // opening bracket

        let mut name = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::UnclosedBracket),
                Some(']') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some(escaped) => {
                            name.push(escaped);
                            self.advance();
                        }
                        None => return Err(LexError::UnclosedBracket),
                    }
                }
                Some(ch) => {
                    name.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Token::new(TokenKind::Variable, TokenValue::Ident(name)))
    }

    /// Reads a quoted literal, then offers it to the time parser; literals
    /// matching an accepted date format become `Time` tokens.
    fn read_string_literal(&mut self, quote: char) -> Result<Token, LexError> {
        self.advance(); // opening quote

        let mut text = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::UnclosedString(text)),
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('r') => text.push('\r'),
                        Some(escaped) => text.push(escaped),
                        None => return Err(LexError::UnclosedString(text)),
                    }
                    self.advance();
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }

        if let Some(time) = try_parse_time(&text) {
            return Ok(Token::new(TokenKind::Time, TokenValue::Time(time)));
        }
        Ok(Token::new(TokenKind::Str, TokenValue::Str(text)))
    }

    /// Reads the maximal alphanumeric-and-dot blob starting with a digit
    /// and parses it as decimal or hex. Multiple radix points (`127.0.0.1`)
    /// fail here rather than lexing as several tokens.
    fn read_number(&mut self) -> Result<Token, LexError> {
        let mut blob = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '.' {
                blob.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if blob.starts_with("0x") || blob.starts_with("0X") {
            let digits = &blob[2..];
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(LexError::InvalidHex(blob));
            }
            let parsed = i64::from_str_radix(digits, 16)
                .map_err(|_| LexError::InvalidHex(blob.clone()))?;
            return Ok(Token::new(
                TokenKind::Numeric,
                TokenValue::Number(parsed as f64),
            ));
        }

        match blob.parse::<f64>() {
            Ok(number) => Ok(Token::new(TokenKind::Numeric, TokenValue::Number(number))),
            Err(_) => Err(LexError::InvalidNumeric(blob)),
        }
    }

    /// Reads an identifier, with backslash escapes admitting otherwise
    /// illegal characters (`foo\-bar` is the variable `foo-bar`).
    fn read_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if is_variable_char(ch) {
                name.push(ch);
                self.advance();
            } else if ch == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    name.push(escaped);
                    self.advance();
                }
            } else {
                break;
            }
        }
        name
    }

    /// Classifies a bare identifier: boolean literal, the textual `in`
    /// comparator, a registered function, an accessor path, or a variable.
    fn read_identifier_token(&mut self) -> Result<Token, LexError> {
        let name = self.read_identifier();

        match name.as_str() {
            "true" => return Ok(Token::new(TokenKind::Boolean, TokenValue::Bool(true))),
            "false" => return Ok(Token::new(TokenKind::Boolean, TokenValue::Bool(false))),
            // forced lower case for consistency
            "in" | "IN" => {
                return Ok(Token::new(
                    TokenKind::Comparator,
                    TokenValue::Symbol("in".to_string()),
                ))
            }
            _ => {}
        }

        if let Some(function) = self.functions.get(&name) {
            return Ok(Token::new(
                TokenKind::Function,
                TokenValue::Function(name, Arc::clone(function)),
            ));
        }

        if self.current_char() == Some('.') {
            return self.read_accessor(name);
        }

        Ok(Token::new(TokenKind::Variable, TokenValue::Ident(name)))
    }

    /// Reads the remaining `.Segment` parts of an accessor path. Every
    /// segment after the first must start with an uppercase letter.
    fn read_accessor(&mut self, root: String) -> Result<Token, LexError> {
        let mut path = vec![root];

        while self.current_char() == Some('.') {
            self.advance();

            let starts_segment = self
                .current_char()
                .map(|c| c.is_alphabetic() || c == '_')
                .unwrap_or(false);
            if !starts_segment {
                let last = path.last().cloned().unwrap_or_default();
                return Err(LexError::HangingAccessor(last));
            }

            let segment = self.read_identifier();
            let first = segment.chars().next().unwrap_or('_');
            if first.is_lowercase() {
                return Err(LexError::UnexportedField {
                    field: segment,
                    token: path.join("."),
                });
            }
            path.push(segment);
        }

        Ok(Token::new(TokenKind::Accessor, TokenValue::Accessor(path)))
    }

    /// Reads the longest run of operator characters and classifies it.
    /// Prefix operators are only attempted when the token before this one
    /// admits a prefix — that is how `-` at the start of a subexpression is
    /// told apart from binary minus.
    fn read_symbol(&mut self) -> Result<Token, LexError> {
        let mut run = String::new();
        while let Some(ch) = self.current_char() {
            if is_operation_char(ch) {
                run.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if syntax::state_for(self.last_kind).admits(TokenKind::Prefix)
            && operators::prefix_symbol(&run).is_some()
        {
            return Ok(Token::new(TokenKind::Prefix, TokenValue::Symbol(run)));
        }
        if operators::modifier_symbol(&run).is_some() {
            return Ok(Token::new(TokenKind::Modifier, TokenValue::Symbol(run)));
        }
        if operators::logical_symbol(&run).is_some() {
            return Ok(Token::new(TokenKind::LogicalOp, TokenValue::Symbol(run)));
        }
        if operators::comparator_symbol(&run).is_some() {
            return Ok(Token::new(TokenKind::Comparator, TokenValue::Symbol(run)));
        }
        if operators::ternary_symbol(&run).is_some() {
            return Ok(Token::new(TokenKind::Ternary, TokenValue::Symbol(run)));
        }

        Err(LexError::InvalidToken(run))
    }
}

/// Attempts to parse a string literal as a time, trying the fixed list of
/// accepted formats. Zone-less formats are interpreted in the local zone.
pub(crate) fn try_parse_time(candidate: &str) -> Option<DateTime<Local>> {
    // RFC 3339, with or without fractional seconds and nanosecond precision
    if let Ok(time) = DateTime::parse_from_rfc3339(candidate) {
        return Some(time.with_timezone(&Local));
    }

    // formats carrying an explicit zone offset
    const ZONED_FORMATS: &[&str] = &[
        "%a %b %d %H:%M:%S %z %Y", // ruby date
        "%Y-%m-%d %H:%M:%S%:z",
        "%Y-%m-%dT%H%z", // ISO 8601 down to hour precision
        "%Y-%m-%dT%H:%M%z",
        "%Y-%m-%dT%H:%M:%S%z",
        "%Y-%m-%dT%H:%M:%S%.f%z",
    ];
    for format in ZONED_FORMATS {
        if let Ok(time) = DateTime::parse_from_str(candidate, format) {
            return Some(time.with_timezone(&Local));
        }
    }

    const NAIVE_FORMATS: &[&str] = &[
        "%a %b %e %H:%M:%S %Y", // ANSI C
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(candidate, format) {
            if let Some(time) = Local.from_local_datetime(&naive).earliest() {
                return Some(time);
            }
        }
    }

    // bare date, local midnight
    if let Ok(date) = NaiveDate::parse_from_str(candidate, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0)?;
        if let Some(time) = Local.from_local_datetime(&naive).earliest() {
            return Some(time);
        }
    }

    // kitchen clock ("3:04PM"), attached to day zero
    if let Ok(clock) = NaiveTime::parse_from_str(candidate, "%l:%M%p") {
        let date = NaiveDate::from_ymd_opt(0, 1, 1)?;
        if let Some(time) = Local.from_local_datetime(&date.and_time(clock)).earliest() {
            return Some(time);
        }
    }

    None
}
