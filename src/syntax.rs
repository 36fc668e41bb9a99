//! Token-sequence validation, expressed as a per-kind transition table.
//!
//! Each token kind owns a record describing which kinds may follow it,
//! whether an expression may legally end on it, and whether its payload may
//! be absent. The table is data, not code: adding a token kind means adding
//! a record, not touching the traversal below.

use std::fmt;

use crate::ast::tokens::{Token, TokenKind, TokenValue};

/// Errors produced by the validator passes.
#[derive(Debug, Clone)]
pub enum SyntaxError {
    /// Two adjacent tokens whose kinds may not follow each other
    InvalidTransition {
        from_kind: TokenKind,
        from_value: String,
        to_kind: TokenKind,
        to_value: String,
    },
    /// A parenthesis after an identifier that is not a registered function
    UndefinedFunction(String),
    /// The expression ended on a kind that cannot terminate it
    UnexpectedEnd,
    /// Clause tokens do not nest to zero
    UnbalancedParenthesis,
    /// A token kind that requires a payload was built without one
    NilValue(TokenKind),
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxError::InvalidTransition {
                from_kind,
                from_value,
                to_kind,
                to_value,
            } => write!(
                f,
                "Cannot transition token types from {} [{}] to {} [{}]",
                from_kind, from_value, to_kind, to_value
            ),
            SyntaxError::UndefinedFunction(name) => write!(f, "Undefined function {}", name),
            SyntaxError::UnexpectedEnd => write!(f, "Unexpected end of expression"),
            SyntaxError::UnbalancedParenthesis => write!(f, "Unbalanced parenthesis"),
            SyntaxError::NilValue(kind) => {
                write!(f, "Token kind '{}' cannot have a nil value", kind)
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

/// The validation record for one token kind.
#[derive(Debug)]
pub struct SyntaxState {
    pub kind: TokenKind,
    /// May the expression legally end on this kind?
    pub is_eof: bool,
    /// May this kind's token carry no payload?
    pub is_nullable: bool,
    next_kinds: &'static [TokenKind],
}

impl SyntaxState {
    pub fn admits(&self, kind: TokenKind) -> bool {
        self.next_kinds.contains(&kind)
    }
}

use TokenKind::*;

/// The fixed transition table. The `Unknown` start state admits any
/// value-introducing kind, a prefix, or a clause opener.
static VALID_STATES: &[SyntaxState] = &[
    SyntaxState {
        kind: Unknown,
        is_eof: false,
        is_nullable: true,
        next_kinds: &[
            Prefix, Numeric, Boolean, Variable, Pattern, Function, Accessor, Str, Time, Clause,
        ],
    },
    SyntaxState {
        kind: Clause,
        is_eof: false,
        is_nullable: true,
        next_kinds: &[
            Prefix, Numeric, Boolean, Variable, Pattern, Function, Accessor, Str, Time, Clause,
            ClauseClose,
        ],
    },
    SyntaxState {
        kind: ClauseClose,
        is_eof: true,
        is_nullable: true,
        next_kinds: &[
            Comparator, Modifier, ClauseClose, LogicalOp, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Numeric,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[
            Modifier, Comparator, LogicalOp, ClauseClose, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Boolean,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[
            Modifier, Comparator, LogicalOp, ClauseClose, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Str,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[
            Modifier, Comparator, LogicalOp, ClauseClose, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Time,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[Modifier, Comparator, LogicalOp, ClauseClose, Separator],
    },
    SyntaxState {
        kind: Pattern,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[Modifier, Comparator, LogicalOp, ClauseClose, Separator],
    },
    SyntaxState {
        kind: Variable,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[
            Modifier, Comparator, LogicalOp, ClauseClose, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Modifier,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[
            Prefix, Numeric, Variable, Function, Accessor, Str, Boolean, Clause,
        ],
    },
    SyntaxState {
        kind: Comparator,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[
            Prefix, Numeric, Boolean, Variable, Function, Accessor, Str, Time, Clause, Pattern,
        ],
    },
    SyntaxState {
        kind: LogicalOp,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[
            Prefix, Numeric, Boolean, Variable, Function, Accessor, Str, Time, Clause,
        ],
    },
    SyntaxState {
        kind: Prefix,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[Numeric, Boolean, Variable, Function, Accessor, Clause],
    },
    SyntaxState {
        kind: Ternary,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[
            Prefix, Numeric, Boolean, Str, Time, Variable, Function, Accessor, Clause, Separator,
        ],
    },
    SyntaxState {
        kind: Function,
        is_eof: false,
        is_nullable: false,
        next_kinds: &[Clause],
    },
    SyntaxState {
        kind: Accessor,
        is_eof: true,
        is_nullable: false,
        next_kinds: &[
            Clause, Modifier, Comparator, LogicalOp, ClauseClose, Ternary, Separator,
        ],
    },
    SyntaxState {
        kind: Separator,
        is_eof: false,
        is_nullable: true,
        next_kinds: &[
            Prefix, Numeric, Boolean, Str, Time, Variable, Function, Accessor, Clause,
        ],
    },
];

/// Looks up the record for a kind. Kinds missing from the table (only
/// `Unknown` itself) share the start state.
pub fn state_for(kind: TokenKind) -> &'static SyntaxState {
    VALID_STATES
        .iter()
        .find(|state| state.kind == kind)
        .unwrap_or(&VALID_STATES[0])
}

/// Walks the token list through the transition table.
///
/// Rejects illegal adjacencies, payload-less tokens of non-nullable kinds,
/// and expressions ending on a non-terminal kind. An identifier directly
/// followed by `(` gets its own wording: that shape is only legal for
/// registered functions, so it is always a missing registration.
pub fn check_syntax(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut state = state_for(TokenKind::Unknown);
    let mut last_token: Option<&Token> = None;

    for token in tokens {
        if !state.admits(token.kind) {
            if let Some(last) = last_token {
                if last.kind == TokenKind::Variable && token.kind == TokenKind::Clause {
                    let name = match &last.value {
                        Some(TokenValue::Ident(name)) => name.clone(),
                        _ => String::new(),
                    };
                    return Err(SyntaxError::UndefinedFunction(name));
                }
            }

            return Err(SyntaxError::InvalidTransition {
                from_kind: state.kind,
                from_value: last_token.map(Token::value_display).unwrap_or_else(|| "null".to_string()),
                to_kind: token.kind,
                to_value: token.value_display(),
            });
        }

        state = state_for(token.kind);

        if !state.is_nullable && token.value.is_none() {
            return Err(SyntaxError::NilValue(token.kind));
        }

        last_token = Some(token);
    }

    if !state.is_eof {
        return Err(SyntaxError::UnexpectedEnd);
    }
    Ok(())
}

/// Checks that clause tokens nest to zero.
pub fn check_balance(tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut parens = 0i32;

    for token in tokens {
        match token.kind {
            TokenKind::Clause => parens += 1,
            TokenKind::ClauseClose => parens -= 1,
            _ => {}
        }
    }

    if parens != 0 {
        return Err(SyntaxError::UnbalancedParenthesis);
    }
    Ok(())
}
