use std::fmt;

/// Every semantic operation an evaluation stage can perform.
///
/// The lexer never produces these directly; it emits operator tokens carrying
/// their textual symbol, and the planner resolves the text against the symbol
/// tables below according to the precedence level being parsed. `Minus` and
/// `Negate` share the text `-` and are told apart that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpSymbol {
    /// Placeholder for stages that only fetch a value (parameters, accessors)
    Value,
    /// A constant produced by a literal token or by constant folding
    Literal,
    /// Parenthesis wrapper; evaluates to its right child unchanged
    Noop,

    // Comparison
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    /// Regex match (`=~`)
    Req,
    /// Negated regex match (`!~`)
    Nreq,
    /// Array membership (`in`)
    In,

    // Logical
    And,
    Or,

    // Arithmetic and bitwise
    Plus,
    Minus,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    BitwiseLshift,
    BitwiseRshift,
    Multiply,
    Divide,
    Modulus,
    Exponent,

    // Prefix
    Negate,
    Invert,
    BitwiseNot,

    // Ternary
    TernaryTrue,
    TernaryFalse,
    Coalesce,

    /// Host function call
    Functional,
    /// Parameter field/method access
    Access,
    /// Argument list builder (`,`)
    Separate,
}

/// Relative binding strength, ordered lowest to highest.
///
/// Only equality is consulted when re-associating planned trees, but the
/// total order documents how the planner levels nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Separate,
    LogicalOr,
    LogicalAnd,
    Ternary,
    Comparator,
    Multiplicative,
    BitwiseShift,
    Bitwise,
    Additive,
    Exponential,
    Prefix,
    Functional,
    Value,
    Noop,
}

impl OpSymbol {
    pub fn precedence(self) -> Precedence {
        match self {
            OpSymbol::Noop => Precedence::Noop,
            OpSymbol::Value | OpSymbol::Literal => Precedence::Value,
            OpSymbol::Eq
            | OpSymbol::Neq
            | OpSymbol::Gt
            | OpSymbol::Lt
            | OpSymbol::Gte
            | OpSymbol::Lte
            | OpSymbol::Req
            | OpSymbol::Nreq
            | OpSymbol::In => Precedence::Comparator,
            OpSymbol::And => Precedence::LogicalAnd,
            OpSymbol::Or => Precedence::LogicalOr,
            OpSymbol::BitwiseAnd | OpSymbol::BitwiseOr | OpSymbol::BitwiseXor => {
                Precedence::Bitwise
            }
            OpSymbol::BitwiseLshift | OpSymbol::BitwiseRshift => Precedence::BitwiseShift,
            OpSymbol::Plus | OpSymbol::Minus => Precedence::Additive,
            OpSymbol::Multiply | OpSymbol::Divide | OpSymbol::Modulus => {
                Precedence::Multiplicative
            }
            OpSymbol::Exponent => Precedence::Exponential,
            OpSymbol::Negate | OpSymbol::Invert | OpSymbol::BitwiseNot => Precedence::Prefix,
            OpSymbol::TernaryTrue | OpSymbol::TernaryFalse | OpSymbol::Coalesce => {
                Precedence::Ternary
            }
            OpSymbol::Functional | OpSymbol::Access => Precedence::Functional,
            OpSymbol::Separate => Precedence::Separate,
        }
    }
}

impl fmt::Display for OpSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            OpSymbol::Noop => "NOOP",
            OpSymbol::Value | OpSymbol::Literal => "value",
            OpSymbol::Eq => "==",
            OpSymbol::Neq => "!=",
            OpSymbol::Gt => ">",
            OpSymbol::Lt => "<",
            OpSymbol::Gte => ">=",
            OpSymbol::Lte => "<=",
            OpSymbol::Req => "=~",
            OpSymbol::Nreq => "!~",
            OpSymbol::In => "in",
            OpSymbol::And => "&&",
            OpSymbol::Or => "||",
            OpSymbol::Plus => "+",
            OpSymbol::Minus | OpSymbol::Negate => "-",
            OpSymbol::BitwiseAnd => "&",
            OpSymbol::BitwiseOr => "|",
            OpSymbol::BitwiseXor => "^",
            OpSymbol::BitwiseLshift => "<<",
            OpSymbol::BitwiseRshift => ">>",
            OpSymbol::Multiply => "*",
            OpSymbol::Divide => "/",
            OpSymbol::Modulus => "%",
            OpSymbol::Exponent => "**",
            OpSymbol::Invert => "!",
            OpSymbol::BitwiseNot => "~",
            OpSymbol::TernaryTrue => "?",
            OpSymbol::TernaryFalse => ":",
            OpSymbol::Coalesce => "??",
            OpSymbol::Functional => "()",
            OpSymbol::Access => ".",
            OpSymbol::Separate => ",",
        };
        write!(f, "{}", text)
    }
}

/// Comparator text, as consulted by both the lexer and the comparator level.
pub fn comparator_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "==" => Some(OpSymbol::Eq),
        "!=" => Some(OpSymbol::Neq),
        ">" => Some(OpSymbol::Gt),
        ">=" => Some(OpSymbol::Gte),
        "<" => Some(OpSymbol::Lt),
        "<=" => Some(OpSymbol::Lte),
        "=~" => Some(OpSymbol::Req),
        "!~" => Some(OpSymbol::Nreq),
        "in" => Some(OpSymbol::In),
        _ => None,
    }
}

pub fn logical_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "&&" => Some(OpSymbol::And),
        "||" => Some(OpSymbol::Or),
        _ => None,
    }
}

pub fn logical_and_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "&&" => Some(OpSymbol::And),
        _ => None,
    }
}

pub fn logical_or_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "||" => Some(OpSymbol::Or),
        _ => None,
    }
}

pub fn bitwise_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "^" => Some(OpSymbol::BitwiseXor),
        "&" => Some(OpSymbol::BitwiseAnd),
        "|" => Some(OpSymbol::BitwiseOr),
        _ => None,
    }
}

pub fn bitwise_shift_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        ">>" => Some(OpSymbol::BitwiseRshift),
        "<<" => Some(OpSymbol::BitwiseLshift),
        _ => None,
    }
}

pub fn additive_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "+" => Some(OpSymbol::Plus),
        "-" => Some(OpSymbol::Minus),
        _ => None,
    }
}

pub fn multiplicative_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "*" => Some(OpSymbol::Multiply),
        "/" => Some(OpSymbol::Divide),
        "%" => Some(OpSymbol::Modulus),
        _ => None,
    }
}

pub fn exponential_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "**" => Some(OpSymbol::Exponent),
        _ => None,
    }
}

pub fn prefix_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "-" => Some(OpSymbol::Negate),
        "!" => Some(OpSymbol::Invert),
        "~" => Some(OpSymbol::BitwiseNot),
        _ => None,
    }
}

pub fn ternary_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "?" => Some(OpSymbol::TernaryTrue),
        ":" => Some(OpSymbol::TernaryFalse),
        "??" => Some(OpSymbol::Coalesce),
        _ => None,
    }
}

pub fn separator_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "," => Some(OpSymbol::Separate),
        _ => None,
    }
}

/// Every infix arithmetic/bitwise symbol. Consulted by the lexer to classify
/// a symbol run as a modifier token; the per-level tables above decide which
/// planner level claims it.
pub fn modifier_symbol(text: &str) -> Option<OpSymbol> {
    match text {
        "+" => Some(OpSymbol::Plus),
        "-" => Some(OpSymbol::Minus),
        "*" => Some(OpSymbol::Multiply),
        "/" => Some(OpSymbol::Divide),
        "%" => Some(OpSymbol::Modulus),
        "**" => Some(OpSymbol::Exponent),
        "&" => Some(OpSymbol::BitwiseAnd),
        "|" => Some(OpSymbol::BitwiseOr),
        "^" => Some(OpSymbol::BitwiseXor),
        ">>" => Some(OpSymbol::BitwiseRshift),
        "<<" => Some(OpSymbol::BitwiseLshift),
        _ => None,
    }
}
