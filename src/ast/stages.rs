use std::fmt;

use crate::ast::operators::OpSymbol;
use crate::evaluator::{EvalError, ExpressionFunction};
use crate::value::Value;

/// Per-operand type predicate, run before a stage's operator.
pub type TypeCheck = fn(&Value) -> bool;

/// Two-operand type predicate, for operators whose operand types constrain
/// each other (comparison, addition).
pub type CombinedTypeCheck = fn(&Value, &Value) -> bool;

/// What a stage does once its children have been evaluated.
///
/// Fixed operators dispatch on the stage's symbol; the other variants carry
/// the data captured at plan time. Keeping this an enum lets constant folding
/// and the evaluator pattern-match instead of calling through opaque
/// closures.
#[derive(Clone)]
pub enum StageOperator {
    /// Apply the operation named by the stage symbol
    Builtin,
    /// Produce a constant
    Literal(Value),
    /// Look the name up in the evaluation parameters
    Parameter(String),
    /// Call a registered function with the right child's value as arguments
    Function(ExpressionFunction),
    /// Walk a dotted path from a parameter root
    Accessor(Vec<String>),
    /// Return the right child's value unchanged (parenthesis wrapper)
    NoopRight,
}

impl fmt::Debug for StageOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOperator::Builtin => write!(f, "Builtin"),
            StageOperator::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            StageOperator::Parameter(name) => f.debug_tuple("Parameter").field(name).finish(),
            StageOperator::Function(_) => write!(f, "Function(..)"),
            StageOperator::Accessor(path) => f.debug_tuple("Accessor").field(path).finish(),
            StageOperator::NoopRight => write!(f, "NoopRight"),
        }
    }
}

/// The operator family a stage belongs to, for wording type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorClass {
    Modifier,
    Comparator,
    Logical,
    Ternary,
    Prefix,
}

impl OperatorClass {
    /// Builds the type-mismatch error for an operand that failed this
    /// class's check.
    pub fn type_error(self, value: &Value, symbol: OpSymbol) -> EvalError {
        let message = match self {
            OperatorClass::Modifier => format!(
                "Value '{}' cannot be used with the modifier '{}', it is not a number",
                value, symbol
            ),
            OperatorClass::Comparator => format!(
                "Value '{}' cannot be used with the comparator '{}', it is not comparable",
                value, symbol
            ),
            OperatorClass::Logical => format!(
                "Value '{}' cannot be used with the logical operator '{}', it is not a bool",
                value, symbol
            ),
            OperatorClass::Ternary => format!(
                "Value '{}' cannot be used with the ternary operator '{}', it is not a bool",
                value, symbol
            ),
            OperatorClass::Prefix => format!(
                "Value '{}' cannot be used with the prefix '{}'",
                value, symbol
            ),
        };
        EvalError::TypeMismatch(message)
    }
}

/// One node of the planned tree.
///
/// A stage owns at most two children, the operator to run over their values,
/// and the type checks that gate it. Stages are immutable once the planner
/// returns; evaluation never writes to them, so a planned tree is freely
/// shareable between threads.
#[derive(Debug, Clone)]
pub struct EvaluationStage {
    pub symbol: OpSymbol,
    pub left: Option<Box<EvaluationStage>>,
    pub right: Option<Box<EvaluationStage>>,
    pub operator: StageOperator,
    pub left_check: Option<TypeCheck>,
    pub right_check: Option<TypeCheck>,
    pub combined_check: Option<CombinedTypeCheck>,
    pub error_class: Option<OperatorClass>,
}

impl EvaluationStage {
    /// A stage with no children and no checks; literals, parameters and the
    /// other leaf operators start here.
    pub fn leaf(symbol: OpSymbol, operator: StageOperator) -> EvaluationStage {
        EvaluationStage {
            symbol,
            left: None,
            right: None,
            operator,
            left_check: None,
            right_check: None,
            combined_check: None,
            error_class: None,
        }
    }

    /// A stage with only a right child and no checks; clauses, functions
    /// and accessors have this shape.
    pub fn with_right(
        symbol: OpSymbol,
        right: Option<Box<EvaluationStage>>,
        operator: StageOperator,
    ) -> EvaluationStage {
        EvaluationStage {
            symbol,
            left: None,
            right,
            operator,
            left_check: None,
            right_check: None,
            combined_check: None,
            error_class: None,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.symbol == OpSymbol::Literal
    }

    /// The constant this stage produces, if it is a folded or lexed literal.
    pub fn literal_value(&self) -> Option<&Value> {
        match &self.operator {
            StageOperator::Literal(v) if self.is_literal() => Some(v),
            _ => None,
        }
    }
}

/// The type-check triplet attached to a planned stage.
#[derive(Default, Clone, Copy)]
pub struct TypeChecks {
    pub left: Option<TypeCheck>,
    pub right: Option<TypeCheck>,
    pub combined: Option<CombinedTypeCheck>,
}

pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_bool(value: &Value) -> bool {
    value.is_bool()
}

pub fn is_array(value: &Value) -> bool {
    matches!(value, Value::Array(_))
}

pub fn is_regex_or_string(value: &Value) -> bool {
    matches!(value, Value::Str(_) | Value::Pattern(_))
}

/// Ordering comparisons accept two numbers or two strings, nothing else.
pub fn comparator_type_check(left: &Value, right: &Value) -> bool {
    (left.is_number() && right.is_number()) || (left.is_string() && right.is_string())
}

/// `+` adds two numbers; any string operand switches it to concatenation.
pub fn addition_type_check(left: &Value, right: &Value) -> bool {
    if left.is_number() && right.is_number() {
        return true;
    }
    left.is_string() || right.is_string()
}

/// Maps a symbol to the checks the evaluator (and the constant folder) must
/// run before applying it.
pub fn type_checks_for(symbol: OpSymbol) -> TypeChecks {
    match symbol {
        OpSymbol::Gt | OpSymbol::Lt | OpSymbol::Gte | OpSymbol::Lte => TypeChecks {
            combined: Some(comparator_type_check),
            ..TypeChecks::default()
        },
        OpSymbol::Req | OpSymbol::Nreq => TypeChecks {
            left: Some(is_string),
            right: Some(is_regex_or_string),
            ..TypeChecks::default()
        },
        OpSymbol::And | OpSymbol::Or => TypeChecks {
            left: Some(is_bool),
            right: Some(is_bool),
            ..TypeChecks::default()
        },
        OpSymbol::In => TypeChecks {
            right: Some(is_array),
            ..TypeChecks::default()
        },
        OpSymbol::BitwiseAnd
        | OpSymbol::BitwiseOr
        | OpSymbol::BitwiseXor
        | OpSymbol::BitwiseLshift
        | OpSymbol::BitwiseRshift => TypeChecks {
            left: Some(is_number),
            right: Some(is_number),
            ..TypeChecks::default()
        },
        OpSymbol::Plus => TypeChecks {
            combined: Some(addition_type_check),
            ..TypeChecks::default()
        },
        OpSymbol::Minus
        | OpSymbol::Multiply
        | OpSymbol::Divide
        | OpSymbol::Modulus
        | OpSymbol::Exponent => TypeChecks {
            left: Some(is_number),
            right: Some(is_number),
            ..TypeChecks::default()
        },
        OpSymbol::Negate | OpSymbol::BitwiseNot => TypeChecks {
            right: Some(is_number),
            ..TypeChecks::default()
        },
        OpSymbol::Invert => TypeChecks {
            right: Some(is_bool),
            ..TypeChecks::default()
        },
        OpSymbol::TernaryTrue => TypeChecks {
            left: Some(is_bool),
            ..TypeChecks::default()
        },
        // Eq/Neq compare anything; TernaryFalse and Coalesce pass values
        // through untouched.
        _ => TypeChecks::default(),
    }
}
