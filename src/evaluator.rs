use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::accessor;
use crate::ast::operators::OpSymbol;
use crate::ast::stages::{EvaluationStage, StageOperator};
use crate::params::Parameters;
use crate::value::Value;

/// A host-registered function callable from expressions.
///
/// Receives the evaluated argument list and returns a single value. Errors
/// returned here propagate out of `evaluate` with their message preserved.
pub type ExpressionFunction =
    Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// Errors that can occur while evaluating a compiled expression.
///
/// Parse-time problems never reach this type; they are reported when the
/// expression is constructed.
#[derive(Debug, Clone)]
pub enum EvalError {
    /// A referenced parameter is absent from the environment
    MissingParameter(String),
    /// An operand failed an operator's type check; carries the full message
    TypeMismatch(String),
    /// A dynamic regex operand failed to compile
    BadPattern { pattern: String, detail: String },
    /// An accessor segment names neither a field nor a method
    NoMethodOrField { name: String, path: String },
    /// An accessor walked into a value that is not a host object
    NotHostObject { segment: String, path: String },
    /// A method call received fewer arguments than declared
    TooFewArguments,
    /// A method call received more arguments than declared
    TooManyArguments,
    /// A method argument could not be coerced to its declared kind
    ArgumentConversion { value: String, expected: &'static str },
    /// An error raised by a host function or method, passed through verbatim
    Custom(String),
}

impl EvalError {
    /// Wraps a host-side failure; the message is surfaced unchanged.
    pub fn custom(message: impl Into<String>) -> EvalError {
        EvalError::Custom(message.into())
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::MissingParameter(name) => {
                write!(f, "No parameter '{}' found.", name)
            }
            EvalError::TypeMismatch(message) => write!(f, "{}", message),
            EvalError::BadPattern { pattern, detail } => {
                write!(f, "Unable to compile regexp pattern '{}': {}", pattern, detail)
            }
            EvalError::NoMethodOrField { name, path } => {
                write!(f, "No method or field '{}' present on parameter '{}'", name, path)
            }
            EvalError::NotHostObject { segment, path } => {
                write!(f, "Unable to access '{}', '{}' is not a host object", segment, path)
            }
            EvalError::TooFewArguments => write!(f, "Too few arguments to parameter call"),
            EvalError::TooManyArguments => write!(f, "Too many arguments to parameter call"),
            EvalError::ArgumentConversion { value, expected } => {
                write!(
                    f,
                    "Argument type conversion failed: cannot convert '{}' to {}",
                    value, expected
                )
            }
            EvalError::Custom(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for EvalError {}

/// Evaluates a stage tree against the given parameters.
///
/// Left child first, then short-circuits, then the right child, then type
/// checks, then the operator. The short-circuit cut means type errors on a
/// dead branch are never reported: `false && (1 > 'x')` is just `false`.
pub(crate) fn evaluate_stage(
    stage: &EvaluationStage,
    parameters: &dyn Parameters,
) -> Result<Value, EvalError> {
    let left = match &stage.left {
        Some(child) => evaluate_stage(child, parameters)?,
        None => Value::Null,
    };

    match stage.symbol {
        OpSymbol::And if left == Value::Bool(false) => return Ok(Value::Bool(false)),
        OpSymbol::Or if left == Value::Bool(true) => return Ok(Value::Bool(true)),
        OpSymbol::Coalesce if !left.is_null() => return Ok(left),
        OpSymbol::TernaryTrue if left == Value::Bool(false) => return Ok(Value::Null),
        OpSymbol::TernaryFalse if !left.is_null() => return Ok(left),
        _ => {}
    }

    let right = match &stage.right {
        Some(child) => evaluate_stage(child, parameters)?,
        None => Value::Null,
    };

    run_type_checks(stage, &left, &right)?;

    match &stage.operator {
        StageOperator::Literal(value) => Ok(value.clone()),
        StageOperator::Parameter(name) => parameters
            .get(name)
            .ok_or_else(|| EvalError::MissingParameter(name.clone())),
        StageOperator::Function(function) => {
            let args = function_arguments(right);
            function(&args)
        }
        StageOperator::Accessor(path) => accessor::access(path, &right, parameters),
        StageOperator::NoopRight => Ok(right),
        StageOperator::Builtin => apply_operator(stage.symbol, left, right),
    }
}

/// Runs a stage's type checks. The combined check supersedes the per-side
/// checks when present and blames the left value, matching the wording the
/// per-side checks use.
pub(crate) fn run_type_checks(
    stage: &EvaluationStage,
    left: &Value,
    right: &Value,
) -> Result<(), EvalError> {
    if let Some(combined) = stage.combined_check {
        if !combined(left, right) {
            if let Some(class) = stage.error_class {
                return Err(class.type_error(left, stage.symbol));
            }
            return Err(EvalError::TypeMismatch(format!(
                "Value '{}' cannot be used with '{}'",
                left, stage.symbol
            )));
        }
        return Ok(());
    }

    for (check, value) in [(stage.left_check, left), (stage.right_check, right)] {
        if let Some(check) = check {
            if !check(value) {
                if let Some(class) = stage.error_class {
                    return Err(class.type_error(value, stage.symbol));
                }
                return Err(EvalError::TypeMismatch(format!(
                    "Value '{}' cannot be used with '{}'",
                    value, stage.symbol
                )));
            }
        }
    }
    Ok(())
}

/// Shapes the evaluated argument stage into a call's argument list: absent
/// or null means no arguments, a separator-built array spreads, anything
/// else is a single argument.
fn function_arguments(right: Value) -> Vec<Value> {
    match right {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        single => vec![single],
    }
}

/// Applies a fixed operator to its (already type-checked) operand values.
/// Unary operators receive `Null` on the side they ignore.
pub(crate) fn apply_operator(
    symbol: OpSymbol,
    left: Value,
    right: Value,
) -> Result<Value, EvalError> {
    match symbol {
        OpSymbol::Eq => Ok(Value::Bool(left == right)),
        OpSymbol::Neq => Ok(Value::Bool(left != right)),

        OpSymbol::Gt | OpSymbol::Gte | OpSymbol::Lt | OpSymbol::Lte => {
            Ok(Value::Bool(apply_comparison(symbol, &left, &right)))
        }

        OpSymbol::Req => Ok(Value::Bool(regex_match(&left, &right)?)),
        OpSymbol::Nreq => Ok(Value::Bool(!regex_match(&left, &right)?)),

        OpSymbol::In => {
            let items = right.as_array().unwrap_or(&[]);
            Ok(Value::Bool(items.contains(&left)))
        }

        OpSymbol::And => Ok(Value::Bool(
            left == Value::Bool(true) && right == Value::Bool(true),
        )),
        OpSymbol::Or => Ok(Value::Bool(
            left == Value::Bool(true) || right == Value::Bool(true),
        )),

        OpSymbol::Plus => Ok(apply_addition(left, right)),
        OpSymbol::Minus => Ok(numeric(left.as_number().unwrap_or(0.0) - right.as_number().unwrap_or(0.0))),
        OpSymbol::Multiply => Ok(numeric(
            left.as_number().unwrap_or(0.0) * right.as_number().unwrap_or(0.0),
        )),
        OpSymbol::Divide => Ok(numeric(
            left.as_number().unwrap_or(0.0) / right.as_number().unwrap_or(0.0),
        )),
        OpSymbol::Modulus => Ok(numeric(
            left.as_number().unwrap_or(0.0) % right.as_number().unwrap_or(0.0),
        )),
        OpSymbol::Exponent => Ok(numeric(
            left.as_number()
                .unwrap_or(0.0)
                .powf(right.as_number().unwrap_or(0.0)),
        )),

        OpSymbol::BitwiseAnd => Ok(bitwise(left, right, |l, r| l & r)),
        OpSymbol::BitwiseOr => Ok(bitwise(left, right, |l, r| l | r)),
        OpSymbol::BitwiseXor => Ok(bitwise(left, right, |l, r| l ^ r)),
        OpSymbol::BitwiseLshift => Ok(numeric(shift_left(
            left.as_number().unwrap_or(0.0),
            right.as_number().unwrap_or(0.0),
        ))),
        OpSymbol::BitwiseRshift => Ok(numeric(shift_right(
            left.as_number().unwrap_or(0.0),
            right.as_number().unwrap_or(0.0),
        ))),

        OpSymbol::Negate => Ok(numeric(-right.as_number().unwrap_or(0.0))),
        OpSymbol::Invert => Ok(Value::Bool(right != Value::Bool(true))),
        OpSymbol::BitwiseNot => Ok(numeric(!(right.as_number().unwrap_or(0.0) as i64) as f64)),

        OpSymbol::TernaryTrue => {
            if left == Value::Bool(true) {
                Ok(right)
            } else {
                Ok(Value::Null)
            }
        }
        OpSymbol::TernaryFalse | OpSymbol::Coalesce => {
            if left.is_null() {
                Ok(right)
            } else {
                Ok(left)
            }
        }

        OpSymbol::Separate => Ok(match left {
            Value::Array(mut items) => {
                items.push(right);
                Value::Array(items)
            }
            single => Value::Array(vec![single, right]),
        }),

        _ => Err(EvalError::TypeMismatch(format!(
            "Unable to evaluate operator '{}'",
            symbol
        ))),
    }
}

fn numeric(n: f64) -> Value {
    Value::Number(n)
}

/// Ordering comparison over two numbers or two strings; the combined type
/// check has already ruled out anything else.
fn apply_comparison(symbol: OpSymbol, left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match symbol {
            OpSymbol::Gt => l > r,
            OpSymbol::Gte => l >= r,
            OpSymbol::Lt => l < r,
            _ => l <= r,
        },
        (Value::Str(l), Value::Str(r)) => match symbol {
            OpSymbol::Gt => l > r,
            OpSymbol::Gte => l >= r,
            OpSymbol::Lt => l < r,
            _ => l <= r,
        },
        _ => false,
    }
}

/// `+` adds two numbers; any string operand turns the operation into
/// concatenation of both operands' textual forms.
fn apply_addition(left: Value, right: Value) -> Value {
    if left.is_string() || right.is_string() {
        return Value::Str(format!("{}{}", left, right));
    }
    numeric(left.as_number().unwrap_or(0.0) + right.as_number().unwrap_or(0.0))
}

/// Matches the left string against the right side: an already-compiled
/// pattern is used directly, a string is compiled here, at evaluation time.
fn regex_match(left: &Value, right: &Value) -> Result<bool, EvalError> {
    let subject = left.as_str().unwrap_or("");
    match right {
        Value::Pattern(pattern) => Ok(pattern.is_match(subject)),
        Value::Str(source) => match Regex::new(source) {
            Ok(pattern) => Ok(pattern.is_match(subject)),
            Err(error) => Err(EvalError::BadPattern {
                pattern: source.clone(),
                detail: error.to_string(),
            }),
        },
        _ => Ok(false),
    }
}

fn bitwise(left: Value, right: Value, op: fn(i64, i64) -> i64) -> Value {
    let l = left.as_number().unwrap_or(0.0) as i64;
    let r = right.as_number().unwrap_or(0.0) as i64;
    numeric(op(l, r) as f64)
}

/// Shift counts are taken as unsigned, so a negative or oversized count
/// shifts everything out instead of panicking.
fn shift_left(left: f64, right: f64) -> f64 {
    let value = left as i64;
    let count = right as i64 as u64;
    if count >= 64 {
        0.0
    } else {
        (value << count) as f64
    }
}

fn shift_right(left: f64, right: f64) -> f64 {
    let value = left as i64;
    let count = right as i64 as u64;
    if count >= 64 {
        if value < 0 {
            -1.0
        } else {
            0.0
        }
    } else {
        (value >> count) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_concatenates_with_strings() {
        let result = apply_operator(
            OpSymbol::Plus,
            Value::Number(2.0),
            Value::Str("nd".to_string()),
        )
        .unwrap();
        assert_eq!(result, Value::Str("2nd".to_string()));
    }

    #[test]
    fn test_bitwise_truncates_to_integer() {
        let result =
            apply_operator(OpSymbol::BitwiseAnd, Value::Number(6.9), Value::Number(3.0)).unwrap();
        assert_eq!(result, Value::Number(2.0));
    }

    #[test]
    fn test_oversized_shift_empties() {
        let result = apply_operator(
            OpSymbol::BitwiseLshift,
            Value::Number(1.0),
            Value::Number(65.0),
        )
        .unwrap();
        assert_eq!(result, Value::Number(0.0));
    }
}
