//! Field and method access over host-supplied values.
//!
//! An accessor token like `foo.Bar.Baz` resolves `foo` in the evaluation
//! parameters and then walks the remaining segments over the resulting
//! [`HostObject`]. Each segment is tried as a field first, then as a method;
//! argument coercion into the method's declared parameter kinds happens
//! here, not in the host.

use crate::evaluator::EvalError;
use crate::params::Parameters;
use crate::value::Value;

/// The declared kind of one method parameter, used to coerce call
/// arguments before the method runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
}

impl ParamKind {
    fn name(self) -> &'static str {
        match self {
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Uint => "uint",
            ParamKind::Float => "float",
            ParamKind::Str => "string",
        }
    }
}

/// A method argument after coercion into its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MethodArg {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
}

/// The capability an opaque parameter exposes to accessor chains.
///
/// Hosts implement whichever parts they need: `field` for plain data
/// descent, `method` + `invoke` for callable segments. `method` declares the
/// parameter kinds so the accessor can check arity and coerce arguments
/// before `invoke` runs; an error returned from `invoke` propagates out of
/// evaluation with its message untouched.
///
/// Methods take `&self`, so shared references and `Arc`-wrapped hosts both
/// receive their receiver correctly.
pub trait HostObject: Send + Sync {
    /// Resolves a plain field, or `None` if no such field exists.
    fn field(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Declared parameter kinds of a method, or `None` if no such method
    /// exists.
    fn method(&self, name: &str) -> Option<Vec<ParamKind>> {
        let _ = name;
        None
    }

    /// Invokes a method with arguments already coerced to the kinds
    /// `method` declared.
    fn invoke(&self, name: &str, args: &[MethodArg]) -> Result<Value, EvalError> {
        let _ = args;
        Err(EvalError::custom(format!(
            "method '{}' is not implemented",
            name
        )))
    }
}

/// Walks an accessor path. `args` is the evaluated argument clause (or
/// `Null` when the accessor has none); it is offered to every method
/// encountered along the path.
pub(crate) fn access(
    path: &[String],
    args: &Value,
    parameters: &dyn Parameters,
) -> Result<Value, EvalError> {
    let root = &path[0];
    let mut value = parameters
        .get(root)
        .ok_or_else(|| EvalError::MissingParameter(root.clone()))?;
    let joined = path.join(".");

    for segment in &path[1..] {
        let host = match &value {
            Value::Host(host) => host.clone(),
            _ => {
                return Err(EvalError::NotHostObject {
                    segment: segment.clone(),
                    path: joined.clone(),
                })
            }
        };

        if let Some(field_value) = host.field(segment) {
            value = field_value;
            continue;
        }

        let declared = match host.method(segment) {
            Some(declared) => declared,
            None => {
                return Err(EvalError::NoMethodOrField {
                    name: segment.clone(),
                    path: joined.clone(),
                })
            }
        };

        let supplied = call_arguments(args);
        let coerced = coerce_arguments(&declared, supplied)?;
        value = host.invoke(segment, &coerced)?;
    }

    Ok(value)
}

/// Shapes the evaluated argument clause into a call's argument list, the
/// same way function stages do.
fn call_arguments(args: &Value) -> Vec<Value> {
    match args {
        Value::Null => Vec::new(),
        Value::Array(items) => items.clone(),
        single => vec![single.clone()],
    }
}

/// Checks arity and coerces each argument to its declared kind.
fn coerce_arguments(
    declared: &[ParamKind],
    supplied: Vec<Value>,
) -> Result<Vec<MethodArg>, EvalError> {
    if supplied.len() < declared.len() {
        return Err(EvalError::TooFewArguments);
    }
    if supplied.len() > declared.len() {
        return Err(EvalError::TooManyArguments);
    }

    declared
        .iter()
        .zip(supplied)
        .map(|(kind, value)| coerce_argument(*kind, value))
        .collect()
}

/// Numbers coerce between the numeric kinds (a negative value refuses the
/// unsigned ones); everything else must already be the declared kind.
fn coerce_argument(kind: ParamKind, value: Value) -> Result<MethodArg, EvalError> {
    let mismatch = |value: &Value| EvalError::ArgumentConversion {
        value: value.to_string(),
        expected: kind.name(),
    };

    match kind {
        ParamKind::Bool => match value {
            Value::Bool(b) => Ok(MethodArg::Bool(b)),
            other => Err(mismatch(&other)),
        },
        ParamKind::Int => match value {
            Value::Number(n) => Ok(MethodArg::Int(n as i64)),
            other => Err(mismatch(&other)),
        },
        ParamKind::Uint => match value {
            Value::Number(n) if n >= 0.0 => Ok(MethodArg::Uint(n as u64)),
            other => Err(mismatch(&other)),
        },
        ParamKind::Float => match value {
            Value::Number(n) => Ok(MethodArg::Float(n)),
            other => Err(mismatch(&other)),
        },
        ParamKind::Str => match value {
            Value::Str(s) => Ok(MethodArg::Str(s)),
            other => Err(mismatch(&other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_mismatches() {
        let declared = vec![ParamKind::Str];
        match coerce_arguments(&declared, vec![]) {
            Err(EvalError::TooFewArguments) => {}
            other => panic!("expected TooFewArguments, got {:?}", other),
        }
        match coerce_arguments(&declared, vec![Value::from("a"), Value::from("b")]) {
            Err(EvalError::TooManyArguments) => {}
            other => panic!("expected TooManyArguments, got {:?}", other),
        }
    }

    #[test]
    fn test_number_does_not_coerce_to_string() {
        let err = coerce_argument(ParamKind::Str, Value::Number(5.0)).unwrap_err();
        assert!(err.to_string().contains("Argument type conversion failed"));
    }

    #[test]
    fn test_negative_number_refuses_uint() {
        assert!(coerce_argument(ParamKind::Uint, Value::Number(-1.0)).is_err());
        assert_eq!(
            coerce_argument(ParamKind::Uint, Value::Number(7.0)).unwrap(),
            MethodArg::Uint(7)
        );
    }
}
