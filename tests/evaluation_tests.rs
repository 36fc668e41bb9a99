// tests/evaluation_tests.rs

use std::collections::HashMap;
use std::sync::Arc;

use nutmeg_lang::{
    EvalError, Expression, ExpressionFunction, HostObject, MethodArg, ParamKind, Value,
};

fn eval(input: &str) -> Result<Value, EvalError> {
    Expression::new(input)
        .unwrap_or_else(|e| panic!("parse failure for '{}': {}", input, e))
        .evaluate(&())
}

fn eval_with(input: &str, params: &HashMap<String, Value>) -> Result<Value, EvalError> {
    Expression::new(input)
        .unwrap_or_else(|e| panic!("parse failure for '{}': {}", input, e))
        .evaluate(params)
}

fn params(pairs: Vec<(&str, Value)>) -> HashMap<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

// ============================================================================
// Dummy host objects, mirroring the shapes accessors are used against
// ============================================================================

struct DummyParameter;

impl HostObject for DummyParameter {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "String" => Some(Value::from("string!")),
            "Int" => Some(Value::Number(101.0)),
            "BoolFalse" => Some(Value::Bool(false)),
            "Nested" => Some(Value::host(DummyNested)),
            _ => None,
        }
    }

    fn method(&self, name: &str) -> Option<Vec<ParamKind>> {
        match name {
            "Func" => Some(vec![]),
            "FuncArgStr" => Some(vec![ParamKind::Str]),
            "Sum" => Some(vec![ParamKind::Int, ParamKind::Float]),
            "AlwaysFail" => Some(vec![]),
            _ => None,
        }
    }

    fn invoke(&self, name: &str, args: &[MethodArg]) -> Result<Value, EvalError> {
        match name {
            "Func" => Ok(Value::from("funk")),
            "FuncArgStr" => match &args[0] {
                MethodArg::Str(s) => Ok(Value::from(s.clone())),
                other => Err(EvalError::custom(format!("unexpected arg {:?}", other))),
            },
            "Sum" => {
                let a = match args[0] {
                    MethodArg::Int(i) => i as f64,
                    _ => 0.0,
                };
                let b = match args[1] {
                    MethodArg::Float(f) => f,
                    _ => 0.0,
                };
                Ok(Value::Number(a + b))
            }
            "AlwaysFail" => Err(EvalError::custom("function should always fail")),
            _ => Err(EvalError::custom(format!("no such method '{}'", name))),
        }
    }
}

struct DummyNested;

impl HostObject for DummyNested {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Funk" => Some(Value::from("funkalicious")),
            _ => None,
        }
    }

    fn method(&self, name: &str) -> Option<Vec<ParamKind>> {
        match name {
            "Dunk" => Some(vec![ParamKind::Str]),
            _ => None,
        }
    }

    fn invoke(&self, name: &str, args: &[MethodArg]) -> Result<Value, EvalError> {
        match (name, &args[0]) {
            ("Dunk", MethodArg::Str(s)) => Ok(Value::Str(format!("{}dunk", s))),
            _ => Err(EvalError::custom(format!("no such method '{}'", name))),
        }
    }
}

fn foo_params() -> HashMap<String, Value> {
    params(vec![("foo", Value::host(DummyParameter))])
}

// ============================================================================
// Arithmetic and literals
// ============================================================================

#[test]
fn test_literal_arithmetic() {
    let test_cases = vec![
        ("1 + 1", 2.0),
        ("100 - 50 - 20", 30.0),
        ("10 / 4", 2.5),
        ("2 * 3.5", 7.0),
        ("7 % 4", 3.0),
        ("2 ** 10", 1024.0),
        ("1 + 2 * 3", 7.0),
        ("(1 + 2) * 3", 9.0),
        ("-5 + 10", 5.0),
        ("2 + -1", 1.0),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Number(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_hex_equals_decimal() {
    assert_eq!(eval("0xFF").unwrap(), Value::Number(255.0));
    assert_eq!(eval("0xFF == 255").unwrap(), Value::Bool(true));
}

#[test]
fn test_division_by_zero_is_infinite() {
    match eval("1 / 0").unwrap() {
        Value::Number(n) => assert!(n.is_infinite() && n > 0.0),
        other => panic!("expected a number, got {:?}", other),
    }
}

#[test]
fn test_left_associativity_of_non_commutative_operators() {
    let test_cases = vec![
        ("100 - 50 - 20", 30.0),
        ("24 / 4 / 2", 3.0),
        ("100 % 7 % 4", 2.0),
        ("2 ** 3 ** 2", 64.0),
        ("1 << 2 << 3", 32.0),
        ("1024 >> 2 >> 3", 32.0),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Number(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_parenthesised_subtrees_stay_opaque() {
    // re-association must not reach through parentheses
    assert_eq!(eval("100 - (50 - 20)").unwrap(), Value::Number(70.0));
    assert_eq!(eval("(2 + 2) * 3").unwrap(), Value::Number(12.0));
}

#[test]
fn test_bitwise_operators() {
    let test_cases = vec![
        ("6 & 3", 2.0),
        ("6 | 3", 7.0),
        ("6 ^ 3", 5.0),
        ("1 << 4", 16.0),
        ("256 >> 4", 16.0),
        ("~5", -6.0),
        ("6.9 & 3", 2.0), // operands truncate to integers
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Number(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_prefix_operators() {
    assert_eq!(eval("-7").unwrap(), Value::Number(-7.0));
    assert_eq!(eval("!true").unwrap(), Value::Bool(false));
    assert_eq!(eval("!false").unwrap(), Value::Bool(true));
    assert_eq!(eval("-(1 + 2)").unwrap(), Value::Number(-3.0));
}

// ============================================================================
// String behaviour
// ============================================================================

#[test]
fn test_string_concatenation() {
    let test_cases = vec![
        ("'foo' + 'bar'", "foobar"),
        ("'foo' + 1", "foo1"),
        ("2 + 'nd'", "2nd"),
        ("2.5 + 'x'", "2.5x"),
        ("'is ' + true", "is true"),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Str(expected.to_string()),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_string_ordering_is_lexicographic() {
    assert_eq!(eval("'abc' < 'abd'").unwrap(), Value::Bool(true));
    assert_eq!(eval("'b' > 'a'").unwrap(), Value::Bool(true));
    assert_eq!(eval("'a' >= 'a'").unwrap(), Value::Bool(true));
}

// ============================================================================
// Comparison and equality
// ============================================================================

#[test]
fn test_comparisons() {
    let test_cases = vec![
        ("(2 > 1) && (3 < 5)", true),
        ("10 >= 10", true),
        ("10 <= 9", false),
        ("1 == 1.0", true),
        ("1 != 2", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Bool(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_equality_across_kinds_is_inequality() {
    assert_eq!(eval("1 == '1'").unwrap(), Value::Bool(false));
    assert_eq!(eval("true == 1").unwrap(), Value::Bool(false));
    assert_eq!(eval("1 != '1'").unwrap(), Value::Bool(true));
}

#[test]
fn test_in_operator() {
    let test_cases = vec![
        ("1 in (1, 2, 3)", true),
        ("4 in (1, 2, 3)", false),
        ("'b' in ('a', 'b')", true),
        ("1 IN (2, 1)", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Bool(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_in_against_parameter_array() {
    let env = params(vec![("list", Value::from(vec![1.0, 2.0, 3.0]))]);
    assert_eq!(eval_with("2 in list", &env).unwrap(), Value::Bool(true));
    assert_eq!(eval_with("9 in list", &env).unwrap(), Value::Bool(false));
}

// ============================================================================
// Regex
// ============================================================================

#[test]
fn test_regex_match() {
    assert_eq!(eval("'foo' =~ 'f.o'").unwrap(), Value::Bool(true));
    assert_eq!(eval("'foo' !~ 'f.o'").unwrap(), Value::Bool(false));
    assert_eq!(eval("'bar' =~ 'f.o'").unwrap(), Value::Bool(false));
}

#[test]
fn test_precompiled_and_dynamic_patterns_agree() {
    // the left expression compiles its pattern at parse time, the right one
    // at evaluation time; results must match
    let env = params(vec![("pat", Value::from("f.o"))]);

    for subject in ["foo", "fao", "bar", "f.o"] {
        let constant = eval(&format!("'{}' =~ 'f.o'", subject)).unwrap();
        let dynamic = eval_with(&format!("'{}' =~ pat", subject), &env).unwrap();
        assert_eq!(constant, dynamic, "Mismatch for subject: {}", subject);
    }
}

#[test]
fn test_dynamic_pattern_compile_failure() {
    let env = params(vec![("pat", Value::from("[abc"))]);
    let err = eval_with("'foo' =~ pat", &env).unwrap_err();
    assert!(err.to_string().contains("Unable to compile regexp pattern"));
}

// ============================================================================
// Logic, ternary, coalescing
// ============================================================================

#[test]
fn test_logical_operators() {
    let test_cases = vec![
        ("true && true", true),
        ("true && false", false),
        ("false || true", true),
        ("false || false", false),
        ("!(true && false)", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Bool(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_short_circuits_skip_dead_branch_errors() {
    // the right side would be a type error if evaluated
    assert_eq!(eval("false && ('x' > 1)").unwrap(), Value::Bool(false));
    assert_eq!(eval("true || ('x' > 1)").unwrap(), Value::Bool(true));

    // the dead ternary branch references a missing parameter
    assert_eq!(
        eval_with("true ? 'yes' : missing", &HashMap::new()).unwrap(),
        Value::Str("yes".to_string())
    );
    assert_eq!(
        eval_with("false ? missing : 'no'", &HashMap::new()).unwrap(),
        Value::Str("no".to_string())
    );
}

#[test]
fn test_ternary() {
    assert_eq!(eval("10 > 5 ? 'yes' : 'no'").unwrap(), Value::Str("yes".to_string()));
    assert_eq!(eval("10 < 5 ? 'yes' : 'no'").unwrap(), Value::Str("no".to_string()));
    assert_eq!(eval("true ? 1").unwrap(), Value::Number(1.0));
    assert_eq!(eval("false ? 1").unwrap(), Value::Null);
}

#[test]
fn test_coalesce() {
    let env = params(vec![("some", Value::from(1.0)), ("none", Value::Null)]);
    assert_eq!(eval_with("some ?? 2", &env).unwrap(), Value::Number(1.0));
    assert_eq!(eval_with("none ?? 2", &env).unwrap(), Value::Number(2.0));
    assert_eq!(
        eval_with("none ?? none ?? 3", &env).unwrap(),
        Value::Number(3.0)
    );
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_parameter_lookup() {
    let env = params(vec![("foo", Value::from(2.0))]);
    assert_eq!(eval_with("foo + 1", &env).unwrap(), Value::Number(3.0));
}

#[test]
fn test_bracketed_parameter_lookup() {
    let env = params(vec![("response time", Value::from(120.0))]);
    assert_eq!(
        eval_with("[response time] > 100", &env).unwrap(),
        Value::Bool(true)
    );
}

#[test]
fn test_missing_parameter() {
    let err = eval_with("missing", &HashMap::new()).unwrap_err();
    assert!(
        err.to_string().contains("No parameter 'missing' found"),
        "got '{}'",
        err
    );
}

#[test]
fn test_elision_matches_runtime_evaluation() {
    // the constant expression folds at plan time; the parameterised one
    // takes the full runtime path. Both must agree.
    let env = params(vec![
        ("a", Value::from(2.0)),
        ("b", Value::from(3.0)),
        ("c", Value::from(4.0)),
    ]);

    let test_cases = vec![
        ("2 + 3 * 4", "a + b * c"),
        ("2 - 3 - 4", "a - b - c"),
        ("2 ** 3 ** 4", "a ** b ** c"),
        ("(2 > 3) || (3 < 4)", "(a > b) || (b < c)"),
    ];

    for (constant, parameterised) in test_cases {
        assert_eq!(
            eval(constant).unwrap(),
            eval_with(parameterised, &env).unwrap(),
            "Mismatch between '{}' and '{}'",
            constant,
            parameterised
        );
    }
}

// ============================================================================
// Time literals
// ============================================================================

#[test]
fn test_time_comparisons_are_chronological() {
    let test_cases = vec![
        ("'2014-01-02' > '2014-01-01'", true),
        ("'2014-01-01' < '2014-01-01 00:00:01'", true),
        ("'2014-01-02' == '2014-01-02'", true),
        ("'2014-01-02 10:00' >= '2014-01-02 09:59:59'", true),
    ];

    for (input, expected) in test_cases {
        assert_eq!(
            eval(input).unwrap(),
            Value::Bool(expected),
            "Failed for input: {}",
            input
        );
    }
}

#[test]
fn test_time_arithmetic_in_unix_seconds() {
    assert_eq!(
        eval("'2014-01-02 12:00:00' - '2014-01-02 11:00:00'").unwrap(),
        Value::Number(3600.0)
    );
    assert_eq!(
        eval("'2014-01-02' + 86400 == '2014-01-03'").unwrap(),
        Value::Bool(true)
    );
}

// ============================================================================
// Functions
// ============================================================================

fn sample_functions() -> HashMap<String, ExpressionFunction> {
    let mut functions: HashMap<String, ExpressionFunction> = HashMap::new();
    functions.insert(
        "double".to_string(),
        Arc::new(|args: &[Value]| {
            let n = args[0]
                .as_number()
                .ok_or_else(|| EvalError::custom("double wants a number"))?;
            Ok(Value::Number(n * 2.0))
        }),
    );
    functions.insert(
        "count".to_string(),
        Arc::new(|args: &[Value]| Ok(Value::Number(args.len() as f64))),
    );
    functions.insert(
        "fail".to_string(),
        Arc::new(|_args: &[Value]| Err(EvalError::custom("Huge problems"))),
    );
    functions
}

#[test]
fn test_function_calls() {
    let functions = sample_functions();

    let expr = Expression::with_functions("double(21)", &functions).unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(42.0));

    let expr = Expression::with_functions("double(10) + 1", &functions).unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(21.0));

    let expr = Expression::with_functions("count()", &functions).unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(0.0));

    let expr = Expression::with_functions("count(1, 2, 3)", &functions).unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(3.0));

    // nested calls
    let expr = Expression::with_functions("double(double(10))", &functions).unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(40.0));
}

#[test]
fn test_function_argument_expressions() {
    let functions = sample_functions();
    let env = params(vec![("foo", Value::from(20.0))]);

    let expr = Expression::with_functions("double(foo + 1)", &functions).unwrap();
    assert_eq!(expr.evaluate(&env).unwrap(), Value::Number(42.0));
}

#[test]
fn test_function_errors_propagate() {
    let functions = sample_functions();
    let expr = Expression::with_functions("fail()", &functions).unwrap();
    let err = expr.evaluate(&()).unwrap_err();
    assert!(err.to_string().contains("Huge problems"));
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_accessor_fields() {
    let env = foo_params();
    assert_eq!(
        eval_with("foo.String", &env).unwrap(),
        Value::Str("string!".to_string())
    );
    assert_eq!(eval_with("foo.Int", &env).unwrap(), Value::Number(101.0));
    assert_eq!(
        eval_with("foo.Nested.Funk", &env).unwrap(),
        Value::Str("funkalicious".to_string())
    );
    assert_eq!(eval_with("foo.Int + 1", &env).unwrap(), Value::Number(102.0));
}

#[test]
fn test_accessor_methods() {
    let env = foo_params();
    assert_eq!(
        eval_with("foo.Func()", &env).unwrap(),
        Value::Str("funk".to_string())
    );
    assert_eq!(
        eval_with("foo.FuncArgStr('boop')", &env).unwrap(),
        Value::Str("boop".to_string())
    );
    assert_eq!(
        eval_with("foo.Nested.Dunk('uh')", &env).unwrap(),
        Value::Str("uhdunk".to_string())
    );
    assert_eq!(
        eval_with("foo.Sum(3, 1.5)", &env).unwrap(),
        Value::Number(4.5)
    );
}

#[test]
fn test_accessor_result_in_larger_expression() {
    let env = foo_params();
    assert_eq!(
        eval_with("foo.Func() == 'funk'", &env).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        eval_with("foo.FuncArgStr('a') + 'b'", &env).unwrap(),
        Value::Str("ab".to_string())
    );
}

#[test]
fn test_accessor_failures() {
    let env = foo_params();

    let test_cases = vec![
        ("foo.NotExists", "No method or field"),
        ("foo.NotExist()", "No method or field"),
        ("foo.Nested.NotExists", "No method or field"),
        ("foo.AlwaysFail()", "function should always fail"),
        ("foo.FuncArgStr()", "Too few arguments to parameter call"),
        (
            "foo.FuncArgStr('foo', 'bar')",
            "Too many arguments to parameter call",
        ),
        ("foo.FuncArgStr(5)", "Argument type conversion failed"),
        ("foo.String.Length", "is not a host object"),
    ];

    for (input, expected) in test_cases {
        let err = eval_with(input, &env).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "Failed for input {}: got '{}', expected '{}'",
            input,
            err,
            expected
        );
    }
}

// ============================================================================
// Type errors
// ============================================================================

#[test]
fn test_type_mismatch_errors() {
    let env = params(vec![("str", Value::from("x")), ("num", Value::from(1.0))]);

    let test_cases = vec![
        ("1 - 'x'", "cannot be used with the modifier"),
        ("'x' * 2", "cannot be used with the modifier"),
        ("1 & 'x'", "cannot be used with the modifier"),
        ("'x' ** 2", "cannot be used with the modifier"),
        ("1 < 'foo'", "cannot be used with the comparator"),
        ("'foo' >= 1", "cannot be used with the comparator"),
        ("1 in 2", "cannot be used with the comparator"),
        ("1 && true", "cannot be used with the logical operator"),
        ("false || 'x'", "cannot be used with the logical operator"),
        ("'str' ? 1 : 2", "cannot be used with the ternary operator"),
        ("str ? 1 : 2", "cannot be used with the ternary operator"),
        // prefixes admit no literal strings, so the operand arrives as a
        // parameter
        ("!str", "cannot be used with the prefix"),
        ("~str", "cannot be used with the prefix"),
        ("-str", "cannot be used with the prefix"),
    ];

    for (input, expected) in test_cases {
        let err = eval_with(input, &env).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "Failed for input {}: got '{}', expected '{}'",
            input,
            err,
            expected
        );
    }
}

#[test]
fn test_failed_fold_reports_at_evaluation_time() {
    // 'foo' - 1 parses fine; the error belongs to evaluation
    let expr = Expression::new("'foo' - 1").unwrap();
    let err = expr.evaluate(&()).unwrap_err();
    assert!(err.to_string().contains("cannot be used with the modifier"));
}

// ============================================================================
// Precedence interactions
// ============================================================================

#[test]
fn test_comparators_bind_tighter_than_logical_operators() {
    assert_eq!(eval("1 < 2 && 3 > 2").unwrap(), Value::Bool(true));
    assert_eq!(eval("false && false || true").unwrap(), Value::Bool(true));
    assert_eq!(eval("1 + 2 == 3").unwrap(), Value::Bool(true));
    assert_eq!(eval("10 % 3 == 1").unwrap(), Value::Bool(true));
}

#[test]
fn test_bitwise_binds_tighter_than_comparison() {
    assert_eq!(eval("2 & 1 == 0").unwrap(), Value::Bool(true));
    assert_eq!(eval("(1 | 2) == 3").unwrap(), Value::Bool(true));
}

#[test]
fn test_additive_binds_tighter_than_shift() {
    assert_eq!(eval("1 << 2 + 3").unwrap(), Value::Number(32.0));
    assert_eq!(eval("48 >> 1 + 2").unwrap(), Value::Number(6.0));
}

#[test]
fn test_ternary_branches_take_whole_subexpressions() {
    assert_eq!(eval("true ? 1 : 2 + 5").unwrap(), Value::Number(1.0));
    assert_eq!(eval("false ? 1 : 2 + 5").unwrap(), Value::Number(7.0));
}

#[test]
fn test_same_precedence_comparator_chain_reassociates() {
    // parsed right-recursively, evaluated left-to-right
    assert_eq!(eval("2 > 1 == true").unwrap(), Value::Bool(true));
    assert_eq!(eval("'a' =~ 'a' == true").unwrap(), Value::Bool(true));
}

// ============================================================================
// Accessors and functions composed
// ============================================================================

#[test]
fn test_accessor_as_function_argument() {
    let functions = sample_functions();
    let expr = Expression::with_functions("double(foo.Int)", &functions).unwrap();
    assert_eq!(expr.evaluate(&foo_params()).unwrap(), Value::Number(202.0));
}

#[test]
fn test_accessor_concatenation() {
    assert_eq!(
        eval_with("'Mr. ' + foo.String", &foo_params()).unwrap(),
        Value::Str("Mr. string!".to_string())
    );
}

#[test]
fn test_accessor_field_in_condition() {
    let env = foo_params();
    assert_eq!(
        eval_with("foo.BoolFalse ? 'on' : 'off'", &env).unwrap(),
        Value::Str("off".to_string())
    );
    assert_eq!(eval_with("!foo.BoolFalse", &env).unwrap(), Value::Bool(true));
}

#[test]
fn test_more_type_failures() {
    let test_cases = vec![
        ("true + 1", "cannot be used with the modifier"),
        ("true > 1", "cannot be used with the comparator"),
        ("'foo' && true", "cannot be used with the logical operator"),
        ("1 =~ 'x'", "cannot be used with the comparator"),
        ("'foo' =~ 1", "cannot be used with the comparator"),
        ("1 ? 2 : 3", "cannot be used with the ternary operator"),
    ];

    for (input, expected) in test_cases {
        let err = eval(input).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "Failed for input {}: got '{}', expected '{}'",
            input,
            err,
            expected
        );
    }
}

#[test]
fn test_mixed_membership_list() {
    assert_eq!(eval("'x' in (1, 'x', true)").unwrap(), Value::Bool(true));
    assert_eq!(eval("false in (1, 'x', true)").unwrap(), Value::Bool(false));
}

// ============================================================================
// End-to-end scenarios
// ============================================================================

#[test]
fn test_reference_scenarios() {
    // the canonical end-to-end table
    assert_eq!(eval("1 + 1").unwrap(), Value::Number(2.0));
    assert_eq!(
        eval_with("foo + 1", &params(vec![("foo", Value::from(2.0))])).unwrap(),
        Value::Number(3.0)
    );
    assert_eq!(eval("(2 > 1) && (3 < 5)").unwrap(), Value::Bool(true));
    assert_eq!(eval("'foo' =~ 'f.o'").unwrap(), Value::Bool(true));
    assert_eq!(
        eval_with("foo.Func()", &foo_params()).unwrap(),
        Value::Str("funk".to_string())
    );
    assert_eq!(eval("10 > 5 ? 'yes' : 'no'").unwrap(), Value::Str("yes".to_string()));
    assert_eq!(eval("100 - 50 - 20").unwrap(), Value::Number(30.0));
}
