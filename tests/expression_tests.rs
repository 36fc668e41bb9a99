// tests/expression_tests.rs
//
// Public-contract invariants: text round-trips, referenced-variable
// reporting, token access, and cross-thread sharing of compiled
// expressions.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use nutmeg_lang::{Expression, Token, TokenKind, TokenValue, Value};

fn params(pairs: Vec<(&str, Value)>) -> HashMap<String, Value> {
    pairs
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

// ============================================================================
// Display round-trip
// ============================================================================

#[test]
fn test_to_string_returns_input_verbatim() {
    let test_cases = vec![
        "1 + 1",
        "foo  ==  'bar'",
        "(2 > 1) && (3 < 5)",
        "[response time] > 100",
        "10 > 5 ? 'yes' : 'no'",
    ];

    for input in test_cases {
        let expr = Expression::new(input).unwrap();
        assert_eq!(expr.to_string(), input, "Failed for input: {}", input);
    }
}

#[test]
fn test_from_tokens_has_empty_text() {
    let tokens = vec![Token::new(TokenKind::Numeric, TokenValue::Number(1.0))];
    let expr = Expression::from_tokens(tokens).unwrap();
    assert_eq!(expr.to_string(), "");
}

// ============================================================================
// vars()
// ============================================================================

#[test]
fn test_vars_reports_referenced_names() {
    let test_cases = vec![
        ("1 + 1", vec![]),
        ("foo + 1", vec!["foo"]),
        ("foo + bar", vec!["foo", "bar"]),
        ("foo + foo", vec!["foo"]),
        ("[foo bar] > 10", vec!["foo bar"]),
        ("foo.Bar.Baz + 1", vec!["foo"]),
        ("foo + foo.Bar", vec!["foo"]),
        ("a ? b : c", vec!["a", "b", "c"]),
    ];

    for (input, expected) in test_cases {
        let expr = Expression::new(input).unwrap();
        let expected: Vec<String> = expected.into_iter().map(String::from).collect();
        assert_eq!(expr.vars(), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_vars_excludes_function_names() {
    use nutmeg_lang::ExpressionFunction;

    let mut functions: HashMap<String, ExpressionFunction> = HashMap::new();
    functions.insert(
        "double".to_string(),
        Arc::new(|args: &[Value]| Ok(args[0].clone())),
    );

    let expr = Expression::with_functions("double(foo)", &functions).unwrap();
    assert_eq!(expr.vars(), vec!["foo".to_string()]);
}

// ============================================================================
// tokens()
// ============================================================================

#[test]
fn test_tokens_are_exposed() {
    let expr = Expression::new("1 + 1").unwrap();
    let kinds: Vec<TokenKind> = expr.tokens().iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Numeric, TokenKind::Modifier, TokenKind::Numeric]
    );
}

#[test]
fn test_expression_from_own_tokens_evaluates_identically() {
    let source = Expression::new("10 * (2 + 2)").unwrap();
    let rebuilt = Expression::from_tokens(source.tokens().to_vec()).unwrap();

    assert_eq!(
        source.evaluate(&()).unwrap(),
        rebuilt.evaluate(&()).unwrap()
    );
}

// ============================================================================
// Reuse and sharing
// ============================================================================

#[test]
fn test_expression_reuse_across_environments() {
    let expr = Expression::new("threshold > 10").unwrap();

    assert_eq!(
        expr.evaluate(&params(vec![("threshold", Value::from(20.0))]))
            .unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        expr.evaluate(&params(vec![("threshold", Value::from(5.0))]))
            .unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_compiled_expression_is_shareable_between_threads() {
    let expr = Arc::new(Expression::new("foo * 2").unwrap());

    let handles: Vec<_> = (1..=4)
        .map(|i| {
            let expr = Arc::clone(&expr);
            thread::spawn(move || {
                let env = params(vec![("foo", Value::from(i as f64))]);
                expr.evaluate(&env).unwrap()
            })
        })
        .collect();

    let results: Vec<Value> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        results,
        vec![
            Value::Number(2.0),
            Value::Number(4.0),
            Value::Number(6.0),
            Value::Number(8.0),
        ]
    );
}

#[test]
fn test_evaluate_map_convenience() {
    let expr = Expression::new("foo + 1").unwrap();
    let env = params(vec![("foo", Value::from(41.0))]);
    assert_eq!(expr.evaluate_map(&env).unwrap(), Value::Number(42.0));
}

#[test]
fn test_empty_clause_evaluates_to_null() {
    let expr = Expression::new("()").unwrap();
    assert_eq!(expr.evaluate(&()).unwrap(), Value::Null);
}
