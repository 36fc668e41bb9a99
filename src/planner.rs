//! Turns a validated token list into an executable stage tree.
//!
//! Four passes live here. `precompile_patterns` compiles constant regex
//! operands once, at parse time. `plan_tokens` runs a chain of precedence
//! functions, one per operator level, each parsing its operands by
//! delegating to the next-tighter level; same-precedence chains come out
//! right-leaning. `reorder_stages` rebuilds those chains left-associative,
//! and `elide_literals` folds constant subtrees.

use std::sync::Arc;

use regex::Regex;

use crate::ast::operators::{self, OpSymbol};
use crate::ast::stages::{type_checks_for, EvaluationStage, OperatorClass, StageOperator};
use crate::ast::tokens::{Token, TokenKind, TokenValue};
use crate::evaluator;
use crate::expression::ParseError;
use crate::stream::TokenStream;
use crate::value::Value;

type PlanResult = Result<Option<Box<EvaluationStage>>, ParseError>;
type PlanFn = fn(&mut TokenStream) -> PlanResult;

/// Compiles the operand of a constant `=~` / `!~` into a `Pattern` token,
/// so the regex is built once rather than on every evaluation. Dynamic
/// operands keep compiling at evaluation time.
pub(crate) fn precompile_patterns(mut tokens: Vec<Token>) -> Result<Vec<Token>, ParseError> {
    for index in 0..tokens.len() {
        let is_regex_comparator = tokens[index].kind == TokenKind::Comparator
            && matches!(tokens[index].symbol(), Some("=~") | Some("!~"));
        if !is_regex_comparator {
            continue;
        }

        let next = index + 1;
        if next >= tokens.len() {
            continue;
        }
        if let Some(TokenValue::Str(source)) = &tokens[next].value {
            match Regex::new(source) {
                Ok(pattern) => {
                    tokens[next] = Token::new(
                        TokenKind::Pattern,
                        TokenValue::Pattern(Arc::new(pattern)),
                    );
                }
                Err(error) => {
                    return Err(ParseError::BadPattern {
                        pattern: source.clone(),
                        detail: error.to_string(),
                    })
                }
            }
        }
    }
    Ok(tokens)
}

/// Plans, reorders and folds. The result is `None` only for an empty token
/// list, which the validator has already ruled out for real expressions.
pub(crate) fn plan_stages(tokens: &[Token]) -> PlanResult {
    let mut stream = TokenStream::new(tokens);

    let stage = match plan_tokens(&mut stream)? {
        Some(stage) => stage,
        None => return Ok(None),
    };

    let stage = reorder_stages(stage);
    let stage = elide_literals(stage);
    Ok(Some(stage))
}

fn plan_tokens(stream: &mut TokenStream) -> PlanResult {
    if !stream.has_next() {
        return Ok(None);
    }
    plan_separator(stream)
}

/// The shared body of every simple precedence level: parse a left operand,
/// claim the next token if this level owns it, parse the right operand with
/// the level's right-hand precedent, and build the stage. Unclaimed tokens
/// are rewound for an outer level.
fn plan_precedence_level(
    stream: &mut TokenStream,
    symbols: fn(&str) -> Option<OpSymbol>,
    kinds: &[TokenKind],
    class: Option<OperatorClass>,
    right_precedent: PlanFn,
    left_precedent: Option<PlanFn>,
) -> PlanResult {
    let left = match left_precedent {
        Some(parse_left) => parse_left(stream)?,
        None => None,
    };

    if stream.has_next() {
        let token = stream.next();

        let symbol = if kinds.contains(&token.kind) {
            token.symbol().and_then(symbols)
        } else {
            None
        };

        match symbol {
            Some(symbol) => {
                let right = right_precedent(stream)?;
                let checks = type_checks_for(symbol);
                return Ok(Some(Box::new(EvaluationStage {
                    symbol,
                    left,
                    right,
                    operator: StageOperator::Builtin,
                    left_check: checks.left,
                    right_check: checks.right,
                    combined_check: checks.combined,
                    error_class: class,
                })));
            }
            None => stream.rewind(),
        }
    }

    Ok(left)
}

fn plan_separator(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::separator_symbol,
        &[TokenKind::Separator],
        None,
        plan_separator,
        Some(plan_ternary),
    )
}

fn plan_ternary(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::ternary_symbol,
        &[TokenKind::Ternary],
        Some(OperatorClass::Ternary),
        plan_ternary,
        Some(plan_logical_or),
    )
}

fn plan_logical_or(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::logical_or_symbol,
        &[TokenKind::LogicalOp],
        Some(OperatorClass::Logical),
        plan_logical_or,
        Some(plan_logical_and),
    )
}

fn plan_logical_and(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::logical_and_symbol,
        &[TokenKind::LogicalOp],
        Some(OperatorClass::Logical),
        plan_logical_and,
        Some(plan_comparator),
    )
}

fn plan_comparator(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::comparator_symbol,
        &[TokenKind::Comparator],
        Some(OperatorClass::Comparator),
        plan_comparator,
        Some(plan_bitwise),
    )
}

fn plan_bitwise(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::bitwise_symbol,
        &[TokenKind::Modifier],
        Some(OperatorClass::Modifier),
        plan_bitwise,
        Some(plan_shift),
    )
}

fn plan_shift(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::bitwise_shift_symbol,
        &[TokenKind::Modifier],
        Some(OperatorClass::Modifier),
        plan_shift,
        Some(plan_additive),
    )
}

fn plan_additive(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::additive_symbol,
        &[TokenKind::Modifier],
        Some(OperatorClass::Modifier),
        plan_additive,
        Some(plan_multiplicative),
    )
}

fn plan_multiplicative(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::multiplicative_symbol,
        &[TokenKind::Modifier],
        Some(OperatorClass::Modifier),
        plan_multiplicative,
        Some(plan_exponential),
    )
}

fn plan_exponential(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::exponential_symbol,
        &[TokenKind::Modifier],
        Some(OperatorClass::Modifier),
        plan_exponential,
        Some(plan_function),
    )
}

/// Prefix is right-only: it has no left operand and is entered from the
/// value layer when a prefix token is seen.
fn plan_prefix(stream: &mut TokenStream) -> PlanResult {
    plan_precedence_level(
        stream,
        operators::prefix_symbol,
        &[TokenKind::Prefix],
        Some(OperatorClass::Prefix),
        plan_function,
        None,
    )
}

/// Function calls bind tighter than any operator; the argument clause is
/// parsed by the layers below and arrives as this stage's right child.
fn plan_function(stream: &mut TokenStream) -> PlanResult {
    if !stream.has_next() {
        return Ok(None);
    }

    let token = stream.next().clone();
    if token.kind != TokenKind::Function {
        stream.rewind();
        return plan_accessor(stream);
    }

    let function = match token.value {
        Some(TokenValue::Function(_, function)) => function,
        _ => return Err(unplannable(&token)),
    };

    let right = plan_accessor(stream)?;

    Ok(Some(Box::new(EvaluationStage::with_right(
        OpSymbol::Functional,
        right,
        StageOperator::Function(function),
    ))))
}

/// An accessor is a value unless a clause follows it, in which case the
/// clause subtree becomes the method-call arguments.
fn plan_accessor(stream: &mut TokenStream) -> PlanResult {
    if !stream.has_next() {
        return Ok(None);
    }

    let token = stream.next().clone();
    if token.kind != TokenKind::Accessor {
        stream.rewind();
        return plan_value(stream);
    }

    let path = match token.value {
        Some(TokenValue::Accessor(path)) => path,
        _ => return Err(unplannable(&token)),
    };

    let mut right = None;
    if stream.has_next() {
        let next_kind = stream.next().kind;
        stream.rewind();
        if next_kind == TokenKind::Clause {
            right = plan_value(stream)?;
        }
    }

    Ok(Some(Box::new(EvaluationStage::with_right(
        OpSymbol::Access,
        right,
        StageOperator::Accessor(path),
    ))))
}

/// The bottom layer: literals, parameters, clauses, and the hand-off to the
/// prefix precedent.
fn plan_value(stream: &mut TokenStream) -> PlanResult {
    if !stream.has_next() {
        return Ok(None);
    }

    let token = stream.next().clone();

    match token.kind {
        TokenKind::Clause => {
            let inner = plan_tokens(stream)?;

            // the matching close is guaranteed by the balance check
            if stream.has_next() {
                stream.next();
            }

            // wrap the parenthesised subtree so reordering treats it as a
            // single opaque operand
            Ok(Some(Box::new(EvaluationStage::with_right(
                OpSymbol::Noop,
                inner,
                StageOperator::NoopRight,
            ))))
        }

        // an empty function argument list; nothing to plan
        TokenKind::ClauseClose => {
            stream.rewind();
            Ok(None)
        }

        TokenKind::Variable => match token.value {
            Some(TokenValue::Ident(name)) => Ok(Some(Box::new(EvaluationStage::leaf(
                OpSymbol::Value,
                StageOperator::Parameter(name),
            )))),
            _ => Err(unplannable(&token)),
        },

        TokenKind::Numeric | TokenKind::Str | TokenKind::Pattern | TokenKind::Boolean => {
            let value = match token.value {
                Some(TokenValue::Number(n)) => Value::Number(n),
                Some(TokenValue::Str(s)) => Value::Str(s),
                Some(TokenValue::Pattern(p)) => Value::Pattern(p),
                Some(TokenValue::Bool(b)) => Value::Bool(b),
                _ => return Err(unplannable(&token)),
            };
            Ok(Some(Box::new(EvaluationStage::leaf(
                OpSymbol::Literal,
                StageOperator::Literal(value),
            ))))
        }

        // times participate in arithmetic and comparison as their Unix
        // seconds; sub-second precision is dropped here
        TokenKind::Time => match token.value {
            Some(TokenValue::Time(time)) => Ok(Some(Box::new(EvaluationStage::leaf(
                OpSymbol::Literal,
                StageOperator::Literal(Value::Number(time.timestamp() as f64)),
            )))),
            _ => Err(unplannable(&token)),
        },

        TokenKind::Prefix => {
            stream.rewind();
            plan_prefix(stream)
        }

        _ => Err(unplannable(&token)),
    }
}

fn unplannable(token: &Token) -> ParseError {
    ParseError::Unplannable {
        kind: token.kind,
        value: token.value_display(),
    }
}

/// Rebuilds right-leaning chains of same-precedence stages into
/// left-associative form, so `a - b - c` means `(a - b) - c` even though
/// the level functions parse it right-recursively.
///
/// The run `s1 ⊕ (s2 ⊕ (... ⊕ tail))` along the right spine is collected
/// and re-threaded as `(((a ⊕ b) ⊕ c) ...) ⊕ tail`, keeping each stage's
/// operator, checks and error class with its original operand pair. `Noop`
/// wrappers sit at their own precedence, so parenthesised subtrees break
/// runs and are never re-associated with their surroundings.
fn reorder_stages(stage: Box<EvaluationStage>) -> Box<EvaluationStage> {
    let precedence = stage.symbol.precedence();

    // walk the right spine, collecting the run of stages at this precedence
    let mut chain: Vec<EvaluationStage> = Vec::new();
    let mut cursor = Some(stage);
    let mut tail: Option<Box<EvaluationStage>> = None;

    while let Some(mut current) = cursor.take() {
        if current.symbol.precedence() != precedence {
            tail = Some(reorder_stages(current));
            break;
        }

        current.left = current.left.take().map(reorder_stages);
        cursor = current.right.take();
        chain.push(*current);
    }

    // re-thread: each stage keeps its own props, operands shift one place
    // left, and the spine tail becomes the outermost right operand
    let mut drain = chain.into_iter();
    let mut node = drain.next().expect("reorder chain starts with its root");
    for mut frame in drain {
        node.right = frame.left.take();
        frame.left = Some(Box::new(node));
        node = frame;
    }
    node.right = tail;

    Box::new(node)
}

/// Folds constant subtrees bottom-up: a stage whose children are both
/// literals is evaluated now and replaced by the result, provided its type
/// checks and operator succeed. Failures keep the original subtree so the
/// error resurfaces at evaluation time with full context. Separator chains
/// and `in` operands stay structured.
fn elide_literals(mut stage: Box<EvaluationStage>) -> Box<EvaluationStage> {
    stage.left = stage.left.take().map(elide_literals);
    stage.right = stage.right.take().map(elide_literals);
    elide_stage(stage)
}

fn elide_stage(stage: Box<EvaluationStage>) -> Box<EvaluationStage> {
    if matches!(stage.symbol, OpSymbol::Separate | OpSymbol::In) {
        return stage;
    }

    let operands = match (&stage.left, &stage.right) {
        (Some(left), Some(right)) => match (left.literal_value(), right.literal_value()) {
            (Some(left_value), Some(right_value)) => {
                Some((left_value.clone(), right_value.clone()))
            }
            _ => None,
        },
        _ => None,
    };
    let (left_value, right_value) = match operands {
        Some(pair) => pair,
        None => return stage,
    };

    if evaluator::run_type_checks(&stage, &left_value, &right_value).is_err() {
        return stage;
    }

    match evaluator::apply_operator(stage.symbol, left_value, right_value) {
        Ok(result) => Box::new(EvaluationStage::leaf(
            OpSymbol::Literal,
            StageOperator::Literal(result),
        )),
        Err(_) => stage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn plan(input: &str) -> Box<EvaluationStage> {
        let tokens = crate::lexer::tokenize(input, &HashMap::new()).unwrap();
        let tokens = precompile_patterns(tokens).unwrap();
        plan_stages(&tokens).unwrap().unwrap()
    }

    #[test]
    fn test_constant_expression_folds_to_literal() {
        let stage = plan("1 + 2 * 3");
        assert_eq!(stage.literal_value(), Some(&Value::Number(7.0)));
    }

    #[test]
    fn test_parameter_blocks_folding() {
        let stage = plan("foo + 1");
        assert!(stage.literal_value().is_none());
        assert_eq!(stage.symbol, OpSymbol::Plus);
    }

    #[test]
    fn test_failed_fold_keeps_stage() {
        // a string minus a number cannot fold; the stage survives so the
        // type error surfaces at evaluation time
        let stage = plan("'foo' - 1");
        assert_eq!(stage.symbol, OpSymbol::Minus);
    }
}
