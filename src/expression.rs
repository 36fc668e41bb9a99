use std::collections::HashMap;
use std::fmt;

use crate::ast::stages::EvaluationStage;
use crate::ast::tokens::{Token, TokenKind, TokenValue};
use crate::evaluator::{self, EvalError, ExpressionFunction};
use crate::lexer::{self, LexError};
use crate::params::Parameters;
use crate::planner;
use crate::syntax::{self, SyntaxError};
use crate::value::Value;

/// Errors reported while constructing an expression.
///
/// These are fatal for the expression: no stage tree is produced, and
/// nothing can be evaluated. Problems that depend on parameter values are
/// reported later, by [`Expression::evaluate`], as [`EvalError`]s.
#[derive(Debug, Clone)]
pub enum ParseError {
    /// The expression text could not be tokenised
    Lex(LexError),
    /// The token sequence is malformed
    Syntax(SyntaxError),
    /// A constant regex operand failed to compile
    BadPattern { pattern: String, detail: String },
    /// A validated token could not be planned; only reachable through the
    /// token-list constructor
    Unplannable { kind: TokenKind, value: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Lex(error) => write!(f, "{}", error),
            ParseError::Syntax(error) => write!(f, "{}", error),
            ParseError::BadPattern { pattern, detail } => {
                write!(f, "Unable to compile regexp pattern '{}': {}", pattern, detail)
            }
            ParseError::Unplannable { kind, value } => {
                write!(f, "Unable to plan token kind: '{}', value: '{}'", kind, value)
            }
        }
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(error: LexError) -> ParseError {
        ParseError::Lex(error)
    }
}

impl From<SyntaxError> for ParseError {
    fn from(error: SyntaxError) -> ParseError {
        ParseError::Syntax(error)
    }
}

/// A compiled expression, ready to evaluate against parameters.
///
/// Compilation runs the whole pipeline — lexing, syntax validation, regex
/// precompilation, stage planning, re-association and constant folding —
/// once, up front. The result is immutable: `evaluate` reads the planned
/// tree and writes nowhere but its own stack, so a compiled expression can
/// be shared freely between threads.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use nutmeg_lang::{Expression, Value};
///
/// let expr = Expression::new("foo + 1").unwrap();
///
/// let mut params = HashMap::new();
/// params.insert("foo".to_string(), Value::Number(2.0));
///
/// assert_eq!(expr.evaluate(&params).unwrap(), Value::Number(3.0));
/// ```
pub struct Expression {
    input: String,
    tokens: Vec<Token>,
    root: Option<Box<EvaluationStage>>,
}

impl Expression {
    /// Compiles an expression with no registered functions.
    pub fn new(expression: &str) -> Result<Expression, ParseError> {
        Expression::with_functions(expression, &HashMap::new())
    }

    /// Compiles an expression, resolving identifiers found in `functions`
    /// into callable function tokens.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use std::sync::Arc;
    /// use nutmeg_lang::{EvalError, Expression, ExpressionFunction, Value};
    ///
    /// let mut functions: HashMap<String, ExpressionFunction> = HashMap::new();
    /// functions.insert(
    ///     "double".to_string(),
    ///     Arc::new(|args: &[Value]| {
    ///         let n = args[0].as_number().ok_or_else(|| EvalError::custom("not a number"))?;
    ///         Ok(Value::Number(n * 2.0))
    ///     }),
    /// );
    ///
    /// let expr = Expression::with_functions("double(21)", &functions).unwrap();
    /// assert_eq!(expr.evaluate(&()).unwrap(), Value::Number(42.0));
    /// ```
    pub fn with_functions(
        expression: &str,
        functions: &HashMap<String, ExpressionFunction>,
    ) -> Result<Expression, ParseError> {
        let tokens = lexer::tokenize(expression, functions)?;
        Expression::build(expression.to_string(), tokens)
    }

    /// Builds an expression from an explicit token list, skipping the
    /// lexer. The tokens still go through syntax validation (including the
    /// payload checks the lexer makes unreachable), regex precompilation
    /// and planning.
    pub fn from_tokens(tokens: Vec<Token>) -> Result<Expression, ParseError> {
        Expression::build(String::new(), tokens)
    }

    fn build(input: String, tokens: Vec<Token>) -> Result<Expression, ParseError> {
        syntax::check_balance(&tokens)?;
        syntax::check_syntax(&tokens)?;

        let tokens = planner::precompile_patterns(tokens)?;
        let root = planner::plan_stages(&tokens)?;

        Ok(Expression {
            input,
            tokens,
            root,
        })
    }

    /// Evaluates the expression against the given parameters, producing a
    /// single value or an evaluation error. The parameters are only read,
    /// and are not retained.
    pub fn evaluate(&self, parameters: &dyn Parameters) -> Result<Value, EvalError> {
        match &self.root {
            Some(root) => evaluator::evaluate_stage(root, parameters),
            None => Ok(Value::Null),
        }
    }

    /// Convenience for the common flat-map environment.
    pub fn evaluate_map(
        &self,
        parameters: &HashMap<String, Value>,
    ) -> Result<Value, EvalError> {
        self.evaluate(parameters)
    }

    /// The tokens this expression was compiled from, after regex
    /// precompilation.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The names of all parameters the expression references — bare
    /// identifiers, bracketed variables and accessor roots — in order of
    /// first appearance, without duplicates.
    pub fn vars(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();

        for token in &self.tokens {
            let name = match (&token.kind, &token.value) {
                (TokenKind::Variable, Some(TokenValue::Ident(name))) => name,
                (TokenKind::Accessor, Some(TokenValue::Accessor(path))) => &path[0],
                _ => continue,
            };
            if !names.iter().any(|existing| existing == name) {
                names.push(name.clone());
            }
        }

        names
    }
}

/// Renders the original expression text exactly as provided. Expressions
/// built from explicit tokens have no text and render empty.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.input)
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("input", &self.input)
            .field("tokens", &self.tokens.len())
            .finish()
    }
}
