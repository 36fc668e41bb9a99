//! An embeddable expression language.
//!
//! A short textual expression — arithmetic, logical, comparison, regex,
//! ternary, function calls, and field/method access over host-supplied
//! values — is compiled once into an immutable evaluation tree, then
//! evaluated any number of times against a named-parameter environment.
//!
//! ```
//! use nutmeg_lang::{Expression, Value};
//!
//! let expr = Expression::new("(2 > 1) && (3 < 5)").unwrap();
//! assert_eq!(expr.evaluate(&()).unwrap(), Value::Bool(true));
//! ```
//!
//! Compilation is a fixed pipeline: the lexer tokenises the text, a
//! transition-table validator rejects malformed sequences, constant regex
//! operands are precompiled, a chain of precedence functions plans the
//! tokens into a stage tree, same-precedence chains are re-associated to
//! the left, and constant subtrees are folded. Parse problems surface as
//! [`ParseError`] from the constructors; value-dependent problems surface
//! as [`EvalError`] from [`Expression::evaluate`].

pub mod accessor;
pub mod ast;
pub mod evaluator;
pub mod expression;
pub mod lexer;
pub mod params;
mod planner;
mod stream;
pub mod syntax;
pub mod value;

pub use accessor::{HostObject, MethodArg, ParamKind};
pub use ast::tokens::{Token, TokenKind, TokenValue};
pub use evaluator::{EvalError, ExpressionFunction};
pub use expression::{Expression, ParseError};
pub use lexer::LexError;
pub use params::Parameters;
pub use syntax::SyntaxError;
pub use value::Value;
