//! # cvu-expr
//!
//! The expression language embedded in CVU definitions.
//!
//! Handles:
//! - **Lexer**: Tokenization in plain or string-interpolation mode.
//! - **Parser**: Recursive descent into an [`ExprNode`](ast::ExprNode) tree.
//! - **Interpreter**: Tree-walking evaluation over an injected [`Host`](host::Host).
//! - **Expression**: Source text with a lazily parsed, shared AST.
//!
//! The engine never touches a data store itself. Every variable lookup and
//! function call is delegated to the host.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod arguments;
pub mod ast;
pub mod error;
pub mod expression;
pub mod host;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use arguments::Arguments;
pub use ast::{BinaryOp, ExprNode, Variable, VariableKind};
pub use error::{EvalError, ExprParseError, ExpressionError};
pub use expression::Expression;
pub use host::{FnHost, Host, MemoryHost};
pub use interpreter::Interpreter;
pub use value::Value;
