//! Expression source with a lazily built AST.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::arguments::Arguments;
use crate::ast::ExprNode;
use crate::error::{ExprParseError, ExpressionError};
use crate::host::Host;
use crate::interpreter::Interpreter;
use crate::parser::parse;
use crate::value::Value;

/// An expression as written in source, parsed on first use.
///
/// Clones share the parsed tree, so an expression stored in a definition
/// and handed out many times is parsed at most once.
#[derive(Clone)]
pub struct Expression {
    code: String,
    string_mode: bool,
    ast: Arc<OnceLock<Result<ExprNode, ExprParseError>>>,
}

impl Expression {
    /// A plain expression such as `a > 1 ? 'x' : 'y'`.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self::with_mode(code, false)
    }

    /// Interpolated text such as `Hello {name}`.
    #[must_use]
    pub fn string_mode(code: impl Into<String>) -> Self {
        Self::with_mode(code, true)
    }

    fn with_mode(code: impl Into<String>, string_mode: bool) -> Self {
        Self {
            code: code.into(),
            string_mode,
            ast: Arc::new(OnceLock::new()),
        }
    }

    /// The source text.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns `true` for interpolated text.
    #[must_use]
    pub const fn is_string_mode(&self) -> bool {
        self.string_mode
    }

    /// Returns `true` once the source has been parsed, successfully or not.
    #[must_use]
    pub fn is_parsed(&self) -> bool {
        self.ast.get().is_some()
    }

    /// Parses the source on first call and returns the cached result.
    ///
    /// # Errors
    ///
    /// Returns the parse error, which is cached like a successful tree.
    pub fn ast(&self) -> Result<&ExprNode, &ExprParseError> {
        self.ast
            .get_or_init(|| {
                debug!(code = %self.code, string_mode = self.string_mode, "parsing expression");
                parse(&self.code, self.string_mode)
            })
            .as_ref()
    }

    /// Evaluates the expression.
    ///
    /// # Errors
    ///
    /// Returns [`ExpressionError::Parse`] if the source does not parse and
    /// [`ExpressionError::Eval`] if the host fails.
    pub fn evaluate(&self, host: &dyn Host, arguments: &Arguments) -> Result<Value, ExpressionError> {
        let ast = self.ast().map_err(|error| ExpressionError::Parse {
            expression: self.code.clone(),
            error: error.clone(),
        })?;
        Ok(Interpreter::new(host, arguments).execute(ast)?)
    }
}

impl PartialEq for Expression {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.string_mode == other.string_mode
    }
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expression")
            .field("code", &self.code)
            .field("string_mode", &self.string_mode)
            .field("parsed", &self.is_parsed())
            .finish()
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}
