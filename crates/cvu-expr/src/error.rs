//! Error types for parsing and evaluating expressions.
//!
//! Parse errors and evaluation errors are separate channels:
//! [`ExprParseError`] always carries the offending token, while
//! [`EvalError`] comes from the host's lookup and call callbacks.

use thiserror::Error;

use crate::token::Token;

/// A failure to tokenize or parse expression source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprParseError {
    /// A token was found where an expression had to start.
    #[error("Expected Expression and found {0} instead at character:{col}", col = .0.column)]
    ExpectedExpression(Token),

    /// A specific punctuation character was required.
    #[error("Expected Character {0} and found {1} instead at character:{col}", col = .1.column)]
    ExpectedCharacter(char, Token),

    /// A token is not valid at this point of the grammar.
    #[error("Unexpected Token and found {0} instead at character:{col}", col = .0.column)]
    UnexpectedToken(Token),

    /// A string literal was not closed before the end of input.
    #[error("Missing quote at character:{col}", col = .0.column)]
    MissingQuoteClose(Token),

    /// A conditional is missing its `:` branch.
    #[error("Expected Condition Else and found {0} instead at character:{col}", col = .0.column)]
    ExpectedConditionElse(Token),

    /// A call argument list is malformed.
    #[error("Expected Argument List and found {0} instead at character:{col}", col = .0.column)]
    ExpectedArgumentList(Token),

    /// A name was required after `.`.
    #[error("Expected Identifier and found {0} instead at character:{col}", col = .0.column)]
    ExpectedIdentifier(Token),
}

impl ExprParseError {
    /// Returns the token the error points at.
    #[must_use]
    pub const fn token(&self) -> &Token {
        match self {
            Self::ExpectedExpression(t)
            | Self::ExpectedCharacter(_, t)
            | Self::UnexpectedToken(t)
            | Self::MissingQuoteClose(t)
            | Self::ExpectedConditionElse(t)
            | Self::ExpectedArgumentList(t)
            | Self::ExpectedIdentifier(t) => t,
        }
    }
}

/// A runtime failure raised by the host during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A variable chain could not be resolved.
    #[error("lookup failed: {message}")]
    Lookup {
        /// Description of the failure.
        message: String,
    },

    /// A call failed while executing.
    #[error("call failed: {message}")]
    Exec {
        /// Description of the failure.
        message: String,
    },

    /// No function or method with this name exists.
    #[error("unknown function: {name}")]
    UnknownFunction {
        /// Name as written in the expression.
        name: String,
    },

    /// A function received arguments it cannot use.
    #[error("invalid arguments for {name}: {message}")]
    InvalidArguments {
        /// Function name.
        name: String,
        /// What was wrong.
        message: String,
    },
}

/// Failure of [`Expression::evaluate`](crate::expression::Expression::evaluate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    /// The expression text does not parse.
    #[error("invalid expression `{expression}`: {error}")]
    Parse {
        /// The expression source.
        expression: String,
        /// Underlying parse error.
        #[source]
        error: ExprParseError,
    },

    /// The expression parsed but the host failed while evaluating it.
    #[error(transparent)]
    Eval(#[from] EvalError),
}
