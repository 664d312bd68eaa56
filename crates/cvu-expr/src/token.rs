//! Tokens of the expression language.

use std::fmt;

use crate::value::format_number;

/// Infix and ternary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `?` starting a conditional.
    ConditionStart,
    /// `:` separating conditional branches.
    ConditionElse,
    /// `and` / `AND`.
    And,
    /// `or` / `OR`.
    Or,
    /// `=`.
    Equals,
    /// `!=`.
    NotEquals,
    /// `>`.
    GreaterThan,
    /// `>=`.
    GreaterThanOrEqual,
    /// `<`.
    LessThan,
    /// `<=`.
    LessThanOrEqual,
    /// `+`.
    Plus,
    /// `-`.
    Minus,
    /// `*`.
    Multiply,
    /// `/`.
    Divide,
}

impl Operator {
    /// Source spelling of the operator.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::ConditionStart => "?",
            Self::ConditionElse => ":",
            Self::And => "and",
            Self::Or => "or",
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// The kind and payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An operator.
    Operator(Operator),
    /// `true` or `false`.
    Bool(bool),
    /// `nil`.
    Nil,
    /// A bare name, possibly prefixed with `_`, `~` or `_~`.
    Identifier(String),
    /// A numeric literal.
    Number(f64),
    /// A quoted string, or a literal fragment in string mode.
    String(String),
    /// `!`.
    Negation,
    /// `,`.
    Comma,
    /// `(`.
    ParensOpen,
    /// `)`.
    ParensClose,
    /// `{`.
    CurlyBracketOpen,
    /// `}`.
    CurlyBracketClose,
    /// `[`.
    BracketOpen,
    /// `]`.
    BracketClose,
    /// `.`.
    Period,
    /// A character the lexer does not recognize.
    Other(String),
    /// End of input.
    Eof,
}

/// A token with its 1-based character column in the expression source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Kind and payload.
    pub kind: TokenKind,
    /// Column of the first character, starting at 1.
    pub column: usize,
}

impl Token {
    /// Creates a token at the given column.
    #[must_use]
    pub const fn new(kind: TokenKind, column: usize) -> Self {
        Self { kind, column }
    }

    /// Returns `true` for the end-of-input token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::Eof)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Operator(op) => write!(f, "Operator({})", op.symbol()),
            TokenKind::Bool(b) => write!(f, "Bool({b})"),
            TokenKind::Nil => write!(f, "Nil"),
            TokenKind::Identifier(name) => write!(f, "Identifier('{name}')"),
            TokenKind::Number(n) => write!(f, "Number({})", format_number(*n)),
            TokenKind::String(s) => write!(f, "String('{s}')"),
            TokenKind::Negation => write!(f, "Negation"),
            TokenKind::Comma => write!(f, "Comma"),
            TokenKind::ParensOpen => write!(f, "ParensOpen"),
            TokenKind::ParensClose => write!(f, "ParensClose"),
            TokenKind::CurlyBracketOpen => write!(f, "CurlyBracketOpen"),
            TokenKind::CurlyBracketClose => write!(f, "CurlyBracketClose"),
            TokenKind::BracketOpen => write!(f, "BracketOpen"),
            TokenKind::BracketClose => write!(f, "BracketClose"),
            TokenKind::Period => write!(f, "Period"),
            TokenKind::Other(s) => write!(f, "Other('{s}')"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
