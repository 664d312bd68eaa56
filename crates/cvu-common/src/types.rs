//! Domain primitive types used across the CVU workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Precedence tier a definition belongs to.
///
/// Assigned by whoever loads a definition, never by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Definitions specific to the running session (highest precedence).
    Session,
    /// User-authored overrides.
    User,
    /// Shipped defaults (lowest precedence).
    Defaults,
}

impl Domain {
    /// All domains, most specific first.
    pub const PRECEDENCE: [Self; 3] = [Self::Session, Self::User, Self::Defaults];

    /// Returns the lowercase name used in config files and CLI flags.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::User => "user",
            Self::Defaults => "defaults",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a view shows one item or a list of items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    /// A single item (`Person { … }`).
    #[default]
    Single,
    /// A list of items (`Person[] { … }`).
    List,
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::List => write!(f, "list"),
        }
    }
}

/// A 1-based line/column location in source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column (in characters), starting at 1.
    pub column: usize,
}

impl Position {
    /// Creates a position from 1-based line and column numbers.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line:{} and character:{}", self.line, self.column)
    }
}
