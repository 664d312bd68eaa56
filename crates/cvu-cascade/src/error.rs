//! Error types for loading definitions and resolving properties.

use cvu_common::error::CvuError;
use cvu_common::types::Domain;
use cvu_expr::ExpressionError;
use cvu_lang::CvuParseError;
use thiserror::Error;

/// A failure while loading or resolving definitions.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// A definition source did not parse. Previously loaded definitions
    /// are left untouched.
    #[error("failed to parse {domain} source '{name}': {error}")]
    Parse {
        /// Domain the source was loaded into.
        domain: Domain,
        /// Source name, usually the file name.
        name: String,
        /// Underlying parse error.
        #[source]
        error: CvuParseError,
    },

    /// An expression in a resolved property failed to parse or evaluate.
    #[error("failed to resolve '{property}': {error}")]
    Eval {
        /// Property being resolved.
        property: String,
        /// Underlying expression error.
        #[source]
        error: ExpressionError,
    },

    /// `render` was asked for a group no renderer defines.
    #[error("render group not found: {0}")]
    UnknownRenderGroup(String),

    /// Filesystem or configuration failure.
    #[error(transparent)]
    Common(#[from] CvuError),
}

/// Convenience alias for cascade operations.
pub type Result<T> = std::result::Result<T, CascadeError>;
