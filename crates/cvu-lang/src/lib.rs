//! # cvu-lang
//!
//! The CVU definition language: views, renderers, styles, colors and
//! languages declared in `.cvu` files.
//!
//! Handles:
//! - **Parser**: Lexing and recursive-descent parsing into [`ParsedDefinition`] trees,
//!   with source-annotated diagnostics on failure.
//! - **Format**: Canonical, idempotent serialization back to CVU text.
//! - **Schema**: Enum-keyed registries of view properties, elements and actions.
//! - **Validator**: Non-blocking semantic checks against the schema.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod format;
pub mod parser;
pub mod schema;

pub use format::{CvuFormatter, format_cvu};
pub use parser::ast::{DefinitionKind, ParsedDefinition, Properties, PropertyValue, UiElement};
pub use parser::error::CvuParseError;
pub use parser::parse_cvu;
pub use parser::validator::{Issue, Severity, ValidationReport, validate};
