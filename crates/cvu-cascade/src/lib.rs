//! # cvu-cascade
//!
//! Resolution of effective view and renderer properties from definitions
//! loaded at several precedence domains.
//!
//! Handles:
//! - **Registry**: Parsed definitions per domain, with a compiled-source cache.
//! - **Selector**: Cascade stack construction for an item type, cardinality and renderer.
//! - **Cascadable**: Scalar, list and dictionary resolution with versioned memoization.
//! - **View / Render**: Typed view accessors and resolved UI element trees.
//! - **Engine**: The context object owning configuration, registry and diagnostics.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod cascadable;
pub mod engine;
pub mod error;
pub mod eval;
pub mod registry;
pub mod render;
pub mod selector;
pub mod stack;
pub mod view;

pub use cascadable::Cascadable;
pub use engine::CvuEngine;
pub use error::{CascadeError, Result};
pub use registry::{CacheStats, DefinitionRegistry, LoadDiagnostic};
pub use render::{CascadingRenderConfig, ResolvedElement};
pub use selector::{RenderTarget, StackSelection};
pub use stack::CascadeStack;
pub use view::CascadingView;
