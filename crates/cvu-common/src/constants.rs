//! System-wide constants and default paths.

/// File extension for CVU definition files (without the dot).
pub const CVU_EXTENSION: &str = "cvu";

/// Default directory holding the shipped default definitions.
pub const DEFAULT_DEFAULTS_DIR: &str = "defaults";

/// Default directory holding user-authored overrides.
pub const DEFAULT_USER_DIR: &str = "user";

/// Indentation unit used by the canonical serializer.
pub const DEFAULT_INDENT: &str = "    ";

/// Renderer used when neither the caller nor the cascade names one.
pub const DEFAULT_RENDERER: &str = "list";

/// Selector matching every item type.
pub const WILDCARD_TYPE: &str = "*";

/// Variable name an expression uses for the current item (`.` in source).
pub const CURRENT_ITEM: &str = ".";

/// Render group name selecting the renderer's top-level element children.
pub const DEFAULT_RENDER_GROUP: &str = "*";

/// Key under which a named object (e.g. an action) stores its name once resolved.
pub const OBJECT_NAME_KEY: &str = "@name";

/// Number of source lines shown before and after the offending line in diagnostics.
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 10;

/// Binary name for the CLI.
pub const BIN_NAME: &str = "cvu";
