//! Global configuration model for the CVU engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CvuError, Result};

/// Root configuration for a CVU engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CvuConfig {
    /// Directory holding the default (lowest precedence) definitions.
    pub defaults_dir: PathBuf,
    /// Directory holding user-authored overrides.
    pub user_dir: PathBuf,
    /// Indentation unit used when serializing definitions.
    pub indent: String,
    /// Renderer used when no definition names one.
    pub default_renderer: String,
    /// Whether loaded sources are run through the validator.
    pub validate_on_load: bool,
}

impl Default for CvuConfig {
    fn default() -> Self {
        Self {
            defaults_dir: PathBuf::from(crate::constants::DEFAULT_DEFAULTS_DIR),
            user_dir: PathBuf::from(crate::constants::DEFAULT_USER_DIR),
            indent: crate::constants::DEFAULT_INDENT.to_string(),
            default_renderer: crate::constants::DEFAULT_RENDERER.to_string(),
            validate_on_load: true,
        }
    }
}

impl CvuConfig {
    /// Reads a JSON configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// declares an empty indentation unit.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CvuError::io(path, e))?;
        let config: Self = serde_json::from_str(&content)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.indent.is_empty() || !self.indent.chars().all(|c| c == ' ' || c == '\t') {
            return Err(CvuError::Config {
                message: format!("indent must be spaces or tabs, got {:?}", self.indent),
            });
        }
        if self.default_renderer.is_empty() {
            return Err(CvuError::Config {
                message: "defaultRenderer must not be empty".into(),
            });
        }
        Ok(())
    }
}
