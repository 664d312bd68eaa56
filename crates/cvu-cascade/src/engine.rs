//! The application-level context object.
//!
//! [`CvuEngine`] owns the configuration, the definition registry, the
//! evaluation host and the diagnostics of the last load. It is created by
//! the application and passed explicitly wherever views are built.

use std::rc::Rc;

use cvu_common::config::CvuConfig;
use cvu_common::types::Domain;
use cvu_expr::{Arguments, Host, MemoryHost};
use cvu_lang::{ValidationReport, validate};

use crate::error::Result;
use crate::registry::{DefinitionRegistry, LoadDiagnostic};
use crate::render::CascadingRenderConfig;
use crate::selector::{RenderTarget, select};
use crate::view::CascadingView;

/// Loads definitions and builds views from them.
pub struct CvuEngine {
    config: CvuConfig,
    registry: DefinitionRegistry,
    host: Rc<dyn Host>,
    diagnostics: Vec<LoadDiagnostic>,
}

impl std::fmt::Debug for CvuEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CvuEngine")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl CvuEngine {
    /// Creates an engine evaluating expressions with a [`MemoryHost`].
    #[must_use]
    pub fn new(config: CvuConfig) -> Self {
        Self::with_host(config, Rc::new(MemoryHost::new()))
    }

    /// Creates an engine evaluating expressions with `host`.
    #[must_use]
    pub fn with_host(config: CvuConfig, host: Rc<dyn Host>) -> Self {
        Self {
            config,
            registry: DefinitionRegistry::new(),
            host,
            diagnostics: Vec::new(),
        }
    }

    /// Loads the configured defaults and user directories, replacing what
    /// an earlier load read from them. Files that fail are recorded in
    /// [`CvuEngine::diagnostics`] and skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured directory exists but cannot be read.
    pub fn load(&mut self) -> Result<()> {
        tracing::info!(
            defaults = %self.config.defaults_dir.display(),
            user = %self.config.user_dir.display(),
            "loading definitions"
        );
        self.diagnostics.clear();
        self.registry.remove_domain(Domain::Defaults);
        self.registry.remove_domain(Domain::User);
        let defaults = self
            .registry
            .load_dir(Domain::Defaults, &self.config.defaults_dir)?;
        self.diagnostics.extend(defaults);
        let user = self.registry.load_dir(Domain::User, &self.config.user_dir)?;
        self.diagnostics.extend(user);
        self.after_load();
        Ok(())
    }

    /// Drops user definitions and reads the user directory again.
    ///
    /// # Errors
    ///
    /// Returns an error if the user directory exists but cannot be read.
    pub fn reload_user(&mut self) -> Result<()> {
        self.registry.remove_domain(Domain::User);
        self.diagnostics.retain(|d| d.domain != Domain::User);
        let user = self.registry.load_dir(Domain::User, &self.config.user_dir)?;
        self.diagnostics.extend(user);
        self.after_load();
        Ok(())
    }

    /// Loads one source from memory, e.g. session definitions.
    ///
    /// # Errors
    ///
    /// Returns an error if the source does not parse.
    pub fn load_source(&mut self, domain: Domain, name: &str, text: &str) -> Result<usize> {
        self.registry.load_source(domain, name, text)
    }

    /// Builds the view for `target`.
    #[must_use]
    pub fn view(&self, target: &RenderTarget, arguments: Arguments) -> CascadingView {
        let selection = select(&self.registry, target, &self.config.default_renderer);
        CascadingView::new(selection, arguments, Rc::clone(&self.host))
    }

    /// Builds the render configuration for `target`.
    #[must_use]
    pub fn render_config(&self, target: &RenderTarget, arguments: Arguments) -> CascadingRenderConfig {
        self.view(target, arguments).render_config()
    }

    /// Validates every loaded definition.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let definitions: Vec<_> = self.registry.all().map(|def| def.as_ref().clone()).collect();
        validate(&definitions)
    }

    /// Files that failed during the last load.
    #[must_use]
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// The definition registry.
    #[must_use]
    pub const fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Mutable access to the definition registry.
    pub const fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.registry
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &CvuConfig {
        &self.config
    }

    fn after_load(&self) {
        if !self.diagnostics.is_empty() {
            tracing::warn!(failed = self.diagnostics.len(), "some definition files were dropped");
        }
        if self.config.validate_on_load {
            let report = self.validate();
            for issue in &report.errors {
                tracing::warn!(%issue, "invalid definition");
            }
            for issue in &report.warnings {
                tracing::debug!(%issue, "definition warning");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn config_in(dir: &std::path::Path) -> CvuConfig {
        CvuConfig {
            defaults_dir: dir.join("defaults"),
            user_dir: dir.join("user"),
            ..CvuConfig::default()
        }
    }

    #[test]
    fn load_reads_both_domains() {
        let tmp = tempfile::tempdir().expect("temp dir");
        fs::create_dir_all(tmp.path().join("defaults")).expect("mkdir");
        fs::create_dir_all(tmp.path().join("user")).expect("mkdir");
        fs::write(tmp.path().join("defaults/person.cvu"), "Person { title: \"d\" }").expect("write");
        fs::write(tmp.path().join("user/person.cvu"), "Person { title: \"u\" }").expect("write");

        let mut engine = CvuEngine::new(config_in(tmp.path()));
        engine.load().expect("should load");
        assert!(engine.diagnostics().is_empty());
        let mut view = engine.view(&RenderTarget::single("Person"), Arguments::new());
        assert_eq!(view.title().expect("ok").as_deref(), Some("u"));

        fs::remove_file(tmp.path().join("user/person.cvu")).expect("remove");
        engine.reload_user().expect("should reload");
        let mut view = engine.view(&RenderTarget::single("Person"), Arguments::new());
        assert_eq!(view.title().expect("ok").as_deref(), Some("d"));
    }

    #[test]
    fn load_again_drops_deleted_files() {
        let tmp = tempfile::tempdir().expect("temp dir");
        fs::create_dir_all(tmp.path().join("defaults")).expect("mkdir");
        fs::write(tmp.path().join("defaults/a.cvu"), "Person { title: \"a\" }").expect("write");
        fs::write(tmp.path().join("defaults/b.cvu"), "Note { title: \"b\" }").expect("write");

        let mut engine = CvuEngine::new(config_in(tmp.path()));
        let _ = engine
            .load_source(Domain::Session, "session", "Person { title: \"s\" }")
            .expect("should load");
        engine.load().expect("should load");
        assert_eq!(engine.registry().len(), 3);

        fs::remove_file(tmp.path().join("defaults/b.cvu")).expect("remove");
        engine.load().expect("should reload");
        assert_eq!(engine.registry().source_names(Domain::Defaults), vec!["a.cvu"]);
        assert_eq!(engine.registry().source_names(Domain::Session), vec!["session"]);
        assert_eq!(engine.registry().cache_stats().hits, 1);
    }

    #[test]
    fn missing_directories_load_nothing() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let mut engine = CvuEngine::new(config_in(tmp.path()));
        engine.load().expect("should load");
        assert!(engine.registry().is_empty());
    }

    #[test]
    fn validate_covers_loaded_sources() {
        let mut engine = CvuEngine::new(CvuConfig::default());
        let _ = engine
            .load_source(Domain::Session, "session", "Person { titel: \"x\" }")
            .expect("should load");
        let report = engine.validate();
        assert_eq!(report.warnings.len(), 1);
    }
}
