//! Store of parsed definitions, keyed by domain and source.
//!
//! Sources are tracked by name so a reload replaces what the same file
//! contributed before. Parsed output is cached by (domain, SHA-256 of the
//! source text): loading identical text again never re-parses it. A cache
//! entry lives as long as some loaded source uses it; entries of a removed
//! domain survive until that domain's next directory load.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use cvu_common::constants::CVU_EXTENSION;
use cvu_common::error::CvuError;
use cvu_common::types::{Cardinality, Domain};
use cvu_lang::{DefinitionKind, ParsedDefinition, parse_cvu};
use sha2::{Digest, Sha256};

use crate::error::{CascadeError, Result};

type Compiled = Arc<[Arc<ParsedDefinition>]>;

/// Outcome of loading one file from a directory that did not make it
/// into the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// Domain the file was loaded into.
    pub domain: Domain,
    /// File name.
    pub name: String,
    /// Rendered error, with source context for parse errors.
    pub message: String,
}

/// Compiled-source cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Loads served from the cache.
    pub hits: u64,
    /// Loads that had to parse.
    pub misses: u64,
}

#[derive(Debug)]
struct Source {
    name: String,
    digest: String,
    definitions: Compiled,
}

/// Parsed definitions of every domain.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    sources: HashMap<Domain, Vec<Source>>,
    compiled: HashMap<(Domain, String), Compiled>,
    stats: CacheStats,
    generation: u64,
}

impl DefinitionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and stores its definitions under `domain`, replacing
    /// whatever an earlier source called `name` contributed. Returns the
    /// number of top-level definitions the source holds.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Parse`] if the text does not parse; the
    /// registry is left unchanged.
    pub fn load_source(&mut self, domain: Domain, name: &str, text: &str) -> Result<usize> {
        let digest = sha256_hex(text);
        let sources = self.sources.entry(domain).or_default();
        if let Some(existing) = sources.iter().find(|s| s.name == name && s.digest == digest) {
            tracing::debug!(%domain, name, "source unchanged, skipping");
            return Ok(existing.definitions.len());
        }

        let key = (domain, digest);
        let definitions = if let Some(cached) = self.compiled.get(&key) {
            self.stats.hits += 1;
            tracing::debug!(%domain, name, "compiled definitions served from cache");
            Arc::clone(cached)
        } else {
            self.stats.misses += 1;
            let parsed = parse_cvu(text).map_err(|error| CascadeError::Parse {
                domain,
                name: name.to_string(),
                error,
            })?;
            let compiled: Compiled = parsed
                .into_iter()
                .map(|mut def| {
                    def.assign_domain(domain);
                    Arc::new(def)
                })
                .collect();
            let _ = self.compiled.insert(key.clone(), Arc::clone(&compiled));
            compiled
        };

        let count = definitions.len();
        let sources = self.sources.entry(domain).or_default();
        let replaced = sources.iter().any(|s| s.name == name);
        sources.retain(|s| s.name != name);
        sources.push(Source {
            name: name.to_string(),
            digest: key.1,
            definitions,
        });
        self.generation += 1;
        if replaced {
            self.prune_compiled(domain);
        }
        tracing::info!(%domain, name, definitions = count, "loaded definitions");
        Ok(count)
    }

    /// Loads every `*.cvu` file in `dir`, in file name order. Files that
    /// fail to read or parse are reported and skipped. A missing directory
    /// loads nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory exists but cannot be listed.
    pub fn load_dir(&mut self, domain: Domain, dir: &Path) -> Result<Vec<LoadDiagnostic>> {
        if !dir.is_dir() {
            tracing::debug!(%domain, dir = %dir.display(), "definition directory missing, skipping");
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(dir).map_err(|e| CvuError::io(dir, e))?;
        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == CVU_EXTENSION))
            .collect();
        paths.sort();

        let mut diagnostics = Vec::new();
        for path in paths {
            let name = path
                .file_name()
                .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
            let text = match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(%domain, name, error = %e, "failed to read definition file");
                    diagnostics.push(LoadDiagnostic {
                        domain,
                        name,
                        message: CvuError::io(&path, e).to_string(),
                    });
                    continue;
                }
            };
            if let Err(err) = self.load_source(domain, &name, &text) {
                tracing::warn!(%domain, name, error = %err, "dropping definition file");
                let message = match &err {
                    CascadeError::Parse { error, .. } => error.render_diagnostic(&text),
                    other => other.to_string(),
                };
                diagnostics.push(LoadDiagnostic {
                    domain,
                    name,
                    message,
                });
            }
        }
        self.prune_compiled(domain);
        Ok(diagnostics)
    }

    /// Drops every source of `domain`. Its compiled cache entries are kept
    /// until the next [`DefinitionRegistry::load_dir`] into `domain`, so
    /// reloading unchanged files does not re-parse them.
    pub fn remove_domain(&mut self, domain: Domain) {
        if self.sources.remove(&domain).is_some() {
            self.generation += 1;
            tracing::info!(%domain, "removed definitions");
        }
    }

    /// Drops one source. Returns `true` if it was loaded.
    pub fn remove_source(&mut self, domain: Domain, name: &str) -> bool {
        let Some(sources) = self.sources.get_mut(&domain) else {
            return false;
        };
        let before = sources.len();
        sources.retain(|s| s.name != name);
        let removed = sources.len() != before;
        if removed {
            self.generation += 1;
            self.prune_compiled(domain);
        }
        removed
    }

    /// Definitions of one domain. Later-loaded sources come first; within
    /// a source, definitions keep their file order.
    pub fn definitions(&self, domain: Domain) -> impl Iterator<Item = &Arc<ParsedDefinition>> {
        self.sources
            .get(&domain)
            .into_iter()
            .flat_map(|sources| sources.iter().rev())
            .flat_map(|source| source.definitions.iter())
    }

    /// Every definition, domains in precedence order.
    pub fn all(&self) -> impl Iterator<Item = &Arc<ParsedDefinition>> {
        Domain::PRECEDENCE
            .into_iter()
            .flat_map(move |domain| self.definitions(domain))
    }

    /// Type views of `domain` matching the type and cardinality.
    pub fn type_views<'a>(
        &'a self,
        domain: Domain,
        type_name: &'a str,
        cardinality: Cardinality,
    ) -> impl Iterator<Item = &'a Arc<ParsedDefinition>> {
        self.definitions(domain)
            .filter(move |def| def.matches_type(type_name, cardinality))
    }

    /// Top-level renderer definitions of `domain` with the given name.
    pub fn renderers<'a>(
        &'a self,
        domain: Domain,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<ParsedDefinition>> {
        self.definitions(domain).filter(move |def| def.is_renderer(name))
    }

    /// The highest-precedence definition of `kind` with the given selector.
    #[must_use]
    pub fn find(&self, kind: DefinitionKind, selector: &str) -> Option<&Arc<ParsedDefinition>> {
        self.all()
            .find(|def| def.kind == kind && def.selector.as_deref() == Some(selector))
    }

    /// The highest-precedence view called `name`, either `.name` or
    /// `[view = name]`.
    #[must_use]
    pub fn find_view(&self, name: &str) -> Option<&Arc<ParsedDefinition>> {
        self.find(DefinitionKind::Named, name)
            .or_else(|| self.find(DefinitionKind::View, name))
    }

    /// Names of the sources loaded into `domain`, in load order.
    #[must_use]
    pub fn source_names(&self, domain: Domain) -> Vec<&str> {
        self.sources
            .get(&domain)
            .map(|sources| sources.iter().map(|s| s.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Total number of loaded definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all().count()
    }

    /// Returns `true` when nothing is loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }

    /// Counter bumped whenever the loaded set changes. Stacks built at an
    /// older generation are stale.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Compiled-source cache counters.
    #[must_use]
    pub const fn cache_stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of compiled sources held in the cache.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.compiled.len()
    }

    /// Evicts cached entries of `domain` that no loaded source uses.
    fn prune_compiled(&mut self, domain: Domain) {
        let in_use: HashSet<&str> = self
            .sources
            .get(&domain)
            .into_iter()
            .flatten()
            .map(|s| s.digest.as_str())
            .collect();
        let before = self.compiled.len();
        self.compiled
            .retain(|(d, digest), _| *d != domain || in_use.contains(digest.as_str()));
        let evicted = before - self.compiled.len();
        if evicted > 0 {
            tracing::debug!(%domain, evicted, "evicted unused compiled sources");
        }
    }
}

fn sha256_hex(text: &str) -> String {
    Sha256::digest(text.as_bytes())
        .iter()
        .fold(String::with_capacity(64), |mut out, b| {
            let _ = write!(out, "{b:02x}");
            out
        })
}
