//! Semantic checks over parsed definitions.
//!
//! Walks every definition, UI element and action against the registries in
//! [`crate::schema`] and collects findings. Validation never fails: unknown
//! and deprecated keys become warnings, wrong value shapes and unparsable
//! expressions become errors, and the caller decides what to do with them.

use std::fmt;

use crate::schema::{ActionArgument, ActionKind, ElementKind, ElementProperty, ValueShape, ViewProperty};

use super::ast::{DefinitionKind, ParsedDefinition, Properties, PropertyValue, UiElement};

/// How serious a finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Suspicious but harmless.
    Warning,
    /// The value will not work as written.
    Error,
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Warning or error.
    pub severity: Severity,
    /// Path of the offending node, e.g. `Person > [renderer = list] > Text`.
    pub location: String,
    /// What is wrong.
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}: {}: {}", self.location, self.message)
    }
}

/// Findings of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Advisory findings.
    pub warnings: Vec<Issue>,
    /// Findings that make a value unusable.
    pub errors: Vec<Issue>,
}

impl ValidationReport {
    /// Returns `true` when nothing was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }

    /// Returns `true` when at least one error was found.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Appends the findings of another report.
    pub fn merge(&mut self, other: Self) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    /// Errors first, then warnings.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.errors.iter().chain(&self.warnings)
    }
}

/// Validates parsed definitions.
#[must_use]
pub fn validate(definitions: &[ParsedDefinition]) -> ValidationReport {
    tracing::info!(count = definitions.len(), "validating definitions");
    let mut walker = Walker::default();
    for def in definitions {
        walker.definition(def);
    }
    tracing::debug!(
        warnings = walker.report.warnings.len(),
        errors = walker.report.errors.len(),
        "validation finished"
    );
    walker.report
}

#[derive(Default)]
struct Walker {
    report: ValidationReport,
    path: Vec<String>,
}

impl Walker {
    fn location(&self) -> String {
        if self.path.is_empty() {
            "<root>".to_string()
        } else {
            self.path.join(" > ")
        }
    }

    fn warn(&mut self, message: String) {
        let location = self.location();
        self.report.warnings.push(Issue {
            severity: Severity::Warning,
            location,
            message,
        });
    }

    fn error(&mut self, message: String) {
        let location = self.location();
        self.report.errors.push(Issue {
            severity: Severity::Error,
            location,
            message,
        });
    }

    fn definition(&mut self, def: &ParsedDefinition) {
        let header = def.header();
        self.path.push(if header.is_empty() { "{}".to_string() } else { header });

        match def.kind {
            DefinitionKind::Color => self.color_properties(&def.properties),
            DefinitionKind::Style => self.element_properties(&def.properties),
            DefinitionKind::Language => self.language_properties(&def.properties),
            DefinitionKind::Datasource => self.datasource_properties(&def.properties),
            DefinitionKind::Session
            | DefinitionKind::Sessions
            | DefinitionKind::View
            | DefinitionKind::Named
            | DefinitionKind::TypeView
            | DefinitionKind::ListView => self.view_properties(&def.properties),
            DefinitionKind::Renderer | DefinitionKind::Object => {
                self.free_properties(&def.properties);
            }
        }

        for child in &def.children {
            self.element(child);
        }
        for nested in &def.definitions {
            self.definition(nested);
        }
        let _ = self.path.pop();
    }

    fn element(&mut self, element: &UiElement) {
        self.path.push(element.kind.clone());
        if ElementKind::from_name(&element.kind).is_none() {
            self.warn(format!("unknown element '{}'", element.kind));
        }
        self.element_properties(&element.properties);
        for child in &element.children {
            self.element(child);
        }
        let _ = self.path.pop();
    }

    fn view_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            match ViewProperty::from_key(key) {
                Some(property) => self.shaped(key, value, property.shape()),
                None => {
                    self.warn(format!("unknown view property '{key}'"));
                    self.value(value);
                }
            }
        }
    }

    fn element_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            let Some(property) = ElementProperty::from_key(key) else {
                self.warn(format!("unknown property '{key}'"));
                self.value(value);
                continue;
            };
            if let Some(replacement) = property.replacement() {
                self.warn(format!(
                    "property '{key}' is deprecated, use '{}'",
                    replacement.key()
                ));
            }
            self.shaped(key, value, property.shape());
        }
    }

    fn color_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            if !matches!(key.as_str(), "light" | "dark") {
                self.warn(format!("unknown color variant '{key}'"));
            }
            let valid = match value {
                PropertyValue::Color(_) | PropertyValue::Expression(_) => true,
                PropertyValue::Array(items) => {
                    items.iter().all(|i| matches!(i, PropertyValue::Color(_)))
                }
                _ => false,
            };
            if valid {
                self.value(value);
            } else {
                self.error(format!(
                    "wrong color value for '{key}': found {}",
                    value.shape_name()
                ));
            }
        }
    }

    fn language_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            match value {
                PropertyValue::String(_) => {}
                PropertyValue::Expression(expr) if expr.is_string_mode() => self.value(value),
                other => self.error(format!(
                    "wrong language value for '{key}': found {}",
                    other.shape_name()
                )),
            }
        }
    }

    fn datasource_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            let shape = match key.as_str() {
                "query" | "sortProperty" => ValueShape::Text,
                "sortAscending" => ValueShape::Bool,
                "filter" => ValueShape::Object,
                _ => {
                    self.warn(format!("unknown datasource property '{key}'"));
                    ValueShape::Any
                }
            };
            self.shaped(key, value, shape);
        }
    }

    /// Renderer and object bodies take arbitrary keys; nested objects that
    /// hold elements are render groups and get walked.
    fn free_properties(&mut self, properties: &Properties) {
        for (key, value) in properties {
            if let PropertyValue::Object(def) = value {
                self.path.push(key.clone());
                self.free_properties(&def.properties);
                for child in &def.children {
                    self.element(child);
                }
                let _ = self.path.pop();
            } else {
                self.value(value);
            }
        }
    }

    fn shaped(&mut self, key: &str, value: &PropertyValue, shape: ValueShape) {
        if !shape.accepts(value) {
            self.error(format!(
                "property '{key}' expects {shape:?}, found {}",
                value.shape_name()
            ));
            return;
        }
        if shape.holds_actions() {
            self.actions(value);
        } else {
            self.value(value);
        }
    }

    fn actions(&mut self, value: &PropertyValue) {
        match value {
            PropertyValue::String(name) => {
                if ActionKind::from_name(name).is_none() {
                    self.warn(format!("unknown action '{name}'"));
                }
            }
            PropertyValue::Object(def) => self.action(def),
            PropertyValue::Array(items) => {
                for item in items {
                    self.actions(item);
                }
            }
            other => self.value(other),
        }
    }

    fn action(&mut self, def: &ParsedDefinition) {
        let Some(kind) = def.selector.as_deref().and_then(ActionKind::from_name) else {
            self.warn(format!("unknown action '{}'", def.selector_str()));
            self.free_properties(&def.properties);
            return;
        };
        self.path.push(kind.name().to_string());
        for (key, value) in &def.properties {
            match ActionArgument::from_key(key) {
                Some(argument) if kind.accepts(argument) => {
                    self.shaped(key, value, argument.shape());
                }
                Some(_) => {
                    self.warn(format!("argument '{key}' is not used by this action"));
                    self.value(value);
                }
                None => {
                    self.warn(format!("unknown action argument '{key}'"));
                    self.value(value);
                }
            }
        }
        for required in kind.required_arguments() {
            if !def.properties.contains_key(required.key()) {
                self.error(format!("missing required argument '{}'", required.key()));
            }
        }
        let _ = self.path.pop();
    }

    /// Checks that every expression inside `value` parses.
    fn value(&mut self, value: &PropertyValue) {
        match value {
            PropertyValue::Expression(expr) => {
                if let Err(err) = expr.ast() {
                    self.error(format!("invalid expression '{}': {err}", expr.code()));
                }
            }
            PropertyValue::Array(items) => {
                for item in items {
                    self.value(item);
                }
            }
            PropertyValue::Object(def) => self.free_properties(&def.properties),
            PropertyValue::Nil
            | PropertyValue::Bool(_)
            | PropertyValue::Number(_)
            | PropertyValue::String(_)
            | PropertyValue::Color(_) => {}
        }
    }
}
