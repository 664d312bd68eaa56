//! Canonical serialization of parsed definitions back to CVU text.
//!
//! Output is deterministic: scalar properties sorted by key, then nested
//! objects and arrays in source order, then UI element children, then
//! nested definitions, each group separated by a blank line. Formatting
//! the parse of formatted text yields the same text.

use std::fmt;
use std::sync::Arc;

use cvu_common::constants::DEFAULT_INDENT;
use cvu_expr::Expression;
use cvu_expr::value::format_number;

use crate::parser::ast::{
    ParsedDefinition, Properties, PropertyValue, UiElement, is_plain_identifier, quote,
};

/// Writes definitions in canonical form with a configurable indent unit.
#[derive(Debug, Clone)]
pub struct CvuFormatter {
    indent: String,
}

impl Default for CvuFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl CvuFormatter {
    /// Creates a formatter indenting each level with `indent`.
    #[must_use]
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            indent: indent.into(),
        }
    }

    /// Formats a whole file: definitions separated by a blank line,
    /// ending with a newline.
    #[must_use]
    pub fn format(&self, definitions: &[ParsedDefinition]) -> String {
        if definitions.is_empty() {
            return String::new();
        }
        let mut out = definitions
            .iter()
            .map(|def| self.definition(def, 0))
            .collect::<Vec<_>>()
            .join("\n\n");
        out.push('\n');
        out
    }

    /// Formats one definition at the top level, without a trailing newline.
    #[must_use]
    pub fn format_definition(&self, definition: &ParsedDefinition) -> String {
        self.definition(definition, 0)
    }

    fn pad(&self, depth: usize) -> String {
        self.indent.repeat(depth)
    }

    fn definition(&self, def: &ParsedDefinition, depth: usize) -> String {
        let body = self.body(&def.properties, &def.children, &def.definitions, depth);
        let header = def.header();
        if header.is_empty() {
            body
        } else {
            format!("{header} {body}")
        }
    }

    fn element(&self, element: &UiElement, depth: usize) -> String {
        let body = self.body(&element.properties, &element.children, &[], depth);
        format!("{} {body}", element.kind)
    }

    /// Renders `{ ... }` whose closing brace sits at `depth`.
    fn body(
        &self,
        properties: &Properties,
        children: &[UiElement],
        definitions: &[Arc<ParsedDefinition>],
        depth: usize,
    ) -> String {
        let inner = self.pad(depth + 1);
        let mut sections = Vec::new();

        let mut scalars: Vec<_> = properties.iter().filter(|(_, v)| v.is_scalar()).collect();
        scalars.sort_by(|(a, _), (b, _)| a.cmp(b));
        if !scalars.is_empty() {
            sections.push(
                scalars
                    .iter()
                    .map(|(key, value)| self.property(&inner, key, value, depth + 1))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        let complex: Vec<String> = properties
            .iter()
            .filter(|(_, v)| !v.is_scalar())
            .map(|(key, value)| self.property(&inner, key, value, depth + 1))
            .collect();
        if !complex.is_empty() {
            sections.push(complex.join("\n"));
        }

        if !children.is_empty() {
            sections.push(
                children
                    .iter()
                    .map(|child| format!("{inner}{}", self.element(child, depth + 1)))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            );
        }

        if !definitions.is_empty() {
            sections.push(
                definitions
                    .iter()
                    .map(|def| format!("{inner}{}", self.definition(def, depth + 1)))
                    .collect::<Vec<_>>()
                    .join("\n\n"),
            );
        }

        if sections.is_empty() {
            return "{}".to_string();
        }
        format!("{{\n{}\n{}}}", sections.join("\n\n"), self.pad(depth))
    }

    fn property(&self, inner: &str, key: &str, value: &PropertyValue, depth: usize) -> String {
        format!("{inner}{}: {}", format_key(key), self.value(value, depth, true))
    }

    /// Renders a value on a line at `depth`.
    fn value(&self, value: &PropertyValue, depth: usize, property_level: bool) -> String {
        match value {
            PropertyValue::Nil => "nil".to_string(),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Number(n) => format_number(*n),
            PropertyValue::String(s) => quote(s),
            PropertyValue::Color(c) => c.clone(),
            PropertyValue::Expression(expr) => format_expression(expr),
            PropertyValue::Object(def) => self.definition(def, depth),
            PropertyValue::Array(items) => self.array(items, depth, property_level),
        }
    }

    fn array(&self, items: &[PropertyValue], depth: usize, property_level: bool) -> String {
        let rendered: Vec<String> = items
            .iter()
            .map(|item| self.value(item, depth + 1, false))
            .collect();
        if rendered.iter().any(|r| r.contains('\n')) {
            let inner = self.pad(depth + 1);
            let lines: Vec<String> = rendered.iter().map(|r| format!("{inner}{r}")).collect();
            return format!("[\n{}\n{}]", lines.join("\n"), self.pad(depth));
        }
        if property_level && items.len() >= 2 && items.iter().all(PropertyValue::is_scalar) {
            return rendered.join(" ");
        }
        format!("[{}]", rendered.join(" "))
    }
}

/// Keys render bare unless they would lex as something else. Capitalized
/// keys are quoted so they are not mistaken for UI elements.
fn format_key(key: &str) -> String {
    if is_plain_identifier(key) && !key.starts_with(|c: char| c.is_ascii_uppercase()) {
        key.to_string()
    } else {
        quote(key)
    }
}

/// Interpolated strings keep their escapes verbatim so literal braces stay
/// escaped; raw expressions are wrapped in `{{ }}`.
fn format_expression(expr: &Expression) -> String {
    if !expr.is_string_mode() {
        return format!("{{{{{}}}}}", expr.code());
    }
    let mut out = String::from('"');
    for c in expr.code().chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Formats definitions with the default indent.
#[must_use]
pub fn format_cvu(definitions: &[ParsedDefinition]) -> String {
    CvuFormatter::default().format(definitions)
}

impl fmt::Display for ParsedDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CvuFormatter::default().format_definition(self))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CvuFormatter::default().value(self, 0, true))
    }
}
