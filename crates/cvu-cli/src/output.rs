//! Formatted output helpers for CLI commands.
//!
//! Renders resolved element trees as indented text, summarizes validation
//! reports and prints resolved values as JSON.

use std::fmt::Write as _;

use cvu_cascade::ResolvedElement;
use cvu_expr::Value;
use cvu_lang::ValidationReport;
use indexmap::IndexMap;

const TREE_INDENT: &str = "  ";

/// Formats a resolved element tree, one element per line with its
/// properties inline.
#[must_use]
pub fn format_tree(elements: &[ResolvedElement]) -> String {
    let mut out = String::new();
    for element in elements {
        write_element(&mut out, element, 0);
    }
    out
}

fn write_element(out: &mut String, element: &ResolvedElement, depth: usize) {
    out.push_str(&TREE_INDENT.repeat(depth));
    out.push_str(&element.kind);
    for (key, value) in &element.properties {
        let _ = write!(out, " {key}={}", value.to_json());
    }
    out.push('\n');
    for child in &element.children {
        write_element(out, child, depth + 1);
    }
}

/// Summarizes a validation report, e.g. `1 error, 2 warnings`.
#[must_use]
pub fn summarize(report: &ValidationReport) -> String {
    format!(
        "{}, {}",
        plural(report.errors.len(), "error"),
        plural(report.warnings.len(), "warning")
    )
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Pretty-prints resolved properties as a JSON object in resolution order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn properties_json(properties: &IndexMap<String, Value>) -> serde_json::Result<String> {
    let object: serde_json::Map<String, serde_json::Value> = properties
        .iter()
        .map(|(key, value)| (key.clone(), value.to_json()))
        .collect();
    serde_json::to_string_pretty(&serde_json::Value::Object(object))
}
