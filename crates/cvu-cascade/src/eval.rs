//! Conversion of parsed property values into runtime values.

use cvu_common::constants::OBJECT_NAME_KEY;
use cvu_expr::{Arguments, ExpressionError, Host, Value};
use cvu_lang::{ParsedDefinition, PropertyValue};
use indexmap::IndexMap;

/// Resolves a property value, evaluating any expression it contains
/// against `host` and `arguments`.
///
/// Colors become strings, arrays become lists and nested objects become
/// [`Value::Object`]s. A named object such as `openView { … }` carries its
/// name under the `@name` key.
///
/// # Errors
///
/// Returns the first expression that fails to parse or evaluate.
pub fn resolve_value(
    value: &PropertyValue,
    host: &dyn Host,
    arguments: &Arguments,
) -> Result<Value, ExpressionError> {
    Ok(match value {
        PropertyValue::Nil => Value::Nil,
        PropertyValue::Bool(b) => Value::Bool(*b),
        PropertyValue::Number(n) => Value::Number(*n),
        PropertyValue::String(s) | PropertyValue::Color(s) => Value::String(s.clone()),
        PropertyValue::Expression(expr) => expr.evaluate(host, arguments)?,
        PropertyValue::Array(items) => Value::List(
            items
                .iter()
                .map(|item| resolve_value(item, host, arguments))
                .collect::<Result<_, _>>()?,
        ),
        PropertyValue::Object(def) => Value::Object(resolve_object(def, host, arguments)?),
    })
}

/// Resolves the properties of a nested object.
///
/// # Errors
///
/// Returns the first expression that fails to parse or evaluate.
pub fn resolve_object(
    def: &ParsedDefinition,
    host: &dyn Host,
    arguments: &Arguments,
) -> Result<IndexMap<String, Value>, ExpressionError> {
    let mut map = IndexMap::with_capacity(def.properties.len() + 1);
    if let Some(name) = &def.selector {
        let _ = map.insert(OBJECT_NAME_KEY.to_string(), Value::String(name.clone()));
    }
    for (key, value) in &def.properties {
        let _ = map.insert(key.clone(), resolve_value(value, host, arguments)?);
    }
    Ok(map)
}
