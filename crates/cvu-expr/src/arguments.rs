//! Named values available to an evaluation.

use indexmap::IndexMap;

use cvu_common::constants::CURRENT_ITEM;

use crate::value::Value;

/// The argument set passed to an evaluation. The current item, when
/// present, is stored under the `.` key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, Value>,
}

impl Arguments {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the named argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets an argument, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Builder form of [`Arguments::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.insert(name, value);
        self
    }

    /// The current item, if one is bound.
    #[must_use]
    pub fn item(&self) -> Option<&Value> {
        self.get(CURRENT_ITEM)
    }

    /// Returns a copy with `item` bound as the current item.
    #[must_use]
    pub fn with_item(&self, item: Value) -> Self {
        self.clone().with(CURRENT_ITEM, item)
    }

    /// Iterates the arguments in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Builds an argument set from a JSON object. Any other JSON value
    /// becomes the current item.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match Value::from_json(json) {
            Value::Object(values) => Self { values },
            Value::Nil => Self::default(),
            item => Self::default().with(CURRENT_ITEM, item),
        }
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_item_does_not_touch_original() {
        let args = Arguments::new().with("limit", 3);
        let scoped = args.with_item(Value::from("x"));
        assert!(args.item().is_none());
        assert_eq!(scoped.item(), Some(&Value::from("x")));
        assert_eq!(scoped.get("limit"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn from_json_object_keeps_keys() {
        let args = Arguments::from_json(serde_json::json!({"a": 1, "b": "two"}));
        assert_eq!(args.len(), 2);
        let keys: Vec<&str> = args.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn from_json_scalar_becomes_item() {
        let args = Arguments::from_json(serde_json::json!("hello"));
        assert_eq!(args.item(), Some(&Value::from("hello")));
        assert!(Arguments::from_json(serde_json::Value::Null).is_empty());
    }
}
