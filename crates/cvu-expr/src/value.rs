//! Runtime values produced by evaluation and supplied by hosts.
//!
//! Coercion rules follow loosely-typed scripting semantics: arithmetic
//! converts to numbers (non-numeric text becomes NaN), truthiness treats
//! `nil`, `false`, `0`, NaN and the empty string as false, and equality
//! converts the right operand to the left operand's type.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;

/// A dynamically typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// Absence of a value.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// A double-precision number.
    Number(f64),
    /// A string.
    String(String),
    /// An ordered list.
    List(Vec<Value>),
    /// A typed property bag (an item or a dictionary).
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Coerces to a boolean.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Nil => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Object(_) => true,
        }
    }

    /// Coerces to a number. Text that does not parse, `nil` and containers become NaN.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => s.trim().parse().unwrap_or(f64::NAN),
            Self::Nil | Self::List(_) | Self::Object(_) => f64::NAN,
        }
    }

    /// Coerces to display text. `nil` becomes the empty string.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Nil => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::to_display_string)
                .collect::<Vec<_>>()
                .join(", "),
            Self::Object(_) => self.to_json().to_string(),
        }
    }

    /// Equality after converting `other` to the type of `self`.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        match self {
            Self::Nil => matches!(other, Self::Nil),
            Self::Bool(b) => *b == other.is_truthy(),
            #[allow(clippy::float_cmp)]
            Self::Number(n) => *n == other.to_number(),
            Self::String(s) => *s == other.to_display_string(),
            Self::List(_) | Self::Object(_) => self == other,
        }
    }

    /// Ordering used by relational operators: lexicographic for two
    /// strings, numeric otherwise. `None` when a side is NaN.
    #[must_use]
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        if let (Self::String(a), Self::String(b)) = (self, other) {
            return Some(a.cmp(b));
        }
        self.to_number().partial_cmp(&other.to_number())
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload, if any.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean payload, if any.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list payload, if any.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object payload, if any.
    #[must_use]
    pub const fn as_object(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns `true` for [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Converts a JSON document into a value. Objects keep their key order.
    #[must_use]
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Nil,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to JSON. Non-finite numbers become `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Nil => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl From<IndexMap<String, Self>> for Value {
    fn from(value: IndexMap<String, Self>) -> Self {
        Self::Object(value)
    }
}

/// Formats a number the way CVU source writes it: whole numbers without a
/// fractional part, everything else in shortest round-trip form.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
