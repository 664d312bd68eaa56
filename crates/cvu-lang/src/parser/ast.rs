//! Abstract syntax tree for CVU definition files.

use std::fmt;
use std::sync::Arc;

use cvu_common::types::{Cardinality, Domain};
use cvu_expr::Expression;
use indexmap::IndexMap;

/// Ordered property map of a definition, element or object.
pub type Properties = IndexMap<String, PropertyValue>;

/// What a top-level or nested definition describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    /// `[color = name]`: a named light/dark color pair.
    Color,
    /// `[style = name]`: reusable element properties.
    Style,
    /// `[renderer = name]`: how a view lays out its items.
    Renderer,
    /// `[language = name]`: translated strings.
    Language,
    /// `[datasource = name]`: a query description.
    Datasource,
    /// `[session = name]`: a session with its views.
    Session,
    /// `[sessions = name]`: a collection of sessions.
    Sessions,
    /// `[view = name]`: a standalone view.
    View,
    /// `.name`: a named view.
    Named,
    /// `Type`: the view of a single item of a type.
    TypeView,
    /// `Type[]`: the view of a list of items of a type.
    ListView,
    /// A nested `{ ... }` or `name { ... }` value.
    Object,
}

impl DefinitionKind {
    /// Resolves the keyword used inside `[...]` headers.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "color" => Self::Color,
            "style" => Self::Style,
            "renderer" => Self::Renderer,
            "language" => Self::Language,
            "datasource" => Self::Datasource,
            "session" => Self::Session,
            "sessions" => Self::Sessions,
            "view" => Self::View,
            _ => return None,
        })
    }

    /// The `[...]` keyword, for kinds written in bracket form.
    #[must_use]
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Color => Some("color"),
            Self::Style => Some("style"),
            Self::Renderer => Some("renderer"),
            Self::Language => Some("language"),
            Self::Datasource => Some("datasource"),
            Self::Session => Some("session"),
            Self::Sessions => Some("sessions"),
            Self::View => Some("view"),
            Self::Named | Self::TypeView | Self::ListView | Self::Object => None,
        }
    }

    /// Returns `true` for kinds that describe a view of data.
    #[must_use]
    pub const fn is_view(self) -> bool {
        matches!(
            self,
            Self::View | Self::Named | Self::TypeView | Self::ListView | Self::Session
        )
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// `nil`.
    Nil,
    /// `true` / `false`.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string or bare word.
    String(String),
    /// A hex color such as `#330000`.
    Color(String),
    /// An interpolated string or `{{ ... }}` expression.
    Expression(Expression),
    /// A list of values.
    Array(Vec<PropertyValue>),
    /// A nested object, optionally named (e.g. an action).
    Object(Box<ParsedDefinition>),
}

impl PropertyValue {
    /// Returns `true` for values written on a single line without nesting.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Returns the string payload, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested object, if any.
    #[must_use]
    pub fn as_object(&self) -> Option<&ParsedDefinition> {
        match self {
            Self::Object(def) => Some(def),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Color(_) => "color",
            Self::Expression(_) => "expression",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A UI element node such as `VStack { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct UiElement {
    /// Element kind as written, e.g. `Text`.
    pub kind: String,
    /// Element properties in source order.
    pub properties: Properties,
    /// Nested elements.
    pub children: Vec<UiElement>,
}

impl UiElement {
    /// Creates an empty element of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            properties: Properties::new(),
            children: Vec::new(),
        }
    }
}

/// A parsed definition: a header and a body.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDefinition {
    /// What the definition describes.
    pub kind: DefinitionKind,
    /// Name or type the definition applies to, if any.
    pub selector: Option<String>,
    /// Precedence tier, assigned by the loader.
    pub domain: Option<Domain>,
    /// Properties in source order.
    pub properties: Properties,
    /// UI element children.
    pub children: Vec<UiElement>,
    /// Definitions nested in the body, such as `[renderer = x] { ... }`.
    /// Shared so a cascade can stack them without copying.
    pub definitions: Vec<Arc<ParsedDefinition>>,
}

impl ParsedDefinition {
    /// Creates an empty definition.
    #[must_use]
    pub fn new(kind: DefinitionKind, selector: Option<String>) -> Self {
        Self {
            kind,
            selector,
            domain: None,
            properties: Properties::new(),
            children: Vec::new(),
            definitions: Vec::new(),
        }
    }

    /// Returns a property value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Returns the selector, or `""` when absent.
    #[must_use]
    pub fn selector_str(&self) -> &str {
        self.selector.as_deref().unwrap_or_default()
    }

    /// Returns `true` if this view definition applies to `type_name` with
    /// the given cardinality.
    #[must_use]
    pub fn matches_type(&self, type_name: &str, cardinality: Cardinality) -> bool {
        let kind_matches = match cardinality {
            Cardinality::Single => self.kind == DefinitionKind::TypeView,
            Cardinality::List => self.kind == DefinitionKind::ListView,
        };
        kind_matches && self.selector.as_deref() == Some(type_name)
    }

    /// Returns `true` for a renderer definition with the given name.
    #[must_use]
    pub fn is_renderer(&self, name: &str) -> bool {
        self.kind == DefinitionKind::Renderer && self.selector.as_deref() == Some(name)
    }

    /// Sets the domain on this definition and all nested definitions.
    pub fn assign_domain(&mut self, domain: Domain) {
        self.domain = Some(domain);
        for nested in &mut self.definitions {
            Arc::make_mut(nested).assign_domain(domain);
        }
    }

    /// Header text as written in canonical source.
    #[must_use]
    pub fn header(&self) -> String {
        let selector = self.selector.as_deref();
        match (self.kind, selector) {
            (DefinitionKind::Named, Some(name)) => format!(".{name}"),
            (DefinitionKind::TypeView, Some(name)) => name.to_string(),
            (DefinitionKind::ListView, Some(name)) => format!("{name}[]"),
            (DefinitionKind::Object, Some(name)) => name.to_string(),
            (DefinitionKind::Object, None) => String::new(),
            (kind, selector) => {
                let keyword = kind.keyword().unwrap_or_default();
                match selector {
                    Some(name) => format!("[{keyword} = {}]", quote_if_needed(name)),
                    None => format!("[{keyword}]"),
                }
            }
        }
    }
}

impl fmt::Display for DefinitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword() {
            Some(keyword) => f.write_str(keyword),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Returns `true` when `text` lexes as a single CVU identifier.
#[must_use]
pub fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '~')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '~'))
        && !matches!(text, "true" | "false" | "nil")
}

/// Writes `text` bare if it is a plain identifier, quoted otherwise.
#[must_use]
pub fn quote_if_needed(text: &str) -> String {
    if is_plain_identifier(text) {
        text.to_string()
    } else {
        quote(text)
    }
}

/// Double-quotes literal text, escaping characters the lexer would
/// otherwise interpret.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
