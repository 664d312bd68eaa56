//! Renderer configuration and resolved UI element trees.

use cvu_common::constants::DEFAULT_RENDER_GROUP;
use cvu_expr::{Arguments, Value};
use cvu_lang::schema::ElementProperty;
use cvu_lang::{PropertyValue, UiElement};
use indexmap::IndexMap;

use crate::cascadable::Cascadable;
use crate::error::{CascadeError, Result};
use crate::eval::resolve_value;

/// A UI element with every property evaluated for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement {
    /// Element kind, e.g. `Text`.
    pub kind: String,
    /// Evaluated properties in source order.
    pub properties: IndexMap<String, Value>,
    /// Visible child elements.
    pub children: Vec<ResolvedElement>,
}

impl ResolvedElement {
    /// Returns an evaluated property.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Resolves renderer properties and render groups.
#[derive(Debug)]
pub struct CascadingRenderConfig {
    cascade: Cascadable,
}

impl CascadingRenderConfig {
    /// Wraps a resolver over renderer definitions.
    #[must_use]
    pub const fn new(cascade: Cascadable) -> Self {
        Self { cascade }
    }

    /// The underlying resolver, for renderer properties such as `spacing`.
    pub const fn cascade(&mut self) -> &mut Cascadable {
        &mut self.cascade
    }

    /// Names of the render groups the stack defines. `*` is listed first
    /// when some renderer has element children.
    #[must_use]
    pub fn groups(&self) -> Vec<String> {
        let mut groups = Vec::new();
        if self.cascade.stack().iter().any(|def| !def.children.is_empty()) {
            groups.push(DEFAULT_RENDER_GROUP.to_string());
        }
        for def in self.cascade.stack().iter() {
            for (key, value) in &def.properties {
                let is_group = value.as_object().is_some_and(|o| !o.children.is_empty());
                if is_group && !groups.contains(key) {
                    groups.push(key.clone());
                }
            }
        }
        groups
    }

    /// Resolves the element tree of `group` for `item`.
    ///
    /// Group `*` is the element children of the first renderer definition
    /// that has any; other groups are object properties whose body holds
    /// elements, taken from the first definition that sets them. `item` is
    /// bound as the current item on top of the view arguments and
    /// `arguments`. Elements whose `show` evaluates falsy are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::UnknownRenderGroup`] if no definition holds
    /// the group, or [`CascadeError::Eval`] if an element property fails.
    pub fn render(
        &self,
        group: &str,
        item: Value,
        arguments: &Arguments,
    ) -> Result<Vec<ResolvedElement>> {
        let elements = self
            .group_elements(group)
            .ok_or_else(|| CascadeError::UnknownRenderGroup(group.to_string()))?;

        let mut scope = self.cascade.arguments().clone();
        for (name, value) in arguments.iter() {
            let _ = scope.insert(name, value.clone());
        }
        let scope = scope.with_item(item);

        tracing::debug!(group, elements = elements.len(), "rendering group");
        let mut out = Vec::with_capacity(elements.len());
        for element in elements {
            if let Some(resolved) = self.resolve_element(element, &scope)? {
                out.push(resolved);
            }
        }
        Ok(out)
    }

    fn group_elements(&self, group: &str) -> Option<&[UiElement]> {
        let mut stack = self.cascade.stack().iter();
        if group == DEFAULT_RENDER_GROUP {
            return stack
                .find(|def| !def.children.is_empty())
                .map(|def| def.children.as_slice());
        }
        stack.find_map(|def| match def.get(group) {
            Some(PropertyValue::Object(object)) => Some(object.children.as_slice()),
            _ => None,
        })
    }

    fn resolve_element(
        &self,
        element: &UiElement,
        scope: &Arguments,
    ) -> Result<Option<ResolvedElement>> {
        let show = ElementProperty::Show.key();
        if let Some(raw) = element.properties.get(show) {
            if !self.evaluate(show, raw, scope)?.is_truthy() {
                return Ok(None);
            }
        }

        let mut properties = IndexMap::with_capacity(element.properties.len());
        for (key, raw) in &element.properties {
            let _ = properties.insert(key.clone(), self.evaluate(key, raw, scope)?);
        }
        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            if let Some(resolved) = self.resolve_element(child, scope)? {
                children.push(resolved);
            }
        }
        Ok(Some(ResolvedElement {
            kind: element.kind.clone(),
            properties,
            children,
        }))
    }

    fn evaluate(&self, name: &str, raw: &PropertyValue, scope: &Arguments) -> Result<Value> {
        resolve_value(raw, self.cascade.host(), scope).map_err(|error| CascadeError::Eval {
            property: name.to_string(),
            error,
        })
    }
}
