//! Typed access to the effective properties of a view.

use std::rc::Rc;

use cvu_expr::{Arguments, Host, Value};
use cvu_lang::schema::ViewProperty;
use indexmap::IndexMap;

use crate::cascadable::Cascadable;
use crate::error::Result;
use crate::render::CascadingRenderConfig;
use crate::selector::StackSelection;
use crate::stack::CascadeStack;

/// A view resolved for one rendering context.
#[derive(Debug)]
pub struct CascadingView {
    cascade: Cascadable,
    render_stack: CascadeStack,
    renderer: String,
}

impl CascadingView {
    /// Creates a view from selected stacks.
    #[must_use]
    pub fn new(selection: StackSelection, arguments: Arguments, host: Rc<dyn Host>) -> Self {
        Self {
            cascade: Cascadable::new(selection.view, arguments, host),
            render_stack: selection.render,
            renderer: selection.renderer,
        }
    }

    /// Name of the renderer the stacks were built for.
    #[must_use]
    pub fn renderer_name(&self) -> &str {
        &self.renderer
    }

    /// The underlying resolver, for properties without a typed accessor.
    pub const fn cascade(&mut self) -> &mut Cascadable {
        &mut self.cascade
    }

    /// Read-only access to the underlying resolver.
    #[must_use]
    pub const fn cascade_ref(&self) -> &Cascadable {
        &self.cascade
    }

    /// A render configuration over this view's renderer definitions,
    /// sharing its arguments and host.
    #[must_use]
    pub fn render_config(&self) -> CascadingRenderConfig {
        CascadingRenderConfig::new(Cascadable::new(
            self.render_stack.clone(),
            self.cascade.arguments().clone(),
            self.cascade.host_handle(),
        ))
    }

    /// The effective title.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning expression fails.
    pub fn title(&mut self) -> Result<Option<String>> {
        self.text(ViewProperty::Title)
    }

    /// The effective subtitle.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning expression fails.
    pub fn subtitle(&mut self) -> Result<Option<String>> {
        self.text(ViewProperty::Subtitle)
    }

    /// Text shown when the view has no items.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning expression fails.
    pub fn empty_result_text(&mut self) -> Result<Option<String>> {
        self.text(ViewProperty::EmptyResultText)
    }

    /// Placeholder of the search field.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning expression fails.
    pub fn search_hint(&mut self) -> Result<Option<String>> {
        self.text(ViewProperty::SearchHint)
    }

    /// Whether labels are shown; `true` unless a definition says otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the winning expression fails.
    pub fn show_labels(&mut self) -> Result<bool> {
        Ok(self
            .cascade
            .resolve_scalar_or(ViewProperty::ShowLabels.key(), Value::Bool(true))?
            .is_truthy())
    }

    /// Sort fields from every level, most specific first.
    ///
    /// # Errors
    ///
    /// Returns an error if a contributing expression fails.
    pub fn sort_fields(&self) -> Result<Vec<String>> {
        Ok(self
            .cascade
            .resolve_list(ViewProperty::SortFields.key(), true)?
            .iter()
            .map(Value::to_display_string)
            .collect())
    }

    /// Filter buttons from every level, most specific first.
    ///
    /// # Errors
    ///
    /// Returns an error if a contributing expression fails.
    pub fn filter_buttons(&self) -> Result<Vec<Value>> {
        self.cascade
            .resolve_list(ViewProperty::FilterButtons.key(), true)
    }

    /// Context buttons from every level, most specific first.
    ///
    /// # Errors
    ///
    /// Returns an error if a contributing expression fails.
    pub fn context_buttons(&self) -> Result<Vec<Value>> {
        self.cascade
            .resolve_list(ViewProperty::ContextButtons.key(), true)
    }

    /// Merged user state, higher levels winning per key.
    ///
    /// # Errors
    ///
    /// Returns an error if a contributing expression fails.
    pub fn user_state(&self) -> Result<IndexMap<String, Value>> {
        self.cascade
            .resolve_dict(ViewProperty::UserState.key(), IndexMap::new(), false)
    }

    /// Merged view arguments, higher levels winning per key.
    ///
    /// # Errors
    ///
    /// Returns an error if a contributing expression fails.
    pub fn view_arguments(&self) -> Result<IndexMap<String, Value>> {
        self.cascade
            .resolve_dict(ViewProperty::ViewArguments.key(), IndexMap::new(), false)
    }

    /// Resolves every property set anywhere in the stack, in first-seen
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if a winning expression fails.
    pub fn resolved_properties(&mut self) -> Result<IndexMap<String, Value>> {
        let mut names: Vec<String> = Vec::new();
        for def in self.cascade.stack().iter() {
            for key in def.properties.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }
        let mut out = IndexMap::with_capacity(names.len());
        for name in names {
            if let Some(value) = self.cascade.resolve_scalar(&name)? {
                let _ = out.insert(name, value);
            }
        }
        Ok(out)
    }

    fn text(&mut self, property: ViewProperty) -> Result<Option<String>> {
        Ok(self
            .cascade
            .resolve_scalar(property.key())?
            .filter(|value| !value.is_nil())
            .map(|value| value.to_display_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvu_common::types::Domain;
    use cvu_expr::MemoryHost;

    use crate::registry::DefinitionRegistry;
    use crate::selector::{RenderTarget, select};

    fn view(sources: &[(Domain, &str)], target: &RenderTarget, arguments: Arguments) -> CascadingView {
        let mut registry = DefinitionRegistry::new();
        for (i, (domain, text)) in sources.iter().enumerate() {
            let _ = registry
                .load_source(*domain, &format!("{i}.cvu"), text)
                .expect("should load");
        }
        CascadingView::new(
            select(&registry, target, "list"),
            arguments,
            Rc::new(MemoryHost::new()),
        )
    }

    #[test]
    fn typed_accessors() {
        let mut view = view(
            &[
                (
                    Domain::Defaults,
                    "Person[] { title: \"People\"; showLabels: false; sortFields: name\n\
                     userState: { selectMode: false, mode: list } }",
                ),
                (
                    Domain::User,
                    "Person[] { title: \"{count} people\"; sortFields: age\n\
                     userState: { mode: grid } }",
                ),
            ],
            &RenderTarget::list("Person"),
            Arguments::new().with("count", 2.0),
        );
        assert_eq!(view.title().expect("ok").as_deref(), Some("2 people"));
        assert_eq!(view.subtitle().expect("ok"), None);
        assert!(!view.show_labels().expect("ok"));
        assert_eq!(view.sort_fields().expect("ok"), vec!["age", "name"]);
        let state = view.user_state().expect("ok");
        assert_eq!(state["mode"], Value::from("grid"));
        assert_eq!(state["selectMode"], Value::Bool(false));
    }

    #[test]
    fn show_labels_defaults_to_true() {
        let mut view = view(
            &[(Domain::Defaults, "Note {}")],
            &RenderTarget::single("Note"),
            Arguments::new(),
        );
        assert!(view.show_labels().expect("ok"));
        assert_eq!(view.renderer_name(), "list");
    }

    #[test]
    fn resolved_properties_take_winning_values() {
        let mut view = view(
            &[
                (Domain::Defaults, "Note { title: \"d\"; icon: note }"),
                (Domain::User, "Note { title: \"u\" }"),
            ],
            &RenderTarget::single("Note"),
            Arguments::new(),
        );
        let props = view.resolved_properties().expect("ok");
        let pairs: Vec<(&str, String)> = props
            .iter()
            .map(|(k, v)| (k.as_str(), v.to_display_string()))
            .collect();
        assert_eq!(pairs, vec![("title", "u".to_string()), ("icon", "note".to_string())]);
    }
}
