//! Cascade stack construction for a rendering context.

use std::sync::Arc;

use cvu_common::constants::WILDCARD_TYPE;
use cvu_common::types::{Cardinality, Domain};
use cvu_lang::schema::ViewProperty;
use cvu_lang::{DefinitionKind, ParsedDefinition, PropertyValue};

use crate::registry::DefinitionRegistry;
use crate::stack::CascadeStack;

/// What is being rendered: an item type at a cardinality, optionally with
/// an explicit renderer and a session view to put on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    /// Item type name, e.g. `Person`.
    pub type_name: String,
    /// One item or a list.
    pub cardinality: Cardinality,
    /// Renderer to use instead of the one the definitions name.
    pub renderer: Option<String>,
    /// Name of a view whose definition takes precedence over everything.
    pub session_view: Option<String>,
}

impl RenderTarget {
    /// Targets a single item of `type_name`.
    #[must_use]
    pub fn single(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            cardinality: Cardinality::Single,
            renderer: None,
            session_view: None,
        }
    }

    /// Targets a list of items of `type_name`.
    #[must_use]
    pub fn list(type_name: impl Into<String>) -> Self {
        Self {
            cardinality: Cardinality::List,
            ..Self::single(type_name)
        }
    }

    /// Forces a renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }

    /// Puts the named view at the front of the stack.
    #[must_use]
    pub fn with_session_view(mut self, name: impl Into<String>) -> Self {
        self.session_view = Some(name.into());
        self
    }
}

/// Stacks selected for one target.
#[derive(Debug, Clone)]
pub struct StackSelection {
    /// View definitions followed by top-level renderer definitions.
    pub view: CascadeStack,
    /// Renderer blocks nested in view definitions, then top-level ones.
    pub render: CascadeStack,
    /// The renderer that was chosen.
    pub renderer: String,
}

/// Selects the definitions that apply to `target`.
///
/// Phase one walks the domains in precedence order and takes, per domain,
/// the exact type definitions then the `*` wildcard ones. The renderer is
/// then fixed (the target's, else the first literal `defaultRenderer` in
/// the phase-one stack, else `fallback_renderer`) and phase two appends
/// each domain's `[renderer = name]` definitions. Nothing is deduplicated.
#[must_use]
pub fn select(
    registry: &DefinitionRegistry,
    target: &RenderTarget,
    fallback_renderer: &str,
) -> StackSelection {
    let mut views: Vec<Arc<ParsedDefinition>> = Vec::new();
    if let Some(name) = &target.session_view {
        match registry.find_view(name) {
            Some(def) => views.push(Arc::clone(def)),
            None => tracing::warn!(view = %name, "session view not found"),
        }
    }
    for domain in Domain::PRECEDENCE {
        views.extend(
            registry
                .type_views(domain, &target.type_name, target.cardinality)
                .cloned(),
        );
        if target.type_name != WILDCARD_TYPE {
            views.extend(
                registry
                    .type_views(domain, WILDCARD_TYPE, target.cardinality)
                    .cloned(),
            );
        }
    }

    let renderer = target
        .renderer
        .clone()
        .or_else(|| default_renderer(&views))
        .unwrap_or_else(|| fallback_renderer.to_string());

    let mut render: Vec<Arc<ParsedDefinition>> = views
        .iter()
        .flat_map(|def| def.definitions.iter())
        .filter(|nested| nested.is_renderer(&renderer))
        .cloned()
        .collect();

    let mut top_level = Vec::new();
    for domain in Domain::PRECEDENCE {
        top_level.extend(registry.renderers(domain, &renderer).cloned());
    }
    views.extend(top_level.iter().cloned());
    render.extend(top_level);

    tracing::debug!(
        type_name = %target.type_name,
        cardinality = %target.cardinality,
        renderer = %renderer,
        view_depth = views.len(),
        render_depth = render.len(),
        "built cascade stacks"
    );

    StackSelection {
        view: CascadeStack::from_definitions(views),
        render: CascadeStack::from_definitions(render),
        renderer,
    }
}

fn default_renderer(views: &[Arc<ParsedDefinition>]) -> Option<String> {
    views
        .iter()
        .filter(|def| def.kind != DefinitionKind::Renderer)
        .find_map(|def| match def.get(ViewProperty::DefaultRenderer.key()) {
            Some(PropertyValue::String(name)) => Some(name.clone()),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(sources: &[(Domain, &str)]) -> DefinitionRegistry {
        let mut registry = DefinitionRegistry::new();
        for (i, (domain, text)) in sources.iter().enumerate() {
            let _ = registry
                .load_source(*domain, &format!("{i}.cvu"), text)
                .expect("should load");
        }
        registry
    }

    fn headers(stack: &CascadeStack) -> Vec<String> {
        stack
            .iter()
            .map(|d| format!("{}@{}", d.header(), d.domain.map_or("-", Domain::as_str)))
            .collect()
    }

    #[test]
    fn phase_one_orders_domains_then_wildcards() {
        let registry = registry(&[
            (Domain::Defaults, "Person {}\n* {}\n[renderer = list] {}"),
            (Domain::User, "Person {}\n* {}"),
            (Domain::Session, "Person {}"),
        ]);
        let selection = select(&registry, &RenderTarget::single("Person"), "list");
        assert_eq!(
            headers(&selection.view),
            vec![
                "Person@session",
                "Person@user",
                "*@user",
                "Person@defaults",
                "*@defaults",
                "[renderer = list]@defaults",
            ]
        );
        assert_eq!(selection.renderer, "list");
    }

    #[test]
    fn cardinality_selects_list_views() {
        let registry = registry(&[(Domain::Defaults, "Person {}\nPerson[] {}\n*[] {}")]);
        let selection = select(&registry, &RenderTarget::list("Person"), "list");
        assert_eq!(headers(&selection.view), vec!["Person[]@defaults", "*[]@defaults"]);
    }

    #[test]
    fn renderer_taken_from_definitions() {
        let registry = registry(&[
            (Domain::Defaults, "Person[] { defaultRenderer: list }\n[renderer = grid] {}\n[renderer = list] {}"),
            (Domain::User, "Person[] { defaultRenderer: grid }"),
        ]);
        let selection = select(&registry, &RenderTarget::list("Person"), "list");
        assert_eq!(selection.renderer, "grid");
        assert_eq!(
            headers(&selection.render),
            vec!["[renderer = grid]@defaults"]
        );

        let forced = select(
            &registry,
            &RenderTarget::list("Person").with_renderer("list"),
            "grid",
        );
        assert_eq!(forced.renderer, "list");
    }

    #[test]
    fn fallback_renderer_when_nothing_names_one() {
        let registry = registry(&[(Domain::Defaults, "Note {}")]);
        let selection = select(&registry, &RenderTarget::single("Note"), "thumbnail");
        assert_eq!(selection.renderer, "thumbnail");
        assert!(selection.render.is_empty());
    }

    #[test]
    fn nested_renderers_precede_top_level_ones() {
        let registry = registry(&[
            (Domain::Defaults, "[renderer = list] { spacing: 1 }"),
            (Domain::User, "Person { [renderer = list] { spacing: 2 } }"),
        ]);
        let selection = select(&registry, &RenderTarget::single("Person"), "list");
        let spacings: Vec<_> = selection
            .render
            .iter()
            .map(|d| d.get("spacing").cloned())
            .collect();
        assert_eq!(
            spacings,
            vec![
                Some(PropertyValue::Number(2.0)),
                Some(PropertyValue::Number(1.0)),
            ]
        );
    }

    #[test]
    fn nested_renderers_are_shared_not_copied() {
        let registry = registry(&[(Domain::User, "Person { [renderer = list] { spacing: 2 } }")]);
        let loaded = registry
            .type_views(Domain::User, "Person", Cardinality::Single)
            .next()
            .map(|def| Arc::clone(&def.definitions[0]))
            .expect("nested renderer");
        for _ in 0..2 {
            let selection = select(&registry, &RenderTarget::single("Person"), "list");
            let stacked = selection.render.get(0).expect("render definition");
            assert!(Arc::ptr_eq(stacked, &loaded));
            assert_eq!(stacked.domain, Some(Domain::User));
        }
    }

    #[test]
    fn session_view_goes_first() {
        let registry = registry(&[
            (Domain::Defaults, "Person { title: \"d\" }"),
            (Domain::User, ".mine { title: \"mine\" }"),
        ]);
        let target = RenderTarget::single("Person").with_session_view("mine");
        let selection = select(&registry, &target, "list");
        assert_eq!(headers(&selection.view), vec![".mine@user", "Person@defaults"]);
    }
}
