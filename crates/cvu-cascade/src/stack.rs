//! Ordered, versioned sequence of definitions for one resolution context.

use std::sync::Arc;

use cvu_lang::ParsedDefinition;

/// Definitions applicable to one rendering context, most specific first.
///
/// Every mutation bumps [`CascadeStack::version`]; caches filled against
/// an older version are discarded on their next read.
#[derive(Debug, Clone, Default)]
pub struct CascadeStack {
    definitions: Vec<Arc<ParsedDefinition>>,
    version: u64,
}

impl CascadeStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stack from definitions already in precedence order.
    #[must_use]
    pub const fn from_definitions(definitions: Vec<Arc<ParsedDefinition>>) -> Self {
        Self {
            definitions,
            version: 0,
        }
    }

    /// Current version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Appends a definition with the lowest precedence so far.
    pub fn push(&mut self, definition: Arc<ParsedDefinition>) {
        self.definitions.push(definition);
        self.bump();
    }

    /// Inserts a definition with the highest precedence, e.g. a session view.
    pub fn push_front(&mut self, definition: Arc<ParsedDefinition>) {
        self.definitions.insert(0, definition);
        self.bump();
    }

    /// Replaces every definition, e.g. after a renderer switch.
    pub fn replace(&mut self, definitions: Vec<Arc<ParsedDefinition>>) {
        self.definitions = definitions;
        self.bump();
    }

    /// Removes every definition.
    pub fn clear(&mut self) {
        self.definitions.clear();
        self.bump();
    }

    /// Returns the definition at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<ParsedDefinition>> {
        self.definitions.get(index)
    }

    /// Iterates from most to least specific.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParsedDefinition>> {
        self.definitions.iter()
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns `true` when the stack holds no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    const fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

impl FromIterator<Arc<ParsedDefinition>> for CascadeStack {
    fn from_iter<T: IntoIterator<Item = Arc<ParsedDefinition>>>(iter: T) -> Self {
        Self::from_definitions(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvu_lang::DefinitionKind;

    fn def(name: &str) -> Arc<ParsedDefinition> {
        Arc::new(ParsedDefinition::new(DefinitionKind::TypeView, Some(name.into())))
    }

    #[test]
    fn mutations_bump_version() {
        let mut stack = CascadeStack::new();
        assert_eq!(stack.version(), 0);
        stack.push(def("a"));
        stack.push_front(def("b"));
        assert_eq!(stack.version(), 2);
        assert_eq!(stack.get(0).and_then(|d| d.selector.as_deref()), Some("b"));
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.version(), 3);
    }

    #[test]
    fn collects_in_order() {
        let stack: CascadeStack = ["x", "y"].into_iter().map(def).collect();
        let names: Vec<&str> = stack.iter().map(|d| d.selector_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
