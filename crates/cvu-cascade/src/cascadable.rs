//! Property resolution over a cascade stack.
//!
//! A [`Cascadable`] answers three kinds of question against its stack:
//!
//! - **scalar**: the first definition that sets the property wins;
//! - **list**: every definition contributes, concatenated in stack order;
//! - **dict**: key-wise merge where a key set at a higher precedence level
//!   is never overwritten by a lower one, and the caller's default
//!   dictionary is the lowest level.
//!
//! Expressions are evaluated on every read. Only the location of the
//! winning definition is memoized, tagged with the stack version it was
//! computed against.

use std::collections::HashMap;
use std::rc::Rc;

use cvu_expr::{Arguments, Host, Value};
use cvu_lang::PropertyValue;
use indexmap::IndexMap;

use crate::error::{CascadeError, Result};
use crate::eval::resolve_value;
use crate::stack::CascadeStack;

/// Memoized definition locations, valid for one stack version.
#[derive(Debug, Default)]
struct LocationCache {
    version: u64,
    locations: HashMap<String, Option<usize>>,
}

/// Resolves properties against a cascade stack, evaluating expressions
/// through an injected [`Host`].
pub struct Cascadable {
    stack: CascadeStack,
    arguments: Arguments,
    host: Rc<dyn Host>,
    cache: LocationCache,
}

impl std::fmt::Debug for Cascadable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cascadable")
            .field("stack", &self.stack)
            .field("arguments", &self.arguments)
            .finish_non_exhaustive()
    }
}

impl Cascadable {
    /// Creates a resolver over `stack`.
    #[must_use]
    pub fn new(stack: CascadeStack, arguments: Arguments, host: Rc<dyn Host>) -> Self {
        let cache = LocationCache {
            version: stack.version(),
            locations: HashMap::new(),
        };
        Self {
            stack,
            arguments,
            host,
            cache,
        }
    }

    /// The stack being resolved against.
    #[must_use]
    pub const fn stack(&self) -> &CascadeStack {
        &self.stack
    }

    /// Mutable access to the stack. Any change invalidates memoized
    /// locations on the next read.
    pub const fn stack_mut(&mut self) -> &mut CascadeStack {
        &mut self.stack
    }

    /// View arguments expressions are evaluated with.
    #[must_use]
    pub const fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    /// Replaces the view arguments.
    pub fn set_arguments(&mut self, arguments: Arguments) {
        self.arguments = arguments;
    }

    /// The evaluation host.
    #[must_use]
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// A shared handle to the evaluation host.
    #[must_use]
    pub fn host_handle(&self) -> Rc<dyn Host> {
        Rc::clone(&self.host)
    }

    /// Drops every memoized location.
    pub fn invalidate(&mut self) {
        self.cache.locations.clear();
        self.cache.version = self.stack.version();
    }

    /// Index of the first definition that sets `name`.
    fn locate(&mut self, name: &str) -> Option<usize> {
        if self.cache.version != self.stack.version() {
            tracing::debug!(
                from = self.cache.version,
                to = self.stack.version(),
                "stack changed, dropping cached locations"
            );
            self.invalidate();
        }
        if let Some(location) = self.cache.locations.get(name) {
            return *location;
        }
        let location = self
            .stack
            .iter()
            .position(|def| def.properties.contains_key(name));
        let _ = self.cache.locations.insert(name.to_string(), location);
        location
    }

    /// The unevaluated value of the first definition that sets `name`.
    pub fn resolve_raw(&mut self, name: &str) -> Option<&PropertyValue> {
        let index = self.locate(name)?;
        self.stack.get(index).and_then(|def| def.get(name))
    }

    /// The effective value of `name`, with expressions evaluated now.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Eval`] if the winning value holds an
    /// expression that fails.
    pub fn resolve_scalar(&mut self, name: &str) -> Result<Option<Value>> {
        let Some(index) = self.locate(name) else {
            return Ok(None);
        };
        let Some(raw) = self.stack.get(index).and_then(|def| def.get(name)) else {
            return Ok(None);
        };
        self.evaluate(name, raw).map(Some)
    }

    /// Like [`Cascadable::resolve_scalar`], falling back to `default`.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Eval`] if the winning expression fails.
    pub fn resolve_scalar_or(&mut self, name: &str, default: Value) -> Result<Value> {
        Ok(self.resolve_scalar(name)?.unwrap_or(default))
    }

    /// Concatenates `name` across the stack. Scalars count as one element
    /// and expressions yielding lists are flattened. With `merge` set to
    /// `false` only the first definition that sets `name` contributes.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Eval`] if a contributing expression fails.
    pub fn resolve_list(&self, name: &str, merge: bool) -> Result<Vec<Value>> {
        let mut out = Vec::new();
        for def in self.stack.iter() {
            let Some(raw) = def.get(name) else {
                continue;
            };
            match self.evaluate(name, raw)? {
                Value::List(items) => out.extend(items),
                Value::Nil => {}
                value => out.push(value),
            }
            if !merge {
                break;
            }
        }
        Ok(out)
    }

    /// Merges the dictionaries `name` holds across the stack.
    ///
    /// Keys set at a higher precedence level are kept; `default` is the
    /// lowest level. With `force_array`, every level's value for a key is
    /// accumulated into a list instead, in precedence order with the
    /// default last. Levels whose value is not a dictionary are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::Eval`] if a contributing expression fails.
    pub fn resolve_dict(
        &self,
        name: &str,
        default: IndexMap<String, Value>,
        force_array: bool,
    ) -> Result<IndexMap<String, Value>> {
        let mut merged: IndexMap<String, Value> = IndexMap::new();
        let mut levels = Vec::new();
        for def in self.stack.iter() {
            if let Some(raw) = def.get(name) {
                if let Value::Object(map) = self.evaluate(name, raw)? {
                    levels.push(map);
                }
            }
        }
        levels.push(default);

        for level in levels {
            for (key, value) in level {
                if force_array {
                    let slot = merged
                        .entry(key)
                        .or_insert_with(|| Value::List(Vec::new()));
                    if let Value::List(items) = slot {
                        match value {
                            Value::List(values) => items.extend(values),
                            other => items.push(other),
                        }
                    }
                } else {
                    let _ = merged.entry(key).or_insert(value);
                }
            }
        }
        Ok(merged)
    }

    fn evaluate(&self, name: &str, raw: &PropertyValue) -> Result<Value> {
        resolve_value(raw, self.host.as_ref(), &self.arguments).map_err(|error| {
            CascadeError::Eval {
                property: name.to_string(),
                error,
            }
        })
    }
}
