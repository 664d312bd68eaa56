//! The seam between the evaluator and the data it reads.
//!
//! A [`Host`] resolves variable chains and executes calls. Embedders with
//! a real data graph implement it directly; [`FnHost`] adapts a pair of
//! closures and [`MemoryHost`] serves plain in-memory values.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use cvu_common::types::Cardinality;

use crate::arguments::Arguments;
use crate::ast::{ExprNode, Variable, VariableKind};
use crate::error::EvalError;
use crate::interpreter::Interpreter;
use crate::value::Value;

/// Resolves lookups and calls on behalf of the interpreter.
pub trait Host {
    /// Resolves a lookup chain of variables and filter predicates.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] when the chain cannot be resolved.
    fn lookup(&self, chain: &[ExprNode], arguments: &Arguments) -> Result<Value, EvalError>;

    /// Executes the function or method named by `lookup`. The arguments
    /// have already been evaluated.
    ///
    /// # Errors
    ///
    /// Returns an [`EvalError`] when the callee is unknown or fails.
    fn exec(
        &self,
        lookup: &[ExprNode],
        args: Vec<Value>,
        arguments: &Arguments,
    ) -> Result<Value, EvalError>;
}

/// A host built from two closures.
pub struct FnHost<L, E> {
    lookup: L,
    exec: E,
}

impl<L, E> FnHost<L, E>
where
    L: Fn(&[ExprNode], &Arguments) -> Result<Value, EvalError>,
    E: Fn(&[ExprNode], Vec<Value>, &Arguments) -> Result<Value, EvalError>,
{
    /// Wraps a lookup closure and an exec closure.
    pub const fn new(lookup: L, exec: E) -> Self {
        Self { lookup, exec }
    }
}

impl<L, E> Host for FnHost<L, E>
where
    L: Fn(&[ExprNode], &Arguments) -> Result<Value, EvalError>,
    E: Fn(&[ExprNode], Vec<Value>, &Arguments) -> Result<Value, EvalError>,
{
    fn lookup(&self, chain: &[ExprNode], arguments: &Arguments) -> Result<Value, EvalError> {
        (self.lookup)(chain, arguments)
    }

    fn exec(
        &self,
        lookup: &[ExprNode],
        args: Vec<Value>,
        arguments: &Arguments,
    ) -> Result<Value, EvalError> {
        (self.exec)(lookup, args, arguments)
    }
}

type Function = Box<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

/// A host over in-memory values.
///
/// Lookups start from the named argument, falling back to a property of
/// the current item, and walk object properties from there. Missing
/// properties resolve to `nil`. Edge traversal is not available since
/// plain values carry no graph.
///
/// Calls resolve to registered functions first, then the builtins
/// `min`, `max`, `floor`, `ceil` and `round`. A call on a longer chain
/// invokes a method on the value the rest of the chain resolves to:
/// `uppercased`, `lowercased`, `count`, `first`, `last`, `join` and
/// `contains`.
#[derive(Default)]
pub struct MemoryHost {
    functions: HashMap<String, Function>,
}

impl fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryHost")
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MemoryHost {
    /// Creates a host with only the builtins.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a global function, shadowing any builtin of that name.
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        let _ = self.functions.insert(name.into(), Box::new(function));
    }

    fn root(var: &Variable, arguments: &Arguments) -> Value {
        if var.is_current_item() {
            return arguments.item().cloned().unwrap_or_default();
        }
        if let Some(value) = arguments.get(&var.name) {
            return value.clone();
        }
        arguments
            .item()
            .map_or(Value::Nil, |item| property(item, &var.name))
    }

    fn apply_filter(
        &self,
        value: Value,
        filter: &ExprNode,
        arguments: &Arguments,
    ) -> Result<Value, EvalError> {
        let mut kept = Vec::new();
        for element in into_list(value) {
            let scoped = arguments.with_item(element.clone());
            if Interpreter::new(self, &scoped).execute(filter)?.is_truthy() {
                kept.push(element);
            }
        }
        Ok(Value::List(kept))
    }

    fn call_builtin(name: &str, args: &[Value]) -> Result<Value, EvalError> {
        let numbers = || -> Vec<f64> {
            args.iter()
                .flat_map(|a| match a {
                    Value::List(items) => items.iter().map(Value::to_number).collect(),
                    other => vec![other.to_number()],
                })
                .collect()
        };
        let single = || -> Result<f64, EvalError> {
            match args {
                [value] => Ok(value.to_number()),
                _ => Err(EvalError::InvalidArguments {
                    name: name.to_string(),
                    message: format!("expected 1 argument, got {}", args.len()),
                }),
            }
        };
        match name {
            "min" => Ok(numbers().into_iter().reduce(f64::min).map_or(Value::Nil, Value::Number)),
            "max" => Ok(numbers().into_iter().reduce(f64::max).map_or(Value::Nil, Value::Number)),
            "floor" => single().map(|n| Value::Number(n.floor())),
            "ceil" => single().map(|n| Value::Number(n.ceil())),
            "round" => single().map(|n| Value::Number(n.round())),
            _ => Err(EvalError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn call_method(receiver: &Value, name: &str, args: &[Value]) -> Result<Value, EvalError> {
        match name {
            "uppercased" => Ok(Value::String(receiver.to_display_string().to_uppercase())),
            "lowercased" => Ok(Value::String(receiver.to_display_string().to_lowercase())),
            "count" => {
                let count = match receiver {
                    Value::Nil => 0,
                    Value::List(items) => items.len(),
                    Value::Object(map) => map.len(),
                    Value::String(s) => s.chars().count(),
                    Value::Bool(_) | Value::Number(_) => 1,
                };
                Ok(Value::Number(count as f64))
            }
            "first" => Ok(into_list(receiver.clone()).into_iter().next().unwrap_or_default()),
            "last" => Ok(into_list(receiver.clone()).pop().unwrap_or_default()),
            "join" => {
                let separator = args
                    .first()
                    .map_or_else(|| ", ".to_string(), Value::to_display_string);
                Ok(Value::String(
                    into_list(receiver.clone())
                        .iter()
                        .map(Value::to_display_string)
                        .collect::<Vec<_>>()
                        .join(&separator),
                ))
            }
            "contains" => {
                let Some(needle) = args.first() else {
                    return Err(EvalError::InvalidArguments {
                        name: name.to_string(),
                        message: "expected 1 argument".to_string(),
                    });
                };
                let found = match receiver {
                    Value::String(s) => s.contains(&needle.to_display_string()),
                    Value::List(items) => items.iter().any(|item| item.loose_eq(needle)),
                    Value::Object(map) => map.contains_key(&needle.to_display_string()),
                    _ => false,
                };
                Ok(Value::Bool(found))
            }
            _ => Err(EvalError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }
}

/// Reads a property from an object, or from every element of a list.
fn property(value: &Value, name: &str) -> Value {
    match value {
        Value::Object(map) => map.get(name).cloned().unwrap_or_default(),
        Value::List(items) => Value::List(
            items
                .iter()
                .map(|item| property(item, name))
                .flat_map(|v| match v {
                    Value::List(inner) => inner,
                    Value::Nil => Vec::new(),
                    other => vec![other],
                })
                .collect(),
        ),
        _ => Value::Nil,
    }
}

fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::List(items) => items,
        Value::Nil => Vec::new(),
        other => vec![other],
    }
}

impl Host for MemoryHost {
    fn lookup(&self, chain: &[ExprNode], arguments: &Arguments) -> Result<Value, EvalError> {
        let mut current: Option<Value> = None;
        for step in chain {
            match step {
                ExprNode::Variable(var) => {
                    if var.kind != VariableKind::PropertyOrItem {
                        return Err(EvalError::Lookup {
                            message: format!("cannot traverse edge `{var}` on plain values"),
                        });
                    }
                    let next = match &current {
                        None => Self::root(var, arguments),
                        Some(value) => property(value, &var.name),
                    };
                    current = Some(match var.cardinality {
                        Cardinality::List => Value::List(into_list(next)),
                        Cardinality::Single => next,
                    });
                }
                filter => {
                    let value = current.take().unwrap_or_default();
                    current = Some(self.apply_filter(value, filter, arguments)?);
                }
            }
        }
        Ok(current.unwrap_or_default())
    }

    fn exec(
        &self,
        lookup: &[ExprNode],
        args: Vec<Value>,
        arguments: &Arguments,
    ) -> Result<Value, EvalError> {
        let Some((ExprNode::Variable(callee), receiver)) = lookup.split_last() else {
            return Err(EvalError::Exec {
                message: "call target must end in a name".to_string(),
            });
        };
        debug!(function = %callee, arguments = args.len(), "memory host call");
        if receiver.is_empty() {
            if let Some(function) = self.functions.get(&callee.name) {
                return function(&args);
            }
            return Self::call_builtin(&callee.name, &args);
        }
        let target = self.lookup(receiver, arguments)?;
        Self::call_method(&target, &callee.name, &args)
    }
}
