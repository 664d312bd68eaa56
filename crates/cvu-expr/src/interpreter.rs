//! Tree-walking evaluator for [`ExprNode`] trees.

use std::cmp::Ordering;

use tracing::trace;

use crate::arguments::Arguments;
use crate::ast::{BinaryOp, ExprNode};
use crate::error::EvalError;
use crate::host::Host;
use crate::value::Value;

/// Evaluates an AST against a host and an argument set.
///
/// `and`, `or` and the conditional evaluate lazily, so a branch that is
/// not taken never reaches the host.
pub struct Interpreter<'a> {
    host: &'a dyn Host,
    arguments: &'a Arguments,
}

impl<'a> Interpreter<'a> {
    /// Creates an interpreter bound to a host and its arguments.
    #[must_use]
    pub fn new(host: &'a dyn Host, arguments: &'a Arguments) -> Self {
        Self { host, arguments }
    }

    /// Evaluates a node.
    ///
    /// # Errors
    ///
    /// Propagates any [`EvalError`] raised by the host's lookup or call.
    pub fn execute(&self, node: &ExprNode) -> Result<Value, EvalError> {
        match node {
            ExprNode::Number(n) => Ok(Value::Number(*n)),
            ExprNode::String(s) => Ok(Value::String(s.clone())),
            ExprNode::Bool(b) => Ok(Value::Bool(*b)),
            ExprNode::Nil => Ok(Value::Nil),
            ExprNode::Variable(_) => self.lookup(std::slice::from_ref(node)),
            ExprNode::Lookup(chain) => self.lookup(chain),
            ExprNode::Call { lookup, arguments } => {
                let values = arguments
                    .iter()
                    .map(|arg| self.execute(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                trace!(callee = %ExprNode::Lookup(lookup.clone()), "calling host");
                self.host.exec(lookup, values, self.arguments)
            }
            ExprNode::BinaryOp { op, lhs, rhs } => self.binary(*op, lhs, rhs),
            ExprNode::Condition {
                condition,
                on_true,
                on_false,
            } => {
                if self.execute(condition)?.is_truthy() {
                    self.execute(on_true)
                } else {
                    self.execute(on_false)
                }
            }
            ExprNode::Negation(inner) => Ok(Value::Bool(!self.execute(inner)?.is_truthy())),
            ExprNode::NumberCoercion { inner, negate } => {
                let n = self.execute(inner)?.to_number();
                Ok(Value::Number(if *negate { -n } else { n }))
            }
            ExprNode::StringMode(fragments) => {
                let mut text = String::new();
                for fragment in fragments {
                    text.push_str(&self.execute(fragment)?.to_display_string());
                }
                Ok(Value::String(text))
            }
        }
    }

    fn lookup(&self, chain: &[ExprNode]) -> Result<Value, EvalError> {
        self.host.lookup(chain, self.arguments)
    }

    fn binary(&self, op: BinaryOp, lhs: &ExprNode, rhs: &ExprNode) -> Result<Value, EvalError> {
        let left = self.execute(lhs)?;
        match op {
            BinaryOp::And => {
                if left.is_truthy() {
                    self.execute(rhs)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.execute(rhs)
                }
            }
            _ => {
                let right = self.execute(rhs)?;
                Ok(apply_strict(op, &left, &right))
            }
        }
    }
}

fn apply_strict(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let ordering = || left.compare(right);
    match op {
        BinaryOp::Equals => Value::Bool(left.loose_eq(right)),
        BinaryOp::NotEquals => Value::Bool(!left.loose_eq(right)),
        BinaryOp::GreaterThan => Value::Bool(ordering() == Some(Ordering::Greater)),
        BinaryOp::GreaterThanOrEqual => Value::Bool(matches!(
            ordering(),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::LessThan => Value::Bool(ordering() == Some(Ordering::Less)),
        BinaryOp::LessThanOrEqual => {
            Value::Bool(matches!(ordering(), Some(Ordering::Less | Ordering::Equal)))
        }
        BinaryOp::Add => Value::Number(left.to_number() + right.to_number()),
        BinaryOp::Subtract => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Multiply => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Divide => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::And | BinaryOp::Or => Value::Nil,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use crate::parser::parse;

    fn eval(source: &str) -> Value {
        let host = MemoryHost::new();
        let args = Arguments::new();
        let ast = parse(source, false).expect("should parse");
        Interpreter::new(&host, &args)
            .execute(&ast)
            .expect("should evaluate")
    }

    #[test]
    fn arithmetic_follows_precedence() {
        let n = eval("(5 + 10 * 2 - 3 / 3) / 5.5").to_number();
        assert!((n - 4.363_636).abs() < 1e-5);
        assert!((eval("5 + 10 * 2 / 4 - 3 / 3.5").to_number() - 9.142_857).abs() < 1e-5);
    }

    #[test]
    fn and_or_return_operands() {
        assert_eq!(eval("0 or 'fallback'"), Value::from("fallback"));
        assert_eq!(eval("'a' and 'b'"), Value::from("b"));
        assert_eq!(eval("'' and 'b'"), Value::from(""));
        assert_eq!(eval("nil or false"), Value::Bool(false));
    }

    #[test]
    fn comparisons() {
        assert_eq!(eval("5 > 3"), Value::Bool(true));
        assert_eq!(eval("5 <= 3"), Value::Bool(false));
        assert_eq!(eval("'apple' < 'banana'"), Value::Bool(true));
        assert_eq!(eval("1 = '1'"), Value::Bool(true));
        assert_eq!(eval("'a' != 'a'"), Value::Bool(false));
    }

    #[test]
    fn non_numeric_arithmetic_is_nan() {
        assert!(eval("'asdasd' + 1").to_number().is_nan());
        assert!(eval("-'x'").to_number().is_nan());
        assert_eq!(eval("+'4'"), Value::Number(4.0));
    }

    #[test]
    fn negation_uses_truthiness() {
        assert_eq!(eval("!''"), Value::Bool(true));
        assert_eq!(eval("!!5"), Value::Bool(true));
    }

    #[test]
    fn conditional_chain() {
        assert_eq!(
            eval("false ? 'no' : 0 ? 'zero' : 'yes'"),
            Value::from("yes")
        );
    }

    #[test]
    fn string_mode_concatenates_display_text() {
        let host = MemoryHost::new();
        let args = Arguments::new().with("n", 3).with("who", "Ana");
        let ast = parse("{who} has {n} item{n = 1 ? '' : 's'}{nil}", true).expect("should parse");
        let value = Interpreter::new(&host, &args)
            .execute(&ast)
            .expect("should evaluate");
        assert_eq!(value, Value::from("Ana has 3 items"));
    }
}
