//! Abstract syntax tree for expressions.

use std::fmt;

use cvu_common::constants::CURRENT_ITEM;
use cvu_common::types::Cardinality;

use crate::value::format_number;

/// How a variable traverses the data graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// A plain property or item (`name`).
    #[default]
    PropertyOrItem,
    /// An edge object (`_name`).
    Edge,
    /// Items pointing at this one through `name` (`~name`).
    ReverseEdge,
    /// The edge objects pointing at this one through `name` (`_~name`).
    ReverseEdgeObject,
}

impl VariableKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::PropertyOrItem => "",
            Self::Edge => "_",
            Self::ReverseEdge => "~",
            Self::ReverseEdgeObject => "_~",
        }
    }
}

/// One step of a lookup chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    /// Name without its traversal prefix.
    pub name: String,
    /// Traversal kind derived from the prefix.
    pub kind: VariableKind,
    /// `List` when written with a `[]` suffix or followed by a filter.
    pub cardinality: Cardinality,
}

impl Variable {
    /// Builds a variable from its source spelling, splitting off the
    /// `_`, `~` or `_~` prefix.
    #[must_use]
    pub fn new(raw: &str, cardinality: Cardinality) -> Self {
        let (kind, name) = if let Some(rest) = raw.strip_prefix("_~") {
            (VariableKind::ReverseEdgeObject, rest)
        } else if let Some(rest) = raw.strip_prefix('~') {
            (VariableKind::ReverseEdge, rest)
        } else if raw.len() > 1
            && let Some(rest) = raw.strip_prefix('_')
        {
            (VariableKind::Edge, rest)
        } else {
            (VariableKind::PropertyOrItem, raw)
        };
        Self {
            name: name.to_string(),
            kind,
            cardinality,
        }
    }

    /// The implicit current-item variable written as a leading `.`.
    #[must_use]
    pub fn current_item() -> Self {
        Self {
            name: CURRENT_ITEM.to_string(),
            kind: VariableKind::PropertyOrItem,
            cardinality: Cardinality::Single,
        }
    }

    /// Returns `true` for the implicit current-item variable.
    #[must_use]
    pub fn is_current_item(&self) -> bool {
        self.name == CURRENT_ITEM
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.name)
    }
}

/// Binary operators, in the order the parser groups them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Value-returning conjunction.
    And,
    /// Value-returning disjunction.
    Or,
    /// Loose equality.
    Equals,
    /// Loose inequality.
    NotEquals,
    /// `>`.
    GreaterThan,
    /// `>=`.
    GreaterThanOrEqual,
    /// `<`.
    LessThan,
    /// `<=`.
    LessThanOrEqual,
    /// Numeric addition.
    Add,
    /// Numeric subtraction.
    Subtract,
    /// Numeric multiplication.
    Multiply,
    /// Numeric division.
    Divide,
}

impl BinaryOp {
    /// Source spelling.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    /// Numeric literal.
    Number(f64),
    /// String literal, or a literal fragment inside [`ExprNode::StringMode`].
    String(String),
    /// Boolean literal.
    Bool(bool),
    /// `nil`.
    Nil,
    /// A single chain step. Only appears inside lookup chains.
    Variable(Variable),
    /// A chain of variables, possibly interleaved with filter predicates.
    Lookup(Vec<ExprNode>),
    /// A call of the function or method named by the lookup chain.
    Call {
        /// Chain naming the callee.
        lookup: Vec<ExprNode>,
        /// Argument expressions, evaluated before the call.
        arguments: Vec<ExprNode>,
    },
    /// A binary operation.
    BinaryOp {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        lhs: Box<ExprNode>,
        /// Right operand.
        rhs: Box<ExprNode>,
    },
    /// `condition ? on_true : on_false`.
    Condition {
        /// Condition, coerced to a boolean.
        condition: Box<ExprNode>,
        /// Branch taken when the condition is truthy.
        on_true: Box<ExprNode>,
        /// Branch taken otherwise.
        on_false: Box<ExprNode>,
    },
    /// `!inner`.
    Negation(Box<ExprNode>),
    /// Unary `+inner` or `-inner`.
    NumberCoercion {
        /// Operand, coerced to a number.
        inner: Box<ExprNode>,
        /// `true` for unary minus.
        negate: bool,
    },
    /// Interpolated text: literal fragments and embedded expressions.
    StringMode(Vec<ExprNode>),
}

impl ExprNode {
    /// Shorthand for building a binary node.
    #[must_use]
    pub fn binary(op: BinaryOp, lhs: Self, rhs: Self) -> Self {
        Self::BinaryOp {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

fn write_chain(f: &mut fmt::Formatter<'_>, chain: &[ExprNode]) -> fmt::Result {
    let mut steps = chain.iter().peekable();
    let mut first = true;
    while let Some(step) = steps.next() {
        match step {
            ExprNode::Variable(var) if var.is_current_item() => {
                write!(f, ".")?;
                // `.name` reads as one step.
                first = true;
                continue;
            }
            ExprNode::Variable(var) => {
                if !first {
                    write!(f, ".")?;
                }
                write!(f, "{var}")?;
                match steps.peek() {
                    Some(ExprNode::Variable(_)) | None => {
                        if var.cardinality == Cardinality::List {
                            write!(f, "[]")?;
                        }
                    }
                    Some(filter) => {
                        write!(f, "[{filter}]")?;
                        let _ = steps.next();
                    }
                }
            }
            other => write!(f, "[{other}]")?,
        }
        first = false;
    }
    Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'")?;
    for c in s.chars() {
        match c {
            '\'' => write!(f, "\\'")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            other => write!(f, "{other}")?,
        }
    }
    write!(f, "'")
}

impl fmt::Display for ExprNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", format_number(*n)),
            Self::String(s) => write_quoted(f, s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Nil => write!(f, "nil"),
            Self::Variable(var) => write!(f, "{var}"),
            Self::Lookup(chain) => write_chain(f, chain),
            Self::Call { lookup, arguments } => {
                write_chain(f, lookup)?;
                write!(f, "(")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Self::BinaryOp { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            Self::Condition {
                condition,
                on_true,
                on_false,
            } => write!(f, "({condition} ? {on_true} : {on_false})"),
            Self::Negation(inner) => write!(f, "!{inner}"),
            Self::NumberCoercion { inner, negate } => {
                write!(f, "{}{inner}", if *negate { "-" } else { "+" })
            }
            Self::StringMode(fragments) => {
                for fragment in fragments {
                    match fragment {
                        Self::String(text) => {
                            for c in text.chars() {
                                if matches!(c, '{' | '}' | '\\') {
                                    write!(f, "\\")?;
                                }
                                write!(f, "{c}")?;
                            }
                        }
                        expr => write!(f, "{{{expr}}}")?,
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_prefixes_select_kind() {
        assert_eq!(Variable::new("name", Cardinality::Single).kind, VariableKind::PropertyOrItem);
        assert_eq!(Variable::new("_friend", Cardinality::Single).kind, VariableKind::Edge);
        assert_eq!(Variable::new("~friend", Cardinality::Single).kind, VariableKind::ReverseEdge);
        let reverse = Variable::new("_~friend", Cardinality::List);
        assert_eq!(reverse.kind, VariableKind::ReverseEdgeObject);
        assert_eq!(reverse.name, "friend");
    }

    #[test]
    fn lone_underscore_is_a_plain_name() {
        let var = Variable::new("_", Cardinality::Single);
        assert_eq!(var.kind, VariableKind::PropertyOrItem);
        assert_eq!(var.name, "_");
    }

    #[test]
    fn chain_display_uses_leading_dot_for_current_item() {
        let node = ExprNode::Lookup(vec![
            ExprNode::Variable(Variable::current_item()),
            ExprNode::Variable(Variable::new("bar", Cardinality::Single)),
            ExprNode::Variable(Variable::new("_~tags", Cardinality::List)),
        ]);
        assert_eq!(node.to_string(), ".bar._~tags[]");
    }

    #[test]
    fn filter_display_wraps_predicate() {
        let node = ExprNode::Lookup(vec![
            ExprNode::Variable(Variable::new("bar", Cardinality::List)),
            ExprNode::binary(
                BinaryOp::Equals,
                ExprNode::Lookup(vec![ExprNode::Variable(Variable::new(
                    "foo",
                    Cardinality::Single,
                ))]),
                ExprNode::Number(10.0),
            ),
        ]);
        assert_eq!(node.to_string(), "bar[(foo = 10)]");
    }
}
