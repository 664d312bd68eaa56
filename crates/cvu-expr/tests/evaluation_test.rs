//! End-to-end tests for the expression pipeline.
//!
//! Covers source text through lexing, parsing and evaluation against
//! both closure-backed and in-memory hosts.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::cast_precision_loss)]

use std::cell::Cell;

use cvu_expr::token::{Token, TokenKind};
use cvu_expr::{
    Arguments, EvalError, ExprNode, ExprParseError, Expression, ExpressionError, FnHost,
    MemoryHost, Value,
};

// ── Arithmetic and logic ─────────────────────────────────────────────

#[test]
fn arithmetic_with_decimals() {
    let value = Expression::new("5 + 10 * 2 / 4 - 3 / 3.5 * 4.5 + 0.5 * 0")
        .evaluate(&MemoryHost::new(), &Arguments::new())
        .expect("should evaluate");
    let n = value.to_number();
    assert!((n - 6.142_857).abs() < 1e-5, "got {n}");
}

#[test]
fn grouped_arithmetic() {
    let value = Expression::new("(5 + 10 * 4 - 3 / 10) / 10")
        .evaluate(&MemoryHost::new(), &Arguments::new())
        .expect("should evaluate");
    assert!((value.to_number() - 4.47).abs() < 1e-9);
}

#[test]
fn logical_operators_return_operand_values() {
    let host = MemoryHost::new();
    let args = Arguments::new();
    let eval = |code: &str| {
        Expression::new(code)
            .evaluate(&host, &args)
            .expect("should evaluate")
    };
    assert_eq!(eval("true and false"), Value::Bool(false));
    assert_eq!(eval("true and 10"), Value::Number(10.0));
    assert_eq!(eval("10 or 0"), Value::Number(10.0));
    assert_eq!(eval("5 and 'x'"), Value::from("x"));
    assert_eq!(eval("nil OR 10"), Value::Number(10.0));
    assert_eq!(eval("(5 > 10) or 'a' = 'a'"), Value::Bool(true));
}

#[test]
fn string_to_number_coercion() {
    let host = MemoryHost::new();
    let args = Arguments::new();
    let sum = Expression::new("'10' + 5")
        .evaluate(&host, &args)
        .expect("should evaluate");
    assert_eq!(sum, Value::Number(15.0));
    let bad = Expression::new("'asdasd' * 2")
        .evaluate(&host, &args)
        .expect("should evaluate");
    assert!(bad.to_number().is_nan());
    let unary = Expression::new("+'asdasd'")
        .evaluate(&host, &args)
        .expect("should evaluate");
    assert!(matches!(unary, Value::Number(n) if n.is_nan()), "got {unary:?}");
}

#[test]
fn nested_conditionals() {
    let value = Expression::new("false ? 'a' : (nil ? 'b' : (1 > 0 ? 'yes' : 'no'))")
        .evaluate(&MemoryHost::new(), &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::from("yes"));
}

#[test]
fn chained_conditionals_without_parentheses() {
    let value = Expression::new("true ? false and true ? -1 : false or true ? 'yes' : 'no' : -1")
        .evaluate(&MemoryHost::new(), &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::from("yes"));
}

// ── Host interaction ─────────────────────────────────────────────────

#[test]
fn host_receives_each_lookup_and_call_once() {
    let lookups = Cell::new(0);
    let calls = Cell::new(0);
    let host = FnHost::new(
        |chain: &[ExprNode], _: &Arguments| {
            lookups.set(lookups.get() + 1);
            Ok(Value::from(ExprNode::Lookup(chain.to_vec()).to_string()))
        },
        |_: &[ExprNode], args: Vec<Value>, _: &Arguments| {
            calls.set(calls.get() + 1);
            Ok(Value::Number(args.len() as f64))
        },
    );
    let value = Expression::string_mode("{.name} / {_~friend.age} / {me.count(1, 2)}")
        .evaluate(&host, &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::from(".name / _~friend.age / 2"));
    assert_eq!(lookups.get(), 2);
    assert_eq!(calls.get(), 1);
}

#[test]
fn untaken_branch_is_never_looked_up() {
    let seen = std::cell::RefCell::new(Vec::new());
    let calls = Cell::new(0);
    let host = FnHost::new(
        |chain: &[ExprNode], _: &Arguments| {
            seen.borrow_mut().push(ExprNode::Lookup(chain.to_vec()).to_string());
            Ok(Value::Number(1.0))
        },
        |_: &[ExprNode], _: Vec<Value>, _: &Arguments| {
            calls.set(calls.get() + 1);
            Ok(Value::Number(2.0))
        },
    );
    let value = Expression::new("flag ? base + bonus() : neverReached")
        .evaluate(&host, &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::Number(3.0));
    assert_eq!(*seen.borrow(), vec!["flag".to_string(), "base".to_string()]);
    assert_eq!(calls.get(), 1);
}

#[test]
fn truthy_chain_stops_before_or() {
    let looked_up = std::cell::RefCell::new(Vec::new());
    let calls = Cell::new(0);
    let host = FnHost::new(
        |chain: &[ExprNode], _: &Arguments| {
            looked_up
                .borrow_mut()
                .push(ExprNode::Lookup(chain.to_vec()).to_string());
            Ok(Value::Bool(true))
        },
        |_: &[ExprNode], _: Vec<Value>, _: &Arguments| {
            calls.set(calls.get() + 1);
            Ok(Value::Bool(true))
        },
    );
    let value = Expression::new(".bar and bar.foo(10) and bar[foo = 10] or neverReached")
        .evaluate(&host, &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::Bool(true));
    assert_eq!(looked_up.borrow().len(), 2);
    assert_eq!(calls.get(), 1);
    assert!(
        looked_up.borrow().iter().all(|chain| !chain.contains("neverReached")),
        "got {:?}",
        looked_up.borrow()
    );
}

#[test]
fn short_circuit_skips_host() {
    let lookups = Cell::new(0);
    let host = FnHost::new(
        |_: &[ExprNode], _: &Arguments| {
            lookups.set(lookups.get() + 1);
            Ok(Value::Nil)
        },
        |_: &[ExprNode], _: Vec<Value>, _: &Arguments| Ok(Value::Nil),
    );
    let value = Expression::new("false and a or (true ? 1 : b)")
        .evaluate(&host, &Arguments::new())
        .expect("should evaluate");
    assert_eq!(value, Value::Number(1.0));
    assert_eq!(lookups.get(), 0);
}

#[test]
fn host_errors_propagate() {
    let host = FnHost::new(
        |_: &[ExprNode], _: &Arguments| {
            Err(EvalError::Lookup {
                message: "no store".to_string(),
            })
        },
        |_: &[ExprNode], _: Vec<Value>, _: &Arguments| Ok(Value::Nil),
    );
    let err = Expression::new("x + 1")
        .evaluate(&host, &Arguments::new())
        .expect_err("should fail");
    assert!(matches!(err, ExpressionError::Eval(EvalError::Lookup { .. })));
}

#[test]
fn memory_host_filters_json_arguments() {
    let args = Arguments::from_json(serde_json::json!({
        "tasks": [
            {"title": "write", "done": true},
            {"title": "test", "done": false},
            {"title": "ship", "done": false}
        ]
    }));
    let value = Expression::string_mode("{tasks[!.done].count()} open: {tasks[!.done].title.join(', ')}")
        .evaluate(&MemoryHost::new(), &args)
        .expect("should evaluate");
    assert_eq!(value, Value::from("2 open: test, ship"));
}

// ── Errors ───────────────────────────────────────────────────────────

#[test]
fn unclosed_filter_reports_eof_position() {
    let err = Expression::new("test[10")
        .ast()
        .expect_err("should fail")
        .clone();
    assert_eq!(
        err,
        ExprParseError::ExpectedCharacter(']', Token::new(TokenKind::Eof, 8))
    );
    assert_eq!(
        err.to_string(),
        "Expected Character ] and found EOF instead at character:8"
    );
}

#[test]
fn unterminated_string_literal() {
    let err = Expression::new("'abc' + 'def")
        .ast()
        .expect_err("should fail")
        .clone();
    assert!(matches!(err, ExprParseError::MissingQuoteClose(ref t) if t.column == 9));
}
