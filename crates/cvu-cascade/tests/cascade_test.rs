//! End-to-end cascade tests: loading definitions into domains, building
//! stacks for a target and resolving effective values.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::cell::Cell;
use std::fs;
use std::rc::Rc;
use std::sync::Arc;

use cvu_cascade::{
    CascadeError, CascadeStack, Cascadable, CvuEngine, DefinitionRegistry, RenderTarget,
};
use cvu_common::config::CvuConfig;
use cvu_common::types::Domain;
use cvu_expr::{Arguments, FnHost, MemoryHost, Value};
use cvu_lang::parse_cvu;

fn registry(sources: &[(Domain, &str)]) -> DefinitionRegistry {
    let mut registry = DefinitionRegistry::new();
    for (i, (domain, text)) in sources.iter().enumerate() {
        let _ = registry
            .load_source(*domain, &format!("{domain}-{i}.cvu"), text)
            .expect("should load");
    }
    registry
}

fn stack_of(defs: &[(Domain, &str)]) -> CascadeStack {
    defs.iter()
        .map(|(domain, text)| {
            let mut def = parse_cvu(text).expect("should parse").remove(0);
            def.assign_domain(*domain);
            Arc::new(def)
        })
        .collect()
}

// ── Precedence ───────────────────────────────────────────────────────

#[test]
fn session_value_wins_for_scalars() {
    let stack = stack_of(&[
        (Domain::Session, "Person { title: \"session\" }"),
        (Domain::User, "Person { title: \"user\" }"),
        (Domain::Defaults, "Person { title: \"defaults\" }"),
    ]);
    let mut cascade = Cascadable::new(stack, Arguments::new(), Rc::new(MemoryHost::new()));
    assert_eq!(
        cascade.resolve_scalar("title").expect("ok"),
        Some(Value::from("session"))
    );
}

#[test]
fn lists_concatenate_user_then_defaults() {
    let stack = stack_of(&[
        (Domain::Session, "Person { title: \"session\" }"),
        (Domain::User, "Person { sequence: [3 4] }"),
        (Domain::Defaults, "Person { sequence: [1 2] }"),
    ]);
    let cascade = Cascadable::new(stack, Arguments::new(), Rc::new(MemoryHost::new()));
    let values: Vec<f64> = cascade
        .resolve_list("sequence", true)
        .expect("ok")
        .iter()
        .map(Value::to_number)
        .collect();
    assert_eq!(values, vec![3.0, 4.0, 1.0, 2.0]);
}

#[test]
fn stack_change_is_seen_by_memoized_reads() {
    let stack = stack_of(&[
        (Domain::User, "Person { sequence: [3 4] }"),
        (Domain::Defaults, "Person { title: \"defaults\"; sequence: [1 2] }"),
    ]);
    let mut cascade = Cascadable::new(stack, Arguments::new(), Rc::new(MemoryHost::new()));
    let numbers = |cascade: &Cascadable| -> Vec<f64> {
        cascade
            .resolve_list("sequence", true)
            .expect("ok")
            .iter()
            .map(Value::to_number)
            .collect()
    };
    assert_eq!(numbers(&cascade), vec![3.0, 4.0, 1.0, 2.0]);
    for _ in 0..2 {
        assert_eq!(
            cascade.resolve_scalar("title").expect("ok"),
            Some(Value::from("defaults"))
        );
    }

    let version = cascade.stack().version();
    let session = stack_of(&[(Domain::Session, "Person { title: \"session\"; sequence: 0 }")])
        .get(0)
        .cloned()
        .expect("definition");
    cascade.stack_mut().push_front(session);
    assert!(cascade.stack().version() > version);

    assert_eq!(
        cascade.resolve_scalar("title").expect("ok"),
        Some(Value::from("session"))
    );
    assert_eq!(numbers(&cascade), vec![0.0, 3.0, 4.0, 1.0, 2.0]);
}

#[test]
fn engine_builds_view_across_domains() {
    let mut engine = CvuEngine::new(CvuConfig::default());
    for (domain, name, text) in [
        (
            Domain::Defaults,
            "defaults.cvu",
            "Person[] { title: \"People\"; defaultRenderer: list; sortFields: name }\n\
             *[] { emptyResultText: \"Nothing here\"; sortFields: dateModified }\n\
             [renderer = list] { VStack { Text { text: \"{.name}\" } } }",
        ),
        (Domain::User, "user.cvu", "Person[] { title: \"My people\" }"),
    ] {
        let _ = engine.load_source(domain, name, text).expect("should load");
    }

    let mut view = engine.view(&RenderTarget::list("Person"), Arguments::new());
    assert_eq!(view.title().expect("ok").as_deref(), Some("My people"));
    assert_eq!(view.empty_result_text().expect("ok").as_deref(), Some("Nothing here"));
    assert_eq!(view.sort_fields().expect("ok"), vec!["name", "dateModified"]);
    assert_eq!(view.renderer_name(), "list");

    let render = view.render_config();
    let item = Value::from_json(serde_json::json!({ "name": "Ada" }));
    let tree = render.render("*", item, &Arguments::new()).expect("should render");
    assert_eq!(tree[0].children[0].get("text"), Some(&Value::from("Ada")));
}

// ── Evaluation through the host ──────────────────────────────────────

#[test]
fn expressions_reach_the_host_on_every_read() {
    let lookups = Cell::new(0_u32);
    let host = FnHost::new(
        |_chain: &[cvu_expr::ExprNode], _args: &Arguments| {
            lookups.set(lookups.get() + 1);
            Ok(Value::from("live"))
        },
        |_lookup: &[cvu_expr::ExprNode], _values: Vec<Value>, _args: &Arguments| Ok(Value::Nil),
    );
    let stack = stack_of(&[(Domain::User, "Person { title: {{ .name }} }")]);

    // `host` borrows `lookups`, so it is used by reference.
    for _ in 0..2 {
        let def = stack.get(0).expect("definition");
        let value = cvu_cascade::eval::resolve_value(
            def.get("title").expect("property"),
            &host,
            &Arguments::new(),
        )
        .expect("ok");
        assert_eq!(value, Value::from("live"));
    }
    assert_eq!(lookups.get(), 2);
}

// ── Loading from disk ────────────────────────────────────────────────

#[test]
fn broken_file_is_reported_and_others_survive() {
    let tmp = tempfile::tempdir().expect("temp dir");
    fs::write(tmp.path().join("a.cvu"), "Person { title: \"a\" }").expect("write");
    fs::write(tmp.path().join("b.cvu"), "Person {\n    title: \"b\"\n").expect("write");
    fs::write(tmp.path().join("notes.txt"), "not a definition").expect("write");

    let mut registry = DefinitionRegistry::new();
    let diagnostics = registry
        .load_dir(Domain::Defaults, tmp.path())
        .expect("should list directory");
    assert_eq!(registry.source_names(Domain::Defaults), vec!["a.cvu"]);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].name, "b.cvu");
    assert!(
        diagnostics[0].message.starts_with("Unexpected Token and found EOF instead at line:3"),
        "got: {}",
        diagnostics[0].message
    );
}

#[test]
fn reloading_unchanged_directory_hits_cache() {
    let tmp = tempfile::tempdir().expect("temp dir");
    fs::write(tmp.path().join("a.cvu"), "Person {}").expect("write");

    let mut registry = DefinitionRegistry::new();
    let _ = registry.load_dir(Domain::User, tmp.path()).expect("load");
    registry.remove_domain(Domain::User);
    let _ = registry.load_dir(Domain::User, tmp.path()).expect("load");
    let stats = registry.cache_stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
    assert_eq!(registry.len(), 1);
}

#[test]
fn parse_failure_names_source() {
    let mut registry = registry(&[(Domain::User, "Person {}")]);
    let err = registry
        .load_source(Domain::User, "broken.cvu", "[widget] {}")
        .expect_err("should fail");
    assert!(matches!(err, CascadeError::Parse { ref name, .. } if name == "broken.cvu"));
    assert!(err.to_string().contains("user source 'broken.cvu'"));
}
