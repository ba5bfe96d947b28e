use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depgraph_di::{Container, Marker, ParamSpec, ProviderSpec, Schema};

#[test]
fn resolves_a_plain_sync_provider() {
    let container = Container::new(vec!["app"]);
    let provider = ProviderSpec::sync("Greeting", Schema::empty(), |_| {
        Ok(Arc::new("hello".to_string()))
    });
    let plan = container.solve(Marker::new(provider), "Greeting").unwrap();

    let mut guard = container.enter_scope().unwrap();
    let value = plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(*value.downcast::<String>().unwrap(), "hello");
    guard.exit().unwrap();
}

#[test]
fn wires_nested_dependencies_by_marker() {
    let container = Container::new(vec!["app"]);

    let leaf = ProviderSpec::sync("Leaf", Schema::empty(), |_| Ok(Arc::new(7usize)));
    let leaf_marker = Marker::new(leaf);
    let root_schema = Schema::new(vec![ParamSpec::marked("leaf", "usize", leaf_marker)]);
    let root = ProviderSpec::sync("Root", root_schema, |args| {
        let leaf = args[0].clone().downcast::<usize>().unwrap();
        Ok(Arc::new(*leaf + 1))
    });

    let plan = container.solve(Marker::new(root), "Root").unwrap();
    let mut guard = container.enter_scope().unwrap();
    let value = plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(*value.downcast::<usize>().unwrap(), 8);
    guard.exit().unwrap();
}

#[test]
fn deduplicates_shared_providers_by_cache_key() {
    let container = Container::new(vec!["app"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let shared = ProviderSpec::sync("Shared", Schema::empty(), move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(1usize))
    });
    let shared_marker = Marker::new(shared);

    let a_schema = Schema::new(vec![ParamSpec::marked("s", "usize", shared_marker.clone())]);
    let b_schema = Schema::new(vec![ParamSpec::marked("s", "usize", shared_marker)]);
    let a = ProviderSpec::sync("A", a_schema, |args| Ok(args[0].clone()));
    let b = ProviderSpec::sync("B", b_schema, |args| Ok(args[0].clone()));

    let pair_schema = Schema::new(vec![
        ParamSpec::marked("a", "usize", Marker::new(a)),
        ParamSpec::marked("b", "usize", Marker::new(b)),
    ]);
    let pair = ProviderSpec::sync("Pair", pair_schema, |args| {
        Ok(Arc::new((args[0].clone(), args[1].clone())))
    });

    let plan = container.solve(Marker::new(pair), "Pair").unwrap();
    // Shared, A, B, Pair — four distinct tasks; A and B both point at the
    // same Shared task instead of each getting their own copy of it.
    assert_eq!(plan.tasks().len(), 4);

    let mut guard = container.enter_scope().unwrap();
    plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    guard.exit().unwrap();
}

#[test]
fn debug_dump_names_every_task_once() {
    let container = Container::new(vec!["app"]);
    let leaf = ProviderSpec::sync("Leaf", Schema::empty(), |_| Ok(Arc::new(1usize)));
    let root_schema = Schema::new(vec![ParamSpec::marked("leaf", "usize", Marker::new(leaf))]);
    let root = ProviderSpec::sync("Root", root_schema, |args| Ok(args[0].clone()));

    let plan = container.solve(Marker::new(root), "Root").unwrap();
    let dump = plan.debug_dump();
    assert!(dump.contains("Root"));
    assert!(dump.contains("Leaf"));
    assert!(dump.contains("leaf:"));
}

#[test]
fn missing_marker_without_default_is_a_wiring_error() {
    let container = Container::new(vec!["app"]);
    let schema = Schema::new(vec![ParamSpec::positional("unbound", "usize")]);
    let root = ProviderSpec::sync("Root", schema, |_| Ok(Arc::new(0usize)));

    let err = container.solve(Marker::new(root), "Root").unwrap_err();
    match err {
        depgraph_di::DiError::Wiring { path, .. } => assert_eq!(path, vec!["Root"]),
        other => panic!("expected Wiring, got {other:?}"),
    }
}

#[test]
fn a_defaulted_parameter_with_no_marker_is_injected_as_an_argument() {
    let container = Container::new(vec!["app"]);
    let schema = Schema::new(vec![ParamSpec::positional("optional", "usize").with_default(7usize)]);
    let root = ProviderSpec::sync("Root", schema, |args| Ok(Arc::new(*args[0].clone().downcast::<usize>().unwrap())));

    let plan = container.solve(Marker::new(root), "Root").unwrap();
    let mut guard = container.enter_scope().unwrap();
    let value = plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(*value.downcast::<usize>().unwrap(), 7);
    guard.exit().unwrap();
}

#[test]
fn a_defaulted_parameter_before_a_wired_one_keeps_positional_alignment() {
    let container = Container::new(vec!["app"]);
    let wired = ProviderSpec::sync("Wired", Schema::empty(), |_| Ok(Arc::new(3usize)));
    let schema = Schema::new(vec![
        ParamSpec::positional("a", "usize").with_default(1usize),
        ParamSpec::marked("b", "usize", Marker::new(wired)),
    ]);
    let root = ProviderSpec::sync("Root", schema, |args| {
        let a = *args[0].clone().downcast::<usize>().unwrap();
        let b = *args[1].clone().downcast::<usize>().unwrap();
        Ok(Arc::new(a + b))
    });

    let plan = container.solve(Marker::new(root), "Root").unwrap();
    let mut guard = container.enter_scope().unwrap();
    let value = plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(*value.downcast::<usize>().unwrap(), 4);
    guard.exit().unwrap();
}
