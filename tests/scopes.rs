use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use depgraph_di::{Container, DiError, Marker, ParamSpec, ProviderSpec, Schema};

#[test]
fn outer_scoped_dependent_cannot_consume_an_inner_scoped_one() {
    let container = Container::new(vec!["app", "request"]);

    let inner = ProviderSpec::sync("Inner", Schema::empty(), |_| Ok(Arc::new(1usize)));
    let inner_marker = Marker::new(inner).scope("request");

    let outer_schema = Schema::new(vec![ParamSpec::marked("inner", "usize", inner_marker)]);
    let outer = ProviderSpec::sync("Outer", outer_schema, |args| Ok(args[0].clone()));
    let outer_marker = Marker::new(outer).scope("app");

    let err = container.solve(outer_marker, "Outer").unwrap_err();
    match err {
        DiError::ScopeViolation {
            dependent,
            dependent_scope,
            subdependent,
            subdependent_scope,
        } => {
            assert_eq!(dependent, "Outer");
            assert_eq!(dependent_scope, "app");
            assert_eq!(subdependent, "Inner");
            assert_eq!(subdependent_scope, "request");
        }
        other => panic!("expected ScopeViolation, got {other:?}"),
    }
}

#[test]
fn an_app_scoped_singleton_is_shared_across_request_scopes() {
    let container = Container::new(vec!["app", "request"]);
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();

    let singleton = ProviderSpec::sync("Singleton", Schema::empty(), move |_| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(1usize))
    });
    let marker = Marker::new(singleton).scope("app");
    let plan = container.solve(marker, "Singleton").unwrap();

    let mut guard = container.enter_scope().unwrap();
    guard.enter_scope("request").unwrap();
    plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    guard.exit().unwrap();
}

#[test]
fn request_scoped_values_are_isolated_between_scopes() {
    let container = Container::new(vec!["app", "request"]);
    let counter = Arc::new(AtomicUsize::new(0));
    let counter_clone = counter.clone();

    let per_request = ProviderSpec::sync("PerRequest", Schema::empty(), move |_| {
        Ok(Arc::new(counter_clone.fetch_add(1, Ordering::SeqCst)))
    });
    let marker = Marker::new(per_request).scope("request");
    let plan = container.solve(marker, "PerRequest").unwrap();

    let mut first = container.enter_scope().unwrap();
    first.enter_scope("request").unwrap();
    let a = plan.execute_sync(first.state_mut(), &HashMap::new()).unwrap();
    first.exit().unwrap();

    let mut second = container.enter_scope().unwrap();
    second.enter_scope("request").unwrap();
    let b = plan.execute_sync(second.state_mut(), &HashMap::new()).unwrap();
    second.exit().unwrap();

    assert_ne!(*a.downcast::<usize>().unwrap(), *b.downcast::<usize>().unwrap());
}

#[test]
fn unknown_scope_is_rejected() {
    let container = Container::new(vec!["app"]);
    let provider = ProviderSpec::sync("Ghost", Schema::empty(), |_| Ok(Arc::new(0usize)));
    let marker = Marker::new(provider).scope("nonexistent");
    let err = container.solve(marker, "Ghost").unwrap_err();
    assert!(matches!(err, DiError::UnknownScope { scope: "nonexistent", .. }));
}
