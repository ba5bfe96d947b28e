use depgraph_di::bind::bind_by_type;
use depgraph_di::{Container, DiError, Marker, ParamSpec, ProviderSpec, Schema};

#[test]
fn self_referential_provider_is_a_dependency_cycle() {
    let container = Container::new(vec!["app"]);

    let schema = Schema::new(vec![ParamSpec::positional("self_dep", "Node")]);
    let node = ProviderSpec::sync("Node", schema, |args| Ok(args[0].clone()));

    container.bind(bind_by_type(Marker::new(node.clone()), "Node", false, None));

    let err = container.solve(Marker::new(node), "Node").unwrap_err();
    match err {
        DiError::DependencyCycle { path } => {
            assert_eq!(path.first().copied(), Some("Node"));
            assert_eq!(path.last().copied(), Some("Node"));
            assert!(path.len() >= 2);
        }
        other => panic!("expected DependencyCycle, got {other:?}"),
    }
}

#[test]
fn mutually_referential_providers_are_a_dependency_cycle() {
    let container = Container::new(vec!["app"]);

    let a_schema = Schema::new(vec![ParamSpec::positional("b", "B")]);
    let a = ProviderSpec::sync("A", a_schema, |args| Ok(args[0].clone()));

    let b_schema = Schema::new(vec![ParamSpec::positional("a", "A")]);
    let b = ProviderSpec::sync("B", b_schema, |args| Ok(args[0].clone()));

    let a_marker = Marker::new(a.clone());
    let b_marker = Marker::new(b.clone());
    container.bind(bind_by_type(b_marker, "B", false, None));
    container.bind(bind_by_type(a_marker, "A", false, None));

    let err = container.solve(Marker::new(a), "A").unwrap_err();
    assert!(matches!(err, DiError::DependencyCycle { .. }));
}
