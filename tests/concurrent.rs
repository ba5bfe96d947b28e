use std::collections::HashMap;
use std::sync::Arc;

use depgraph_di::{Container, Executor, Marker, ParamSpec, ProviderSpec, Schema};

#[tokio::test]
async fn concurrent_executor_resolves_independent_branches() {
    let container = Container::new(vec!["app"]);

    let left = ProviderSpec::async_fn("Left", Schema::empty(), |_| async { Ok(Arc::new(2usize) as depgraph_di::AnyValue) });
    let right = ProviderSpec::async_fn("Right", Schema::empty(), |_| async { Ok(Arc::new(3usize) as depgraph_di::AnyValue) });

    let sum_schema = Schema::new(vec![
        ParamSpec::marked("left", "usize", Marker::new(left)),
        ParamSpec::marked("right", "usize", Marker::new(right)),
    ]);
    let sum = ProviderSpec::async_fn("Sum", sum_schema, |args| {
        let left = args[0].clone();
        let right = args[1].clone();
        async move {
            let l = *left.downcast::<usize>().unwrap();
            let r = *right.downcast::<usize>().unwrap();
            Ok(Arc::new(l + r) as depgraph_di::AnyValue)
        }
    });

    let plan = container.solve(Marker::new(sum), "Sum").unwrap();
    let mut guard = container.enter_scope().unwrap();
    let value = Executor::ConcurrentAsync
        .run(&plan, guard.state_mut(), &HashMap::new())
        .await
        .unwrap();
    assert_eq!(*value.downcast::<usize>().unwrap(), 5);
    guard.exit_async().await.unwrap();
}

#[tokio::test]
async fn concurrent_executor_propagates_the_first_provider_error() {
    let container = Container::new(vec!["app"]);
    let failing = ProviderSpec::async_fn("Failing", Schema::empty(), |_| async {
        Err(depgraph_di::DiError::Provider {
            provider: "Failing",
            message: "boom".to_string(),
        })
    });
    let plan = container.solve(Marker::new(failing), "Failing").unwrap();
    let mut guard = container.enter_scope().unwrap();
    let err = Executor::ConcurrentAsync
        .run(&plan, guard.state_mut(), &HashMap::new())
        .await
        .unwrap_err();
    assert!(matches!(err, depgraph_di::DiError::Provider { .. }));
}

#[tokio::test]
async fn sequential_async_executor_agrees_with_concurrent_executor() {
    let container = Container::new(vec!["app"]);
    let provider = ProviderSpec::async_fn("Value", Schema::empty(), |_| async { Ok(Arc::new(11usize) as depgraph_di::AnyValue) });
    let plan = container.solve(Marker::new(provider), "Value").unwrap();

    let mut guard = container.enter_scope().unwrap();
    let value = Executor::SequentialAsync
        .run(&plan, guard.state_mut(), &HashMap::new())
        .await
        .unwrap();
    assert_eq!(*value.downcast::<usize>().unwrap(), 11);
    guard.exit_async().await.unwrap();
}
