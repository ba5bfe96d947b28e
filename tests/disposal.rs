use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use depgraph_di::{Container, Marker, ParamSpec, ProviderSpec, Schema};

#[test]
fn sync_generator_finalizers_run_lifo_on_scope_exit() {
    let container = Container::new(vec!["app"]);
    let log = Arc::new(Mutex::new(Vec::<&'static str>::new()));

    let first_log = log.clone();
    let first = ProviderSpec::sync_generator("First", Schema::empty(), move |_| {
        let log = first_log.clone();
        Ok((
            Arc::new(1usize),
            depgraph_di::Finalizer::Sync(Box::new(move || {
                log.lock().unwrap().push("first");
                Ok(())
            })),
        ))
    });
    let first_marker = Marker::new(first).scope("app");

    let second_log = log.clone();
    let second_schema = Schema::new(vec![ParamSpec::marked("first", "usize", first_marker)]);
    let second = ProviderSpec::sync_generator("Second", second_schema, move |args| {
        let log = second_log.clone();
        let first_value = args[0].clone();
        Ok((
            first_value,
            depgraph_di::Finalizer::Sync(Box::new(move || {
                log.lock().unwrap().push("second");
                Ok(())
            })),
        ))
    });
    let marker = Marker::new(second).scope("app");

    let plan = container.solve(marker, "Second").unwrap();
    let mut guard = container.enter_scope().unwrap();
    plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
    guard.exit().unwrap();

    // First was acquired before Second (Second depends on First), so
    // teardown runs Second before First: LIFO acquisition order.
    assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
}

#[test]
fn exiting_a_scope_with_an_async_finalizer_synchronously_is_an_error() {
    let container = Container::new(vec!["app"]);
    let provider = ProviderSpec::async_generator("AsyncResource", Schema::empty(), |_args| async move {
        Ok((
            Arc::new(1usize) as depgraph_di::AnyValue,
            depgraph_di::Finalizer::from_async_dispose(Arc::new(NoopAsyncDispose)),
        ))
    });
    let marker = Marker::new(provider).scope("app");
    let plan = container.solve(marker, "AsyncResource").unwrap();

    let mut guard = container.enter_scope().unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(plan.execute_async(guard.state_mut(), &HashMap::new())).unwrap();

    let err = guard.exit().unwrap_err();
    assert!(matches!(err, depgraph_di::DiError::IncompatibleDependency { .. }));
}

struct NoopAsyncDispose;

#[async_trait::async_trait]
impl depgraph_di::AsyncDispose for NoopAsyncDispose {
    async fn dispose(&self) -> depgraph_di::DiResult<()> {
        Ok(())
    }
}
