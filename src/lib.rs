//! # depgraph-di
//!
//! A solver-and-executor dependency injection core: declare providers and
//! their parameters, let the solver compile them into a validated,
//! immutable task graph, and run that graph with whichever executor suits
//! the caller.
//!
//! ## Quick Start
//!
//! ```
//! use depgraph_di::{Container, Marker, ProviderSpec, Schema};
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let container = Container::new(vec!["app"]);
//!
//! let db_provider = ProviderSpec::sync("Database", Schema::empty(), |_args| {
//!     Ok(Arc::new(Database {
//!         connection_string: "postgres://localhost".to_string(),
//!     }))
//! });
//!
//! let user_service_schema = Schema::new(vec![depgraph_di::ParamSpec::marked(
//!     "db",
//!     "Database",
//!     Marker::new(db_provider),
//! )]);
//!
//! let user_service_provider = ProviderSpec::sync("UserService", user_service_schema, |args| {
//!     let db = args[0].clone().downcast::<Database>().unwrap();
//!     Ok(Arc::new(UserService { db }))
//! });
//!
//! let plan = container
//!     .solve(Marker::new(user_service_provider), "UserService")
//!     .unwrap();
//!
//! let mut guard = container.enter_scope().unwrap();
//! let value = plan.execute_sync(guard.state_mut(), &Default::default()).unwrap();
//! let user_service = value.downcast::<UserService>().unwrap();
//! assert_eq!(user_service.db.connection_string, "postgres://localhost");
//! guard.exit().unwrap();
//! ```
//!
//! ## Scopes
//!
//! Scopes are declared to the [`Container`] in outer-to-inner order.
//! A dependent pinned to an outer scope is built once and shared by every
//! inner scope that asks for it; a dependent cannot depend on something
//! scoped narrower than itself (that's a [`DiError::ScopeViolation`]).
//!
//! ## Executors
//!
//! [`executor::Executor`] offers three strategies over the same
//! [`SolvedPlan`](task::SolvedPlan): fully synchronous, sequential-async,
//! and concurrent-async (tasks with satisfied dependencies run in
//! parallel via `tokio::task::JoinSet`).

pub mod bind;
pub mod container;
pub mod dependent;
pub mod error;
pub mod executor;
pub mod key;
pub mod marker;
pub mod provider;
pub mod schema;
pub mod scope;
pub mod scope_map;
pub mod scope_state;
pub mod solver;
pub mod task;
pub mod traits;

mod internal;

pub use container::Container;
pub use error::{DiError, DiResult};
pub use executor::Executor;
pub use key::CacheKey;
pub use marker::{InjectableProvider, Marker};
pub use provider::{AnyValue, Nature, ProviderSpec};
pub use schema::{ParamKind, ParamSpec, Schema};
pub use scope::{Scope, ScopeList, ScopeResolver, ScopeTag};
pub use scope_state::{Finalizer, ScopeGuard, ScopeState};
pub use task::{SolvedPlan, Task};
pub use traits::{AsyncDispose, Dispose};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_plain_sync_resolution() {
        let container = Container::new(vec!["app"]);
        let provider = ProviderSpec::sync("Answer", Schema::empty(), |_| Ok(std::sync::Arc::new(42usize)));
        let plan = container.solve(Marker::new(provider), "Answer").unwrap();
        let mut guard = container.enter_scope().unwrap();
        let value = plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
        assert_eq!(*value.downcast::<usize>().unwrap(), 42);
        guard.exit().unwrap();
    }

    #[test]
    fn test_shared_cache_dedup() {
        let container = Container::new(vec!["app"]);
        let calls = std::sync::Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let shared = ProviderSpec::sync("Shared", Schema::empty(), move |_| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            Ok(std::sync::Arc::new(1usize))
        });
        let shared_marker = Marker::new(shared);
        let left_schema = Schema::new(vec![schema::ParamSpec::marked("s", "usize", shared_marker.clone())]);
        let right_schema = Schema::new(vec![schema::ParamSpec::marked("s", "usize", shared_marker)]);
        let left = ProviderSpec::sync("Left", left_schema, |args| Ok(args[0].clone()));
        let right = ProviderSpec::sync("Right", right_schema, |args| Ok(args[0].clone()));
        let pair_schema = Schema::new(vec![
            schema::ParamSpec::marked("l", "usize", Marker::new(left)),
            schema::ParamSpec::marked("r", "usize", Marker::new(right)),
        ]);
        let pair = ProviderSpec::sync("Pair", pair_schema, |args| Ok(std::sync::Arc::new((args[0].clone(), args[1].clone()))));
        let plan = container.solve(Marker::new(pair), "Pair").unwrap();
        let mut guard = container.enter_scope().unwrap();
        plan.execute_sync(guard.state_mut(), &HashMap::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        guard.exit().unwrap();
    }
}
