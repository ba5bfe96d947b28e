//! Disposal traits for resource cleanup.

use crate::error::DiResult;

/// Trait for synchronous resource disposal.
///
/// A value produced by a sync-generator provider can implement this trait
/// instead of handing the solver a bare closure; [`crate::scope_state::Finalizer::from_dispose`]
/// adapts an `Arc<dyn Dispose>` into the finalizer shape the teardown stack
/// expects. Disposal runs in LIFO order when a scope exits. A returned error
/// does not stop sibling finalizers from running; it is surfaced after
/// cleanup completes.
///
/// # Examples
///
/// ```
/// use depgraph_di::traits::Dispose;
/// use depgraph_di::DiResult;
///
/// struct Cache {
///     name: String,
/// }
///
/// impl Dispose for Cache {
///     fn dispose(&self) -> DiResult<()> {
///         println!("flushing cache: {}", self.name);
///         Ok(())
///     }
/// }
/// ```
pub trait Dispose: Send + Sync + 'static {
    /// Perform synchronous cleanup of resources.
    fn dispose(&self) -> DiResult<()>;
}

/// Trait for asynchronous resource disposal.
///
/// The async-generator counterpart of [`Dispose`]: used by providers whose
/// teardown needs to await (closing a pooled connection, flushing over the
/// network). Async finalizers run before sync finalizers within the same
/// scope, then in LIFO acquisition order among themselves.
///
/// # Examples
///
/// ```
/// use depgraph_di::traits::AsyncDispose;
/// use depgraph_di::DiResult;
/// use async_trait::async_trait;
///
/// struct DatabaseClient {
///     connection_id: String,
/// }
///
/// #[async_trait]
/// impl AsyncDispose for DatabaseClient {
///     async fn dispose(&self) -> DiResult<()> {
///         println!("closing connection: {}", self.connection_id);
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait AsyncDispose: Send + Sync + 'static {
    /// Perform asynchronous cleanup of resources.
    async fn dispose(&self) -> DiResult<()>;
}
