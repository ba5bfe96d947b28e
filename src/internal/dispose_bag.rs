//! Internal disposal bag for managing cleanup hooks.

use std::future::Future;
use std::pin::Pin;

use crate::error::{DiError, DiResult};

/// Future type for disposal operations.
pub(crate) type BoxFutureUnit = Pin<Box<dyn Future<Output = DiResult<()>> + Send>>;

/// Container for disposal hooks with LIFO execution order.
///
/// This internal structure manages both synchronous and asynchronous disposal hooks.
/// Async hooks are executed first (in reverse order), followed by sync hooks.
#[derive(Default)]
pub(crate) struct DisposeBag {
    sync: Vec<Box<dyn FnOnce() -> DiResult<()> + Send>>,
    asyncs: Vec<Box<dyn FnOnce() -> BoxFutureUnit + Send>>,
}

impl DisposeBag {
    /// Add a synchronous disposal hook.
    pub(crate) fn push_sync(&mut self, f: Box<dyn FnOnce() -> DiResult<()> + Send>) {
        self.sync.push(f);
    }

    /// Add an already-boxed asynchronous disposal hook.
    pub(crate) fn push_async_boxed(&mut self, f: Box<dyn FnOnce() -> BoxFutureUnit + Send>) {
        self.asyncs.push(f);
    }

    /// `true` if any async hooks are registered.
    pub(crate) fn has_async(&self) -> bool {
        !self.asyncs.is_empty()
    }

    /// Execute all sync hooks in reverse order (LIFO). Every hook runs even
    /// if an earlier one fails, so a failing finalizer never strands the
    /// ones acquired before it; a second failure is folded into the first
    /// via [`DiError::Teardown`] rather than discarded.
    pub(crate) fn run_all_sync_reverse(&mut self) -> DiResult<()> {
        let mut first_err: Option<DiError> = None;
        while let Some(f) = self.sync.pop() {
            if let Err(e) = f() {
                first_err = Some(chain_teardown_error(first_err, e));
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Execute all async hooks in reverse order (LIFO), with the same
    /// run-every-hook, fold-extra-failures behavior as
    /// [`DisposeBag::run_all_sync_reverse`].
    pub(crate) async fn run_all_async_reverse(&mut self) -> DiResult<()> {
        let mut first_err: Option<DiError> = None;
        while let Some(f) = self.asyncs.pop() {
            if let Err(e) = f().await {
                first_err = Some(chain_teardown_error(first_err, e));
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Check if the bag is empty (no disposers registered).
    pub(crate) fn is_empty(&self) -> bool {
        self.sync.is_empty() && self.asyncs.is_empty()
    }
}

fn chain_teardown_error(previous: Option<DiError>, latest: DiError) -> DiError {
    match previous {
        None => latest,
        Some(prev) => DiError::Teardown {
            primary: Some(Box::new(prev)),
            teardown: Box::new(latest),
        },
    }
}