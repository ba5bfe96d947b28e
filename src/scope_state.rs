//! Per-execution mutable state: the cache and the teardown stacks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::internal::dispose_bag::{BoxFutureUnit, DisposeBag};
use crate::key::CacheKey;
use crate::provider::AnyValue;
use crate::scope::ScopeTag;
use crate::scope_map::ScopeMap;
use crate::traits::{AsyncDispose, Dispose};

/// A deferred cleanup action captured when a generator provider constructs
/// its value, to be run when the owning scope exits.
///
/// Async finalizers run before sync finalizers within a scope; within
/// each kind, finalizers run LIFO in acquisition order.
pub enum Finalizer {
    Sync(Box<dyn FnOnce() -> DiResult<()> + Send>),
    Async(Box<dyn FnOnce() -> BoxFutureUnit + Send>),
}

impl Finalizer {
    /// Adapt a [`Dispose`] value into a sync finalizer.
    pub fn from_dispose(value: Arc<dyn Dispose>) -> Self {
        Finalizer::Sync(Box::new(move || value.dispose()))
    }

    /// Adapt an [`AsyncDispose`] value into an async finalizer.
    pub fn from_async_dispose(value: Arc<dyn AsyncDispose>) -> Self {
        Finalizer::Async(Box::new(move || {
            Box::pin(async move { value.dispose().await }) as Pin<Box<dyn Future<Output = DiResult<()>> + Send>>
        }))
    }
}

/// The mutable state threaded through one execution of a [`crate::task::SolvedPlan`]:
/// a cache keyed by [`CacheKey`] and chained across active scopes, plus a
/// teardown stack per active scope.
pub struct ScopeState {
    cache: ScopeMap<CacheKey, AnyValue>,
    bags: Vec<(ScopeTag, DisposeBag)>,
}

impl ScopeState {
    pub fn new() -> Self {
        ScopeState {
            cache: ScopeMap::new(),
            bags: Vec::new(),
        }
    }

    /// Push a new innermost scope layer.
    pub fn enter_scope(&mut self, tag: ScopeTag) -> DiResult<()> {
        self.cache.add_scope(tag)?;
        self.bags.push((tag, DisposeBag::default()));
        Ok(())
    }

    pub fn get_cached(&self, key: &CacheKey) -> Option<AnyValue> {
        self.cache.get(key).cloned()
    }

    pub fn set_cached(&mut self, tag: ScopeTag, key: CacheKey, value: AnyValue) -> DiResult<()> {
        self.cache.set(tag, key, value)
    }

    pub fn is_active(&self, tag: ScopeTag) -> bool {
        self.cache.is_active(tag)
    }

    /// Register a finalizer against the innermost active layer for `tag`.
    pub fn push_finalizer(&mut self, tag: ScopeTag, finalizer: Finalizer) -> DiResult<()> {
        let bag = self
            .bags
            .iter_mut()
            .find(|(t, _)| *t == tag)
            .ok_or(DiError::UnknownActiveScope { scope: tag })?;
        match finalizer {
            Finalizer::Sync(f) => bag.1.push_sync(f),
            Finalizer::Async(f) => bag.1.push_async_boxed(f),
        }
        Ok(())
    }

    /// Tear down the innermost scope: run its async finalizers, then its
    /// sync finalizers, both LIFO, then pop its cache layer. Both phases
    /// run to completion even if one fails, so the cache layer is always
    /// popped and a failure in one phase never suppresses a failure in the
    /// other — both are folded into one [`DiError::Teardown`] when that
    /// happens.
    pub async fn exit_scope_async(&mut self, tag: ScopeTag) -> DiResult<()> {
        let mut bag = self.pop_bag(tag)?;
        let async_result = bag.run_all_async_reverse().await;
        let sync_result = bag.run_all_sync_reverse();
        self.finish_exit(tag)?;
        combine_teardown_results(async_result, sync_result)
    }

    /// Tear down the innermost scope synchronously.
    ///
    /// If the scope's bag holds any async finalizers, this returns
    /// [`DiError::IncompatibleDependency`] instead of silently dropping
    /// them or blocking — a scope that acquired an async resource must be
    /// exited with [`ScopeState::exit_scope_async`].
    pub fn exit_scope_sync(&mut self, tag: ScopeTag) -> DiResult<()> {
        let bag = self
            .bags
            .iter()
            .find(|(t, _)| *t == tag)
            .ok_or(DiError::UnknownActiveScope { scope: tag })?;
        if bag.1.has_async() {
            return Err(DiError::IncompatibleDependency {
                provider: "<async finalizer>",
                scope: tag,
            });
        }
        let result = self.pop_bag(tag)?.run_all_sync_reverse();
        self.finish_exit(tag)?;
        result
    }

    fn pop_bag(&mut self, tag: ScopeTag) -> DiResult<DisposeBag> {
        let idx = self
            .bags
            .iter()
            .position(|(t, _)| *t == tag)
            .ok_or(DiError::UnknownActiveScope { scope: tag })?;
        let (_, bag) = self.bags.remove(idx);
        Ok(bag)
    }

    fn finish_exit(&mut self, tag: ScopeTag) -> DiResult<()> {
        self.cache.pop_scope(tag)
    }

    /// Active scope tags, innermost first — the order teardown must run in:
    /// LIFO across scopes, inner before outer.
    pub fn active_scopes_innermost_first(&self) -> Vec<ScopeTag> {
        self.bags.iter().rev().map(|(tag, _)| *tag).collect()
    }
}

impl Default for ScopeState {
    fn default() -> Self {
        Self::new()
    }
}

/// Fold two teardown-phase results into one, chaining a second failure onto
/// the first via [`DiError::Teardown`] rather than dropping it.
fn combine_teardown_results(first: DiResult<()>, second: DiResult<()>) -> DiResult<()> {
    match (first, second) {
        (Ok(()), Ok(())) => Ok(()),
        (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
        (Err(first), Err(second)) => Err(DiError::Teardown {
            primary: Some(Box::new(first)),
            teardown: Box::new(second),
        }),
    }
}

/// An RAII-flavored handle returned by [`crate::container::Container::enter_scope`]
/// wrapping one or more nested active layers.
///
/// Must be exited explicitly with [`ScopeGuard::exit`] or
/// [`ScopeGuard::exit_async`], both of which tear down every layer this
/// guard still holds, innermost first — calling the sync variant when any
/// held layer acquired an async-generator resource surfaces
/// [`DiError::IncompatibleDependency`] rather than leaving teardown
/// undefined.
pub struct ScopeGuard {
    pub(crate) state: ScopeState,
}

impl ScopeGuard {
    pub(crate) fn new(state: ScopeState) -> Self {
        ScopeGuard { state }
    }

    pub fn state(&self) -> &ScopeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ScopeState {
        &mut self.state
    }

    /// Push a nested inner scope layer onto this guard.
    pub fn enter_scope(&mut self, tag: ScopeTag) -> DiResult<()> {
        self.state.enter_scope(tag)
    }

    /// Tear down every layer this guard holds, innermost first, using only
    /// synchronous finalizers. Every layer is torn down even if an earlier
    /// one fails, so teardown errors are always surfaced after cleanup
    /// completes rather than aborting partway through.
    pub fn exit(mut self) -> DiResult<()> {
        let mut result = Ok(());
        for tag in self.state.active_scopes_innermost_first() {
            result = combine_teardown_results(result, self.state.exit_scope_sync(tag));
        }
        result
    }

    /// Tear down every layer this guard holds, innermost first, awaiting
    /// async finalizers where present. Every layer is torn down even if an
    /// earlier one fails.
    pub async fn exit_async(mut self) -> DiResult<()> {
        let mut result = Ok(());
        for tag in self.state.active_scopes_innermost_first() {
            result = combine_teardown_results(result, self.state.exit_scope_async(tag).await);
        }
        result
    }
}
