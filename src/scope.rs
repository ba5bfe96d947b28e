//! Scope tags and the totally-ordered outer-to-inner scope list.

use crate::error::{DiError, DiResult};

/// A named scope tag, e.g. `"app"` or `"request"`.
pub type ScopeTag = &'static str;

/// A dependent's declared scope.
///
/// `None` means "unscoped": the dependent is solved without being pinned to
/// any particular layer and is re-resolved wherever its cache key next
/// misses, the way a plain value dependency with `use_cache = false` would
/// be. `Some(tag)` pins the dependent's cached value to the `ScopeState`
/// layer for `tag`.
pub type Scope = Option<ScopeTag>;

/// The container's declared scopes, outermost first.
///
/// Order is the single source of truth for "outer" vs "inner": a scope at
/// a smaller index is outer of (contains) every scope at a larger index.
/// This is what [`ScopeViolation`](DiError::ScopeViolation) checks against.
#[derive(Debug, Clone)]
pub struct ScopeList {
    order: Vec<ScopeTag>,
}

impl ScopeList {
    /// Build a scope list from an outermost-to-innermost ordering.
    pub fn new(order: Vec<ScopeTag>) -> Self {
        ScopeList { order }
    }

    /// The position of `tag` in the declared order, outer = 0.
    pub fn index_of(&self, tag: ScopeTag) -> Option<usize> {
        self.order.iter().position(|&s| s == tag)
    }

    /// All declared tags, outermost first.
    pub fn tags(&self) -> &[ScopeTag] {
        &self.order
    }

    /// `true` if `outer` is the same as, or strictly outer of, `inner`.
    ///
    /// Both tags must be declared; callers that already resolved an index
    /// should compare indices directly instead.
    pub fn is_outer_or_same(&self, outer: ScopeTag, inner: ScopeTag, path: &[&'static str]) -> DiResult<bool> {
        let outer_idx = self.index_of(outer).ok_or(DiError::UnknownScope {
            scope: outer,
            path: path.to_vec(),
        })?;
        let inner_idx = self.index_of(inner).ok_or(DiError::UnknownScope {
            scope: inner,
            path: path.to_vec(),
        })?;
        Ok(outer_idx <= inner_idx)
    }

    /// The innermost declared scope, if any scopes were declared.
    pub fn innermost(&self) -> Option<ScopeTag> {
        self.order.last().copied()
    }
}

impl Default for ScopeList {
    fn default() -> Self {
        ScopeList { order: Vec::new() }
    }
}

/// Computes a dependent's scope once every one of its children has been
/// solved, for a dependent that declares no explicit scope of its own.
///
/// Consulted after the solver has resolved `dependent_name`'s parameters,
/// so the resolver can e.g. adopt the narrowest of its children's scopes
/// instead of defaulting to the innermost declared scope.
pub trait ScopeResolver: Send + Sync {
    fn resolve(&self, dependent_name: &'static str, child_scopes: &[Scope], all_scopes: &[ScopeTag]) -> Scope;
}

impl<F> ScopeResolver for F
where
    F: Fn(&'static str, &[Scope], &[ScopeTag]) -> Scope + Send + Sync,
{
    fn resolve(&self, dependent_name: &'static str, child_scopes: &[Scope], all_scopes: &[ScopeTag]) -> Scope {
        (self)(dependent_name, child_scopes, all_scopes)
    }
}
