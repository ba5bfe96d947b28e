//! `Dependent`: the solved internal form of a [`crate::marker::Marker`].

use std::sync::Arc;

use crate::key::CacheKey;
use crate::provider::ProviderSpec;
use crate::scope::Scope;

/// One parameter binding inside a solved [`Dependent`].
///
/// `dependent` is `None` when the parameter is satisfied by its own default
/// value rather than by a sub-dependent.
#[derive(Clone)]
pub struct DependentParam {
    pub name: &'static str,
    pub dependent: Option<Arc<Dependent>>,
}

/// A solved dependent: what to call, under which scope, whether to cache,
/// and the already-solved sub-dependents it needs first.
///
/// Two `Dependent`s that resolve to the same [`CacheKey`] are the same
/// logical dependent — the solver emits
/// exactly one [`crate::task::Task`] for each distinct cache key it sees,
/// regardless of how many parents reference it.
pub struct Dependent {
    pub name: &'static str,
    pub provider: Option<Arc<ProviderSpec>>,
    pub scope: Scope,
    pub use_cache: bool,
    pub cache_key: CacheKey,
    pub params: Vec<DependentParam>,
}

impl Dependent {
    pub fn is_root_only(&self) -> bool {
        self.provider.is_none() && self.params.is_empty()
    }
}

/// A synthetic dependent with no provider of its own, grouping several
/// independently-requested dependents under one solve so they share a
/// single [`crate::task::SolvedPlan`] and cache.
///
/// Useful when a caller wants several top-level results out of one
/// [`crate::solver::solve`] call (e.g. priming a handful of singletons up
/// front): wrapping them in a synthetic root avoids running the solver once
/// per result and re-deduping shared sub-dependents by hand.
pub fn join_siblings(siblings: Vec<Arc<Dependent>>) -> Dependent {
    let params = siblings
        .into_iter()
        .enumerate()
        .map(|(i, d)| DependentParam {
            name: sibling_name(i),
            dependent: Some(d),
        })
        .collect();
    Dependent {
        name: "<joined>",
        provider: None,
        scope: None,
        use_cache: false,
        cache_key: CacheKey::fresh_unique(),
        params,
    }
}

fn sibling_name(i: usize) -> &'static str {
    // A small fixed pool avoids leaking a String per sibling; joins beyond
    // this width fall back to a shared placeholder (only used for error
    // path labels, not lookup).
    const NAMES: &[&str] = &[
        "sibling_0", "sibling_1", "sibling_2", "sibling_3", "sibling_4", "sibling_5", "sibling_6",
        "sibling_7",
    ];
    NAMES.get(i).copied().unwrap_or("sibling_n")
}
