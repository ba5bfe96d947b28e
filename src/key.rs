//! Cache keys: the identity under which a value is stored and looked up in
//! the `ScopeMap`.

use std::sync::atomic::{AtomicU64, Ordering};

/// The identity under which a dependent's result is cached.
///
/// When `use_cache` is true, two sites referencing the same provider
/// produce the same `Shared` key (the provider's `Arc` pointer address
/// stands in for "provider identity") and therefore share one `Task`,
/// deduplicating the graph by cache key. When
/// `use_cache` is false, each dependent instance gets its own `Unique` key
/// so it is never deduplicated against a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Shared across every dependent built from the same provider `Arc`.
    Shared(usize),
    /// Unique to one dependent instance; never shared.
    Unique(u64),
}

static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(0);

impl CacheKey {
    /// Build a fresh key that will never equal any other `Unique` key.
    pub fn fresh_unique() -> Self {
        CacheKey::Unique(NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed))
    }

    /// Build the shared key for a provider identified by its `Arc` pointer
    /// address (see [`crate::provider::ProviderSpec::identity`]).
    pub fn shared(identity: usize) -> Self {
        CacheKey::Shared(identity)
    }
}
