//! `ScopeMap`: a chained per-scope key-value store.
//!
//! Each declared scope gets its own layer, pushed outer-to-inner. A lookup
//! walks from the innermost active layer outward, so an inner scope can see
//! (and shadow) values cached by an outer one without copying them. Cost is
//! O(S) in the number of active scopes, not the number of keys.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{DiError, DiResult};
use crate::scope::ScopeTag;

struct Layer<K, V> {
    tag: ScopeTag,
    values: HashMap<K, V>,
}

/// A chained map over the container's active scopes.
pub struct ScopeMap<K, V> {
    layers: Vec<Layer<K, V>>,
}

impl<K, V> ScopeMap<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        ScopeMap { layers: Vec::new() }
    }

    /// Push a new innermost layer for `tag`.
    pub fn add_scope(&mut self, tag: ScopeTag) -> DiResult<()> {
        if self.layers.iter().any(|l| l.tag == tag) {
            return Err(DiError::DuplicateScope { scope: tag });
        }
        self.layers.push(Layer {
            tag,
            values: HashMap::new(),
        });
        Ok(())
    }

    /// Pop the layer for `tag`, along with anything pushed after it.
    ///
    /// Popping an outer layer also discards inner layers still above it;
    /// callers are expected to pop innermost-first during normal teardown.
    pub fn pop_scope(&mut self, tag: ScopeTag) -> DiResult<()> {
        let idx = self
            .layers
            .iter()
            .position(|l| l.tag == tag)
            .ok_or(DiError::UnknownActiveScope { scope: tag })?;
        self.layers.truncate(idx);
        Ok(())
    }

    /// Look up `key`, searching from the innermost active layer outward.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.layers.iter().rev().find_map(|l| l.values.get(key))
    }

    /// Store `value` under `key` in the layer for `tag`.
    pub fn set(&mut self, tag: ScopeTag, key: K, value: V) -> DiResult<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.tag == tag)
            .ok_or(DiError::UnknownActiveScope { scope: tag })?;
        layer.values.insert(key, value);
        Ok(())
    }

    /// `true` if `tag` currently has an active layer.
    pub fn is_active(&self, tag: ScopeTag) -> bool {
        self.layers.iter().any(|l| l.tag == tag)
    }

    /// The tags of every active layer, outermost first.
    pub fn active_scopes(&self) -> impl Iterator<Item = ScopeTag> + '_ {
        self.layers.iter().map(|l| l.tag)
    }
}

impl<K, V> Default for ScopeMap<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ScopeMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// A shallow copy: each layer's values are cloned independently, so
    /// mutating the copy never affects the original (used when a scope is
    /// entered concurrently more than once, each getting its own
    /// `ScopeState`).
    fn clone(&self) -> Self {
        ScopeMap {
            layers: self
                .layers
                .iter()
                .map(|l| Layer {
                    tag: l.tag,
                    values: l.values.clone(),
                })
                .collect(),
        }
    }
}
