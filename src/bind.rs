//! Bind hooks: ordered, first-match-wins substitutions consulted before a
//! parameter's own marker is examined.

use std::sync::Arc;

use crate::marker::Marker;
use crate::schema::ParamSpec;

/// A substitution rule. Given the parameter about to be wired, return the
/// marker that should be used in its place, or `None` to defer to the next
/// hook (and, after that, the parameter's own annotation).
pub trait BindHook: Send + Sync {
    fn substitute(&self, param: &ParamSpec) -> Option<Marker>;
}

impl<F> BindHook for F
where
    F: Fn(&ParamSpec) -> Option<Marker> + Send + Sync,
{
    fn substitute(&self, param: &ParamSpec) -> Option<Marker> {
        (self)(param)
    }
}

/// A function used to decide whether `candidate` may stand in for
/// `target` when `bind_by_type`'s `covariant` flag is set. Rust has no
/// `__mro__` to walk, so this defaults to exact name equality; callers
/// with their own notion of subtyping (e.g. a trait-object hierarchy
/// tracked out of band) can supply their own.
pub type IsSubtype = fn(candidate: &str, target: &str) -> bool;

fn exact_match(candidate: &str, target: &str) -> bool {
    candidate == target
}

/// Build a hook that substitutes `replacement` for any parameter whose (i)
/// own marker would call a provider named `target_type_name`, or (ii)
/// declared type name is `target_type_name` (or, if `covariant` is set, any
/// type `is_subtype` reports as a subtype of it).
pub fn bind_by_type(
    replacement: Marker,
    target_type_name: &'static str,
    covariant: bool,
    is_subtype: Option<IsSubtype>,
) -> impl BindHook {
    let is_subtype = is_subtype.unwrap_or(exact_match);
    move |param: &ParamSpec| -> Option<Marker> {
        let matches = |declared: &str| -> bool {
            if covariant {
                is_subtype(declared, target_type_name)
            } else {
                declared == target_type_name
            }
        };
        let provider_matches = match param.marker.as_ref().and_then(|m| m.provider()) {
            Some(provider) => matches(provider.name()),
            None => false,
        };
        let type_matches = match param.type_name {
            Some(declared) => matches(declared),
            None => false,
        };
        (provider_matches || type_matches).then(|| replacement.clone())
    }
}

/// A handle returned by [`BindRegistry::bind`]; drop it, or call
/// [`ReleaseHandle::release`], to unregister the hook.
pub struct ReleaseHandle {
    id: u64,
    registry: std::sync::Weak<std::sync::Mutex<Vec<(u64, Arc<dyn BindHook>)>>>,
}

impl ReleaseHandle {
    /// Unregister the associated hook. A no-op if it was already released
    /// or the registry has been dropped.
    pub fn release(self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut hooks = registry.lock().expect("bind registry poisoned");
            hooks.retain(|(id, _)| *id != self.id);
        }
    }
}

/// The container's ordered list of bind hooks, consulted first-match-wins
/// before a parameter's own annotation.
pub struct BindRegistry {
    hooks: Arc<std::sync::Mutex<Vec<(u64, Arc<dyn BindHook>)>>>,
    next_id: std::sync::atomic::AtomicU64,
}

impl BindRegistry {
    pub fn new() -> Self {
        BindRegistry {
            hooks: Arc::new(std::sync::Mutex::new(Vec::new())),
            next_id: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Register `hook`, appended after every previously-registered hook.
    pub fn bind<H: BindHook + 'static>(&self, hook: H) -> ReleaseHandle {
        let id = self.next_id.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        self.hooks.lock().expect("bind registry poisoned").push((id, Arc::new(hook)));
        ReleaseHandle {
            id,
            registry: Arc::downgrade(&self.hooks),
        }
    }

    /// Run every hook in registration order, returning the first
    /// substitution found.
    pub fn resolve(&self, param: &ParamSpec) -> Option<Marker> {
        let hooks = self.hooks.lock().expect("bind registry poisoned");
        for (_, hook) in hooks.iter() {
            if let Some(marker) = hook.substitute(param) {
                return Some(marker);
            }
        }
        None
    }
}

impl Default for BindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
