//! Markers: the user-facing annotation that tells the solver how to wire a
//! parameter.

use std::sync::Arc;

use crate::provider::ProviderSpec;
use crate::scope::Scope;

/// A type that knows how to build its own provider, used for auto-wiring a
/// parameter that carries no explicit [`Marker`].
///
/// Rust has no runtime reflection to inspect a type's constructor the way
/// the introspection adapter this replaces would, so a type opts in
/// explicitly by implementing this trait instead.
pub trait InjectableProvider {
    /// Build the provider that constructs `Self`.
    fn injectable_provider() -> ProviderSpec;
}

/// The user-facing annotation on a parameter: what to call, under which
/// scope, whether to cache the result, and whether the solver should wire
/// it at all.
#[derive(Clone)]
pub struct Marker {
    provider: Option<Arc<ProviderSpec>>,
    scope: Scope,
    use_cache: bool,
    wire: bool,
}

impl Marker {
    /// A marker that calls `provider`, with caching on and wiring enabled.
    pub fn new(provider: ProviderSpec) -> Self {
        Marker {
            provider: Some(Arc::new(provider)),
            scope: None,
            use_cache: true,
            wire: true,
        }
    }

    /// A marker with no provider of its own; the solver falls back to the
    /// parameter's default value, or the type's [`InjectableProvider`] impl
    /// if one is auto-wired in, or fails wiring if neither applies.
    pub fn unset() -> Self {
        Marker {
            provider: None,
            scope: None,
            use_cache: true,
            wire: true,
        }
    }

    /// Auto-wire from a type implementing [`InjectableProvider`].
    pub fn from_injectable<T: InjectableProvider>() -> Self {
        Marker::new(T::injectable_provider())
    }

    pub fn scope(mut self, scope: crate::scope::ScopeTag) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Disable wiring for this parameter: the solver must satisfy it from
    /// the parameter's own default rather than building a dependent.
    pub fn no_wire(mut self) -> Self {
        self.wire = false;
        self
    }

    pub fn provider(&self) -> Option<&Arc<ProviderSpec>> {
        self.provider.as_ref()
    }

    pub fn declared_scope(&self) -> Scope {
        self.scope
    }

    pub fn wants_cache(&self) -> bool {
        self.use_cache
    }

    pub fn should_wire(&self) -> bool {
        self.wire
    }
}
