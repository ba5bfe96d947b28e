//! `Container`: the public facade tying the bind registry, solver, and
//! scope machinery together.

use crate::bind::{BindHook, BindRegistry, ReleaseHandle};
use crate::error::DiResult;
use crate::marker::Marker;
use crate::scope::{ScopeList, ScopeResolver, ScopeTag};
use crate::scope_state::{ScopeGuard, ScopeState};
use crate::solver::{solve, solve_joined};
use crate::task::SolvedPlan;

/// The entry point: declares the container's scopes, owns its bind
/// registry, and exposes [`Container::solve`]/[`Container::enter_scope`].
pub struct Container {
    binds: BindRegistry,
    scopes: ScopeList,
}

impl Container {
    /// Declare the container's scopes, outermost first (e.g.
    /// `["app", "request"]`).
    pub fn new(scopes: Vec<ScopeTag>) -> Self {
        Container {
            binds: BindRegistry::new(),
            scopes: ScopeList::new(scopes),
        }
    }

    /// Register a bind hook, consulted before a parameter's own marker.
    pub fn bind<H: BindHook + 'static>(&self, hook: H) -> ReleaseHandle {
        self.binds.bind(hook)
    }

    /// Solve `root` (named `name` for diagnostics) into an executable plan.
    pub fn solve(&self, root: Marker, name: &'static str) -> DiResult<SolvedPlan> {
        solve(root, name, &self.binds, &self.scopes, None)
    }

    /// Solve `root`, consulting `scope_resolver` to assign a scope to any
    /// dependent that declares none of its own, once its children are
    /// solved.
    pub fn solve_with_scope_resolver(
        &self,
        root: Marker,
        name: &'static str,
        scope_resolver: &dyn ScopeResolver,
    ) -> DiResult<SolvedPlan> {
        solve(root, name, &self.binds, &self.scopes, Some(scope_resolver))
    }

    /// Solve several top-level markers into one plan sharing a single
    /// cache, via a synthetic joined root.
    pub fn solve_joined(&self, roots: Vec<(Marker, &'static str)>) -> DiResult<SolvedPlan> {
        solve_joined(roots, &self.binds, &self.scopes, None)
    }

    /// Begin a fresh execution: create a new [`ScopeState`] and enter its
    /// outermost declared scope.
    pub fn enter_scope(&self) -> DiResult<ScopeGuard> {
        let mut state = ScopeState::new();
        if let Some(&outermost) = self.scopes.tags().first() {
            state.enter_scope(outermost)?;
        }
        Ok(ScopeGuard::new(state))
    }

    pub fn scopes(&self) -> &ScopeList {
        &self.scopes
    }
}
