//! The solver: turns a [`Marker`] into a validated, executable
//! [`SolvedPlan`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::bind::BindRegistry;
use crate::dependent::{Dependent, DependentParam};
use crate::error::{DiError, DiResult};
use crate::key::CacheKey;
use crate::marker::Marker;
use crate::provider::{AnyValue, ProviderSpec};
use crate::schema::{ParamSpec, Schema};
use crate::scope::{Scope, ScopeList, ScopeResolver};
use crate::task::{SolvedPlan, Task};

struct Frame {
    provider_identity: usize,
    name: &'static str,
}

struct Ctx<'a> {
    binds: &'a BindRegistry,
    scopes: &'a ScopeList,
    scope_resolver: Option<&'a dyn ScopeResolver>,
    memo: HashMap<CacheKey, Arc<Dependent>>,
    path: Vec<Frame>,
}

/// Solve `root` (named `root_name` for error paths) into a ready-to-run
/// plan. `scope_resolver`, if supplied, assigns a scope to any dependent
/// with no explicit scope of its own, once all of its children are solved.
pub fn solve(
    root: Marker,
    root_name: &'static str,
    binds: &BindRegistry,
    scopes: &ScopeList,
    scope_resolver: Option<&dyn ScopeResolver>,
) -> DiResult<SolvedPlan> {
    let mut ctx = Ctx {
        binds,
        scopes,
        scope_resolver,
        memo: HashMap::new(),
        path: Vec::new(),
    };
    let dependent = solve_marker(&mut ctx, &root, root_name)?;
    Ok(finalize(dependent))
}

/// Solve a plan whose root is a synthetic join of several already-solved
/// dependents, useful when a
/// caller wants to prime several top-level markers through a single
/// `SolvedPlan`/cache.
pub fn solve_joined(
    siblings: Vec<(Marker, &'static str)>,
    binds: &BindRegistry,
    scopes: &ScopeList,
    scope_resolver: Option<&dyn ScopeResolver>,
) -> DiResult<SolvedPlan> {
    let mut ctx = Ctx {
        binds,
        scopes,
        scope_resolver,
        memo: HashMap::new(),
        path: Vec::new(),
    };
    let mut solved = Vec::with_capacity(siblings.len());
    for (marker, name) in siblings {
        solved.push(solve_marker(&mut ctx, &marker, name)?);
    }
    Ok(finalize(Arc::new(crate::dependent::join_siblings(solved))))
}

/// `site_name` labels where this marker was encountered (a parameter name,
/// or the caller-supplied root name) and is only used when there's no
/// provider to name the dependent after. Once a provider is in hand, the
/// dependent — and every path entry referencing it — is named after
/// `provider.name()` instead, so a cycle like `A -> B -> A` reports
/// provider names, not the parameter names that happened to reference them.
fn solve_marker(ctx: &mut Ctx, marker: &Marker, site_name: &'static str) -> DiResult<Arc<Dependent>> {
    let Some(provider) = marker.provider() else {
        return Err(DiError::Wiring {
            message: format!("{site_name} has no provider and no default"),
            path: path_names(ctx),
        });
    };
    let name = provider.name();

    let identity = provider.identity();
    if ctx.path.iter().any(|f| f.provider_identity == identity) {
        let mut path: Vec<&'static str> = ctx.path.iter().map(|f| f.name).collect();
        path.push(name);
        return Err(DiError::DependencyCycle { path });
    }

    let cache_key = if marker.wants_cache() {
        CacheKey::shared(identity)
    } else {
        CacheKey::fresh_unique()
    };

    ctx.path.push(Frame {
        provider_identity: identity,
        name,
    });

    let declared_scope = validate_declared_scope(ctx, marker)?;

    if let Some(existing) = ctx.memo.get(&cache_key) {
        if let Some(tag) = declared_scope {
            if existing.scope != Some(tag) {
                return Err(DiError::Solving {
                    message: format!("{name} was solved under two different scopes"),
                    path: path_names(ctx),
                });
            }
        }
        ctx.path.pop();
        return Ok(existing.clone());
    }

    let mut params = Vec::with_capacity(provider.schema().params.len());
    let mut child_scopes = Vec::with_capacity(provider.schema().params.len());
    for param in &provider.schema().params {
        if param.is_variadic() {
            continue;
        }
        let chosen = ctx.binds.resolve(param).or_else(|| param.marker.clone());
        let dependent = match chosen {
            Some(child_marker) if child_marker.should_wire() => {
                let child = solve_marker(ctx, &child_marker, param.name)?;
                child_scopes.push(child.scope);
                Some(child)
            }
            _ => {
                if let Some(default_value) = &param.default {
                    let synthetic = default_dependent(param, default_value.clone());
                    child_scopes.push(synthetic.scope);
                    Some(synthetic)
                } else {
                    return Err(DiError::Wiring {
                        message: format!("{name} parameter \"{}\" has no marker and no default", param.name),
                        path: path_names(ctx),
                    });
                }
            }
        };
        params.push(DependentParam {
            name: param.name,
            dependent,
        });
    }

    ctx.path.pop();

    // Scope assignment happens after every child is resolved: an explicit
    // scope is used verbatim, otherwise a supplied resolver picks one from
    // the children's scopes, falling back to the innermost declared scope
    // for a cached dependent with neither.
    let scope = match declared_scope {
        Some(tag) => Some(tag),
        None => match ctx.scope_resolver {
            Some(resolver) => resolver.resolve(name, &child_scopes, ctx.scopes.tags()),
            None if marker.wants_cache() => ctx.scopes.innermost(),
            None => None,
        },
    };

    for param in &params {
        if let Some(child) = &param.dependent {
            check_scope_violation(ctx.scopes, name, scope, param.name, child)?;
        }
    }

    let dependent = Arc::new(Dependent {
        name,
        provider: Some(provider.clone()),
        scope,
        use_cache: marker.wants_cache(),
        cache_key,
        params,
    });
    ctx.memo.insert(cache_key, dependent.clone());
    Ok(dependent)
}

/// Build the synthetic zero-arg dependent that stands in for `param`'s
/// default value when nothing wires it.
fn default_dependent(param: &ParamSpec, value: AnyValue) -> Arc<Dependent> {
    let provider = ProviderSpec::sync(param.name, Schema::empty(), move |_| Ok(value.clone()));
    Arc::new(Dependent {
        name: param.name,
        provider: Some(Arc::new(provider)),
        scope: None,
        use_cache: false,
        cache_key: CacheKey::fresh_unique(),
        params: Vec::new(),
    })
}

/// Validate (but don't yet assign) an explicitly-declared scope tag.
fn validate_declared_scope(ctx: &Ctx, marker: &Marker) -> DiResult<Scope> {
    match marker.declared_scope() {
        Some(tag) => {
            if ctx.scopes.index_of(tag).is_none() {
                return Err(DiError::UnknownScope {
                    scope: tag,
                    path: path_names(ctx),
                });
            }
            Ok(Some(tag))
        }
        None => Ok(None),
    }
}

/// A dependent cannot consume a sub-dependent whose scope is strictly
/// narrower (shorter-lived) than its own: the child must outlive every
/// parent that holds it, so `child`'s scope index must be the same as, or
/// outer than, `parent`'s.
fn check_scope_violation(
    scopes: &ScopeList,
    parent_name: &'static str,
    parent_scope: Scope,
    child_param_name: &'static str,
    child: &Dependent,
) -> DiResult<()> {
    let (Some(parent_tag), Some(child_tag)) = (parent_scope, child.scope) else {
        return Ok(());
    };
    if !scopes.is_outer_or_same(child_tag, parent_tag, &[parent_name, child_param_name])? {
        return Err(DiError::ScopeViolation {
            dependent: parent_name,
            dependent_scope: parent_tag,
            subdependent: child.name,
            subdependent_scope: child_tag,
        });
    }
    Ok(())
}

fn path_names(ctx: &Ctx) -> Vec<&'static str> {
    ctx.path.iter().map(|f| f.name).collect()
}

/// Post-order task numbering: since `Dependent` nodes that share a cache
/// key are the same `Arc` (deduped during solving), walking the tree once
/// and memoizing by pointer identity both dedups tasks and produces a valid
/// topological order (children finish, hence get a task id, before their
/// parent) with ties broken by traversal order.
fn finalize(root: Arc<Dependent>) -> SolvedPlan {
    let mut tasks = Vec::new();
    let mut seen: HashMap<usize, usize> = HashMap::new();
    let root_id = assign(&root, &mut tasks, &mut seen);
    let topo_order = (0..tasks.len()).collect();
    SolvedPlan::new(root_id, tasks, topo_order)
}

fn assign(dependent: &Dependent, tasks: &mut Vec<Task>, seen: &mut HashMap<usize, usize>) -> usize {
    let ptr = dependent as *const Dependent as usize;
    if let Some(&id) = seen.get(&ptr) {
        return id;
    }
    let mut param_names = Vec::with_capacity(dependent.params.len());
    let mut param_task_ids = Vec::with_capacity(dependent.params.len());
    for param in &dependent.params {
        if let Some(child) = &param.dependent {
            param_task_ids.push(assign(child, tasks, seen));
            param_names.push(param.name);
        }
    }
    let id = tasks.len();
    tasks.push(Task {
        name: dependent.name,
        provider: dependent.provider.clone(),
        nature: dependent.provider.as_ref().map(|p| p.nature()),
        scope: dependent.scope,
        use_cache: dependent.use_cache,
        cache_key: dependent.cache_key,
        param_names,
        param_task_ids,
    });
    seen.insert(ptr, id);
    id
}
