//! `Task` and `SolvedPlan`: the solver's compiled, executable output.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::CacheKey;
use crate::provider::{AnyValue, Nature, ProviderSpec};
use crate::scope::Scope;
use crate::scope_state::ScopeState;

/// One node of a [`SolvedPlan`]: a provider call with its arguments already
/// resolved to other tasks by dense id.
pub struct Task {
    pub name: &'static str,
    pub provider: Option<Arc<ProviderSpec>>,
    pub nature: Option<Nature>,
    pub scope: Scope,
    pub use_cache: bool,
    pub cache_key: CacheKey,
    pub param_names: Vec<&'static str>,
    pub param_task_ids: Vec<usize>,
}

impl Task {
    fn is_joined_root(&self) -> bool {
        self.provider.is_none()
    }
}

/// Bookkeeping the solver computes once and the executors reuse on every
/// run, kept private so it can change shape without affecting the public
/// `SolvedPlan` API.
struct PlanCache {
    cache_key_to_task: HashMap<CacheKey, usize>,
}

impl PlanCache {
    fn build(tasks: &[Task]) -> Self {
        let mut cache_key_to_task = HashMap::with_capacity(tasks.len());
        for (id, task) in tasks.iter().enumerate() {
            cache_key_to_task.insert(task.cache_key, id);
        }
        PlanCache { cache_key_to_task }
    }
}

/// An immutable, already-validated dependency DAG together with a static
/// topological order, ready to execute any number of times against fresh
/// [`ScopeState`]s.
pub struct SolvedPlan {
    root: usize,
    tasks: Vec<Task>,
    /// Static topological order (dependencies before dependents), ties
    /// broken by input order, computed once at solve time.
    topo_order: Vec<usize>,
    cache: PlanCache,
}

impl SolvedPlan {
    pub(crate) fn new(root: usize, tasks: Vec<Task>, topo_order: Vec<usize>) -> Self {
        let cache = PlanCache::build(&tasks);
        SolvedPlan {
            root,
            tasks,
            topo_order,
            cache,
        }
    }

    pub fn root_task_id(&self) -> usize {
        self.root
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn topo_order(&self) -> &[usize] {
        &self.topo_order
    }

    /// Look up the task id for a given cache key, if this plan contains one.
    pub fn task_id_for(&self, key: &CacheKey) -> Option<usize> {
        self.cache.cache_key_to_task.get(key).copied()
    }

    /// Render the plan as an indented tree rooted at [`SolvedPlan::root_task_id`],
    /// one line per task: its name, nature, scope, and whether it caches.
    /// Opt-in introspection for diagnosing wiring problems — not consulted
    /// by the solver or executors themselves.
    pub fn debug_dump(&self) -> String {
        let mut out = String::new();
        self.dump_task(self.root, 0, &mut out);
        out
    }

    fn dump_task(&self, id: usize, depth: usize, out: &mut String) {
        let task = &self.tasks[id];
        let indent = "  ".repeat(depth);
        let nature = task
            .nature
            .map(|n| format!("{n:?}"))
            .unwrap_or_else(|| "Joined".to_string());
        let scope = task.scope.unwrap_or("<unscoped>");
        out.push_str(&format!(
            "{indent}{} [{nature}, scope={scope}, cache={}]\n",
            task.name, task.use_cache
        ));
        for (name, &child_id) in task.param_names.iter().zip(&task.param_task_ids) {
            out.push_str(&format!("{indent}  {name}:\n"));
            self.dump_task(child_id, depth + 2, out);
        }
    }

    /// Execute every task in topological order using only synchronous
    /// providers, returning the root's value.
    ///
    /// `overrides` lets a caller supply a pre-built value for a task
    /// instead of invoking its provider — the value is used in place of a
    /// cache hit or a provider call, but is not itself written back into
    /// `state`'s persistent cache, so it applies to this run only.
    pub fn execute_sync(
        &self,
        state: &mut ScopeState,
        overrides: &HashMap<CacheKey, AnyValue>,
    ) -> DiResult<AnyValue> {
        let mut results: Vec<Option<AnyValue>> = vec![None; self.tasks.len()];
        for &id in &self.topo_order {
            let task = &self.tasks[id];
            if let Some(value) = overrides.get(&task.cache_key) {
                results[id] = Some(value.clone());
                continue;
            }
            if task.is_joined_root() {
                results[id] = Some(Arc::new(()) as AnyValue);
                continue;
            }
            if let Some(nature) = task.nature {
                if nature.is_async() {
                    return Err(DiError::IncompatibleDependency {
                        provider: task.name,
                        scope: task.scope.unwrap_or("<unscoped>"),
                    });
                }
            }
            if task.use_cache {
                if let Some(cached) = state.get_cached(&task.cache_key) {
                    results[id] = Some(cached);
                    continue;
                }
            }
            let args = self.collect_args(task, &results);
            let provider = task.provider.as_ref().expect("non-root task always has a provider");
            let (value, finalizer) = provider.call_sync(&args).map_err(|e| wrap_provider_error(task, e))?;
            if let Some(finalizer) = finalizer {
                let scope = task.scope.ok_or(DiError::Wiring {
                    message: format!("{} is a two-phase resource but declares no scope", task.name),
                    path: vec![task.name],
                })?;
                state.push_finalizer(scope, finalizer)?;
            }
            if task.use_cache {
                if let Some(scope) = task.scope {
                    state.set_cached(scope, task.cache_key, value.clone())?;
                }
            }
            results[id] = Some(value);
        }
        Ok(results[self.root].clone().expect("root task always resolves"))
    }

    /// Execute every task in topological order, awaiting async providers
    /// one at a time.
    pub async fn execute_async(
        &self,
        state: &mut ScopeState,
        overrides: &HashMap<CacheKey, AnyValue>,
    ) -> DiResult<AnyValue> {
        let mut results: Vec<Option<AnyValue>> = vec![None; self.tasks.len()];
        for &id in &self.topo_order {
            let task = &self.tasks[id];
            if let Some(value) = overrides.get(&task.cache_key) {
                results[id] = Some(value.clone());
                continue;
            }
            if task.is_joined_root() {
                results[id] = Some(Arc::new(()) as AnyValue);
                continue;
            }
            if task.use_cache {
                if let Some(cached) = state.get_cached(&task.cache_key) {
                    results[id] = Some(cached);
                    continue;
                }
            }
            let args = self.collect_args(task, &results);
            let provider = task.provider.as_ref().expect("non-root task always has a provider");
            let (value, finalizer) = provider.call_async(&args).await.map_err(|e| wrap_provider_error(task, e))?;
            if let Some(finalizer) = finalizer {
                let scope = task.scope.ok_or(DiError::Wiring {
                    message: format!("{} is a two-phase resource but declares no scope", task.name),
                    path: vec![task.name],
                })?;
                state.push_finalizer(scope, finalizer)?;
            }
            if task.use_cache {
                if let Some(scope) = task.scope {
                    state.set_cached(scope, task.cache_key, value.clone())?;
                }
            }
            results[id] = Some(value);
        }
        Ok(results[self.root].clone().expect("root task always resolves"))
    }

    fn collect_args(&self, task: &Task, results: &[Option<AnyValue>]) -> Vec<AnyValue> {
        task.param_task_ids
            .iter()
            .map(|&pid| results[pid].clone().expect("dependency resolved before its dependent"))
            .collect()
    }
}

fn wrap_provider_error(task: &Task, err: DiError) -> DiError {
    match err {
        DiError::Provider { .. } => err,
        other => DiError::Provider {
            provider: task.name,
            message: other.to_string(),
        },
    }
}
