//! Executors: the three strategies for running a [`SolvedPlan`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::CacheKey;
use crate::provider::AnyValue;
use crate::scope_state::ScopeState;
use crate::task::SolvedPlan;

/// Which strategy runs a [`SolvedPlan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    /// One task at a time, synchronous providers only.
    SequentialSync,
    /// One task at a time, awaiting async providers as they're reached.
    SequentialAsync,
    /// Tasks whose dependencies are already satisfied run concurrently.
    ConcurrentAsync,
}

impl Executor {
    /// Run `plan` under this strategy. Panics if called with
    /// [`Executor::SequentialSync`] or [`Executor::SequentialAsync`] from a
    /// non-async context is the caller's concern — those two delegate
    /// straight to [`SolvedPlan::execute_sync`] / `execute_async`, while
    /// `ConcurrentAsync` runs independent tasks in parallel with
    /// [`tokio::task::JoinSet`].
    pub async fn run(
        self,
        plan: &SolvedPlan,
        state: &mut ScopeState,
        overrides: &HashMap<CacheKey, AnyValue>,
    ) -> DiResult<AnyValue> {
        match self {
            Executor::SequentialSync => plan.execute_sync(state, overrides),
            Executor::SequentialAsync => plan.execute_async(state, overrides).await,
            Executor::ConcurrentAsync => run_concurrent(plan, state, overrides).await,
        }
    }
}

/// Runs tasks level-by-level: everything whose dependencies are already
/// resolved is spawned onto one [`tokio::task::JoinSet`] at a time, mirroring
/// a structured-concurrency task group — the first provider error stops
/// further spawning, in-flight tasks are drained before the error
/// propagates, and nothing outlives this function call.
async fn run_concurrent(
    plan: &SolvedPlan,
    state: &mut ScopeState,
    overrides: &HashMap<CacheKey, AnyValue>,
) -> DiResult<AnyValue> {
    let tasks = plan.tasks();
    let n = tasks.len();
    let mut results: Vec<Option<AnyValue>> = vec![None; n];
    let mut remaining_deps: Vec<usize> = tasks.iter().map(|t| t.param_task_ids.len()).collect();
    let mut dependents_of: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (id, t) in tasks.iter().enumerate() {
        for &p in &t.param_task_ids {
            dependents_of[p].push(id);
        }
    }

    let mut ready: Vec<usize> = (0..n).filter(|&id| remaining_deps[id] == 0).collect();
    let mut join_set = tokio::task::JoinSet::new();
    let mut first_error: Option<DiError> = None;

    loop {
        // Resolve everything ready via override/cache/no-op inline; only
        // tasks that actually need their provider invoked get spawned.
        let mut next_ready = Vec::new();
        std::mem::swap(&mut ready, &mut next_ready);
        for id in next_ready {
            let task = &tasks[id];
            if let Some(value) = overrides.get(&task.cache_key) {
                complete(id, value.clone(), &mut results, &mut remaining_deps, &dependents_of, &mut ready);
                continue;
            }
            if task.provider.is_none() {
                complete(
                    id,
                    Arc::new(()) as AnyValue,
                    &mut results,
                    &mut remaining_deps,
                    &dependents_of,
                    &mut ready,
                );
                continue;
            }
            if task.use_cache {
                if let Some(cached) = state.get_cached(&task.cache_key) {
                    complete(id, cached, &mut results, &mut remaining_deps, &dependents_of, &mut ready);
                    continue;
                }
            }
            if first_error.is_some() {
                continue;
            }
            let provider = task.provider.clone().unwrap();
            let args: Vec<AnyValue> = task
                .param_task_ids
                .iter()
                .map(|&pid| results[pid].clone().expect("dependency resolved before its dependent"))
                .collect();
            join_set.spawn(async move {
                let outcome = provider.call_async(&args).await;
                (id, outcome)
            });
        }

        if join_set.is_empty() {
            if ready.is_empty() {
                break;
            }
            continue;
        }

        match join_set.join_next().await {
            Some(Ok((id, Ok((value, finalizer))))) => {
                let task = &tasks[id];
                if let Some(finalizer) = finalizer {
                    let scope = task.scope.ok_or_else(|| DiError::Wiring {
                        message: format!("{} is a two-phase resource but declares no scope", task.name),
                        path: vec![task.name],
                    });
                    match scope {
                        Ok(scope) => {
                            if let Err(e) = state.push_finalizer(scope, finalizer) {
                                first_error.get_or_insert(e);
                            }
                        }
                        Err(e) => {
                            first_error.get_or_insert(e);
                        }
                    }
                }
                if task.use_cache {
                    if let Some(scope) = task.scope {
                        if let Err(e) = state.set_cached(scope, task.cache_key, value.clone()) {
                            first_error.get_or_insert(e);
                        }
                    }
                }
                complete(id, value, &mut results, &mut remaining_deps, &dependents_of, &mut ready);
            }
            Some(Ok((id, Err(e)))) => {
                let task = &tasks[id];
                first_error.get_or_insert(DiError::Provider {
                    provider: task.name,
                    message: e.to_string(),
                });
            }
            Some(Err(join_err)) => {
                first_error.get_or_insert(DiError::Solving {
                    message: format!("task panicked: {join_err}"),
                    path: Vec::new(),
                });
            }
            None => {
                if ready.is_empty() {
                    break;
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }
    Ok(results[plan.root_task_id()].clone().expect("root task always resolves"))
}

fn complete(
    id: usize,
    value: AnyValue,
    results: &mut [Option<AnyValue>],
    remaining_deps: &mut [usize],
    dependents_of: &[Vec<usize>],
    ready: &mut Vec<usize>,
) {
    results[id] = Some(value);
    for &dependent in &dependents_of[id] {
        remaining_deps[dependent] -= 1;
        if remaining_deps[dependent] == 0 {
            ready.push(dependent);
        }
    }
}
