//! Error types for the solver and executor.

use std::fmt;

/// Dependency injection errors.
///
/// Represents the failure taxonomy solving and execution can surface.
/// Solving errors are returned from [`crate::container::Container::solve`]
/// synchronously — they are never panics, and a solve that fails never
/// leaves behind a partially usable `SolvedPlan`. Execution errors
/// propagate from [`crate::task::SolvedPlan::execute_sync`] /
/// `execute_async` the same way.
///
/// # Examples
///
/// ```
/// use depgraph_di::DiError;
///
/// let wiring = DiError::Wiring { message: "no provider".into(), path: vec!["Root"] };
/// let cycle = DiError::DependencyCycle { path: vec!["A", "B", "A"] };
/// println!("{wiring}");
/// println!("{cycle}");
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// A parameter could not be resolved: no marker, no default, no usable
    /// annotation, or the annotation is not constructible.
    Wiring {
        message: String,
        path: Vec<&'static str>,
    },
    /// The depth-first solving walk revisited a provider already on the
    /// current path.
    DependencyCycle { path: Vec<&'static str> },
    /// A dependent referenced a scope tag not declared to the container.
    UnknownScope {
        scope: &'static str,
        path: Vec<&'static str>,
    },
    /// A dependent would consume a sub-dependent whose scope is strictly
    /// inner of its own.
    ScopeViolation {
        dependent: &'static str,
        dependent_scope: &'static str,
        subdependent: &'static str,
        subdependent_scope: &'static str,
    },
    /// The same cache key was solved under two different scopes, or the
    /// root dependent had no provider.
    Solving {
        message: String,
        path: Vec<&'static str>,
    },
    /// `enter_scope` was called for a tag that is already active in this
    /// `ScopeState`.
    DuplicateScope { scope: &'static str },
    /// `pop_scope`/`get`/`set` referenced a scope tag with no active layer.
    UnknownActiveScope { scope: &'static str },
    /// An async-generator provider was assigned to a scope whose teardown
    /// stack is sync-only.
    IncompatibleDependency {
        provider: &'static str,
        scope: &'static str,
    },
    /// A provider panicked or returned an error during construction.
    Provider {
        provider: &'static str,
        message: String,
    },
    /// A scope's teardown finalizer raised after the primary result was
    /// already determined. Carries the primary error (if execution itself
    /// failed) alongside this teardown failure so neither is silently
    /// dropped.
    Teardown {
        primary: Option<Box<DiError>>,
        teardown: Box<DiError>,
    },
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::Wiring { message, path } => {
                write!(f, "wiring error: {message}\npath: {}", path.join(" -> "))
            }
            DiError::DependencyCycle { path } => {
                write!(f, "dependency cycle: {}", path.join(" -> "))
            }
            DiError::UnknownScope { scope, path } => {
                write!(
                    f,
                    "unknown scope \"{scope}\"\npath: {}",
                    path.join(" -> ")
                )
            }
            DiError::ScopeViolation {
                dependent,
                dependent_scope,
                subdependent,
                subdependent_scope,
            } => write!(
                f,
                "{dependent} cannot depend on {subdependent} because {subdependent}'s scope ({subdependent_scope}) is narrower than {dependent}'s scope ({dependent_scope})"
            ),
            DiError::Solving { message, path } => {
                write!(f, "solving error: {message}\npath: {}", path.join(" -> "))
            }
            DiError::DuplicateScope { scope } => {
                write!(f, "scope \"{scope}\" is already active")
            }
            DiError::UnknownActiveScope { scope } => {
                write!(f, "scope \"{scope}\" is not amongst the active scopes")
            }
            DiError::IncompatibleDependency { provider, scope } => write!(
                f,
                "{provider} is an async-resource dependency and cannot be used in the sync scope {scope}"
            ),
            DiError::Provider { provider, message } => {
                write!(f, "provider {provider} failed: {message}")
            }
            DiError::Teardown { primary, teardown } => match primary {
                Some(primary) => write!(f, "{primary} (teardown also failed: {teardown})"),
                None => write!(f, "teardown failed: {teardown}"),
            },
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations.
pub type DiResult<T> = Result<T, DiError>;
