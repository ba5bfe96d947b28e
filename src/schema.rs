//! Provider parameter schemas.
//!
//! Rust has no runtime reflection, so a provider can't be inspected the way
//! a Python callable's signature can. `Schema` is the explicit stand-in: the
//! caller that registers a provider builds its `Vec<ParamSpec>` by hand (or
//! via the `#[derive]`-free builder helpers here), and the solver reads it
//! instead of introspecting.

use std::any::Any;
use std::sync::Arc;

use crate::marker::Marker;
use crate::provider::AnyValue;

/// How a parameter binds when the provider is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Bound by position only.
    PositionalOnly,
    /// Bound by position or by name.
    PositionalOrKeyword,
    /// Bound by name only.
    KeywordOnly,
    /// Variadic positional (`*args`-shaped); ignored during wiring.
    VarPositional,
    /// Variadic keyword (`**kwargs`-shaped); ignored during wiring.
    VarKeyword,
}

/// Describes one parameter of a provider, in place of runtime reflection.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// The parameter's name, used for keyword binding and error paths.
    pub name: &'static str,
    /// How the parameter is passed.
    pub kind: ParamKind,
    /// The declared type name, if known. Used by `bind_by_type` matching.
    pub type_name: Option<&'static str>,
    /// The default value the solver synthesizes a zero-arg provider from
    /// when no marker and no bind hook supply this parameter.
    pub default: Option<AnyValue>,
    /// An explicit marker overriding auto-wiring for this parameter.
    pub marker: Option<Marker>,
}

impl ParamSpec {
    /// Build a required, positional-or-keyword parameter with no marker.
    pub fn positional(name: &'static str, type_name: &'static str) -> Self {
        ParamSpec {
            name,
            kind: ParamKind::PositionalOrKeyword,
            type_name: Some(type_name),
            default: None,
            marker: None,
        }
    }

    /// Build a parameter explicitly wired to `marker`.
    pub fn marked(name: &'static str, type_name: &'static str, marker: Marker) -> Self {
        ParamSpec {
            name,
            kind: ParamKind::PositionalOrKeyword,
            type_name: Some(type_name),
            default: None,
            marker: Some(marker),
        }
    }

    /// Attach a default value: when no marker and no bind hook wire this
    /// parameter, the solver synthesizes a zero-arg provider that returns
    /// `value` instead of failing to solve.
    pub fn with_default<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.default = Some(Arc::new(value));
        self
    }

    /// `true` if a default value is attached.
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// `true` for variadic parameters, which the solver always skips.
    pub fn is_variadic(&self) -> bool {
        matches!(self.kind, ParamKind::VarPositional | ParamKind::VarKeyword)
    }
}

/// The ordered parameter list a provider exposes to the solver.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub params: Vec<ParamSpec>,
}

impl Schema {
    pub fn new(params: Vec<ParamSpec>) -> Self {
        Schema { params }
    }

    pub fn empty() -> Self {
        Schema { params: Vec::new() }
    }
}
