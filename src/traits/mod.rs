//! Core traits for the dependency injection container.

mod dispose;

pub use dispose::{Dispose, AsyncDispose};