//! Launch module for einsum operations.
//!
//! Provides configuration, the shared execution context and a one-shot
//! `einsum` entry point.

mod config;
mod context;
mod executor;

pub use config::{
    ContextConfig, EinsumConfig, DEFAULT_MAX_MODES, DEFAULT_PLAN_CACHE_LINES,
    DEFAULT_WORKSPACE_SIZE, PLAN_CACHE_ENV,
};
pub use context::ExecutionContext;
pub use executor::einsum;
