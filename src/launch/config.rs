//! Configuration for plan compilation and execution contexts.

use serde::{Deserialize, Serialize};

use crate::engine::AutotuneMode;

/// Default maximum number of modes per operand.
pub const DEFAULT_MAX_MODES: usize = 40;

/// Workspace handed to the engine on every call: 1 GiB.
pub const DEFAULT_WORKSPACE_SIZE: usize = 1024 * 1024 * 8 * 128;

/// Number of plan-cache lines attached when the cache is enabled.
pub const DEFAULT_PLAN_CACHE_LINES: usize = 512;

/// Environment toggle read by [`ContextConfig::from_env`].
pub const PLAN_CACHE_ENV: &str = "EINSUM_PLAN_CACHE";

/// Options fixed when a plan is compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EinsumConfig {
    /// Maximum number of modes per operand, output included.
    pub max_modes: usize,
    /// Workspace size in bytes passed to the engine.
    pub workspace_size: usize,
    /// Kernel tuning mode for contractions.
    pub autotune: AutotuneMode,
}

impl Default for EinsumConfig {
    fn default() -> Self {
        Self {
            max_modes: DEFAULT_MAX_MODES,
            workspace_size: DEFAULT_WORKSPACE_SIZE,
            autotune: AutotuneMode::default(),
        }
    }
}

impl EinsumConfig {
    /// Creates a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of modes per operand.
    pub fn with_max_modes(mut self, max_modes: usize) -> Self {
        self.max_modes = max_modes;
        self
    }

    /// Sets the workspace size in bytes.
    pub fn with_workspace_size(mut self, workspace_size: usize) -> Self {
        self.workspace_size = workspace_size;
        self
    }

    /// Sets the autotune mode.
    pub fn with_autotune(mut self, autotune: AutotuneMode) -> Self {
        self.autotune = autotune;
        self
    }
}

/// Options fixed when an execution context is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Plan-cache lines to attach to the engine, `None` for no cache.
    pub plan_cache_lines: Option<usize>,
}

impl ContextConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a plan cache with `lines` entries.
    pub fn with_plan_cache(mut self, lines: usize) -> Self {
        self.plan_cache_lines = Some(lines);
        self
    }

    /// Attaches a plan cache of [`DEFAULT_PLAN_CACHE_LINES`] entries.
    pub fn with_default_plan_cache(self) -> Self {
        self.with_plan_cache(DEFAULT_PLAN_CACHE_LINES)
    }

    /// Reads [`PLAN_CACHE_ENV`] once; a value of `1` enables the cache.
    ///
    /// Meant to be called at startup, with the result passed explicitly to
    /// [`ExecutionContext::new`](super::ExecutionContext::new).
    #[cfg(feature = "std")]
    pub fn from_env() -> Self {
        Self::from_toggle(std::env::var(PLAN_CACHE_ENV).ok().as_deref())
    }

    #[cfg_attr(not(feature = "std"), allow(dead_code))]
    fn from_toggle(value: Option<&str>) -> Self {
        match value.and_then(|v| v.trim().parse::<i64>().ok()) {
            Some(1) => Self::new().with_default_plan_cache(),
            _ => Self::new(),
        }
    }
}
