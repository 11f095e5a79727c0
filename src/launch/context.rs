//! Execution context shared by every plan execution.

use alloc::string::ToString;

use super::config::ContextConfig;
use crate::engine::ContractionEngine;
use crate::error::{EinsumError, EinsumResult};

/// An engine prepared once and shared by every plan execution.
///
/// The plan-cache decision is taken here, when the context is built, and
/// never revisited.
#[derive(Debug)]
pub struct ExecutionContext<En: ContractionEngine> {
    engine: En,
    config: ContextConfig,
}

impl<En: ContractionEngine> ExecutionContext<En> {
    pub fn new(mut engine: En, config: ContextConfig) -> EinsumResult<Self> {
        if let Some(lines) = config.plan_cache_lines {
            engine
                .attach_plan_cache(lines)
                .map_err(|e| EinsumError::backend("plan cache attachment", e.to_string()))?;
            log::debug!("attached plan cache with {} lines", lines);
        }
        Ok(Self { engine, config })
    }

    #[inline]
    pub fn engine(&self) -> &En {
        &self.engine
    }

    #[inline]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}
