//! Compiled einsum plans.
//!
//! A plan is compiled once from an equation and the layouts of its inputs,
//! then executed any number of times against fresh buffers.

mod layout;
#[allow(clippy::module_inception)]
mod plan;

pub use layout::OperandLayout;
pub use plan::{EinsumPlan, PlanKind};
