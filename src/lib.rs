//! # Einsum Plan
//!
//! Compiles einsum equations for one or two operands into fully resolved
//! contraction or reduction plans, and drives a tensor-algebra engine with
//! them.
//!
//! ## Features
//!
//! - Equation parsing with explicit (`ij,jk->ik`) or implicit (`ij,jk`) output
//! - Implicit output modes sorted by character value
//! - Mode-count, extent and capacity validation at compile time
//! - Dispatch to contraction (two operands) or sum-reduction (one operand)
//! - Element table mapping storage types to wider accumulation types
//! - Host reference engine for testing and CPU-only use
//!
//! ## Example
//!
//! ```ignore
//! use einsum_plan::{EinsumPlan, ExecutionContext, ContextConfig, OperandLayout};
//! use einsum_plan::engine::CpuEngine;
//!
//! let ctx = ExecutionContext::new(CpuEngine::new(), ContextConfig::new())?;
//! let plan = EinsumPlan::<f32>::new(
//!     "ij,jk->ik",
//!     &OperandLayout::new(&[2, 3]),
//!     Some(&OperandLayout::new(&[3, 4])),
//! )?;
//! assert_eq!(plan.output_shape(), &[2, 4]);
//! plan.execute(&ctx, &a, Some(&b), &mut c, &[], &mut workspace, &())?;
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod element;
pub mod engine;
pub mod error;
pub mod launch;
pub mod notation;
pub mod plan;

pub use element::{ComputeType, DataType, Element};
pub use engine::{AutotuneMode, ContractionEngine, CpuEngine, ReduceOp};
pub use error::{EinsumError, EinsumResult};
pub use launch::{einsum, ContextConfig, EinsumConfig, ExecutionContext};
pub use notation::{parse_equation, Mode, ModeSeq, Operand};
pub use plan::{EinsumPlan, OperandLayout, PlanKind};
