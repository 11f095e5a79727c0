//! Einsum equation parsing and validation.
//!
//! Supports the two-operand grammar used by the planner:
//! - Contraction: `ij,jk->ik`
//! - Reduction: `ij->i`
//! - Implicit output: `ij,jk` (implies `->ik`, sorted by character value)

mod modes;
mod parser;
pub mod validation;

pub use modes::{Mode, ModeSeq, Operand, INLINE_MODES};
pub use parser::{infer_output_modes, parse_equation, ParsedEquation};
pub use validation::Extents;
