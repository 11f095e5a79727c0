//! Tensor-algebra engine interface.
//!
//! A plan never touches tensor data itself. It builds descriptors from its
//! resolved modes, extents and strides and hands them to a
//! [`ContractionEngine`], which owns the actual kernels.

mod cpu;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::element::{ComputeType, DataType, Element};
use crate::notation::Mode;

pub use cpu::{CpuDescriptor, CpuEngine, CpuEngineError};

/// Extents and strides of one tensor, as handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorLayout<'a> {
    pub extents: &'a [i64],
    /// Element strides. Empty means packed, first mode fastest.
    pub strides: &'a [i64],
    pub data_type: DataType,
}

/// One operand of a contraction or reduction.
#[derive(Debug)]
pub struct OperandDesc<'a, D> {
    pub descriptor: &'a D,
    pub modes: &'a [Mode],
    pub alignment: u32,
}

/// How the engine may tune its kernel choice across repeated calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutotuneMode {
    /// Always use the default heuristic.
    None,
    /// Try a different candidate on each of the first `count` calls, then
    /// stick with the fastest.
    Incremental { count: u32 },
}

impl Default for AutotuneMode {
    fn default() -> Self {
        AutotuneMode::Incremental { count: 4 }
    }
}

/// Element-wise operator used to fold modes away in a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceOp {
    Add,
    Mul,
}

/// `C = alpha * sum(A * B) + beta * C`.
#[derive(Debug)]
pub struct ContractionDesc<'a, D> {
    pub a: OperandDesc<'a, D>,
    pub b: OperandDesc<'a, D>,
    pub c: OperandDesc<'a, D>,
    pub compute_type: ComputeType,
    pub autotune: AutotuneMode,
    pub workspace_size: usize,
}

/// `C = alpha * op(A) + beta * C`, folding every mode of A absent from C.
#[derive(Debug)]
pub struct ReductionDesc<'a, D> {
    pub a: OperandDesc<'a, D>,
    pub c: OperandDesc<'a, D>,
    pub op: ReduceOp,
    pub compute_type: ComputeType,
    pub workspace_size: usize,
}

/// A backend able to run tensor contractions and reductions.
///
/// Work may be enqueued asynchronously on `stream`; the caller synchronizes
/// before reading `c`.
pub trait ContractionEngine {
    type Descriptor;
    type Buffer<E: Element>: ?Sized;
    type Workspace: ?Sized;
    type Stream;
    type Error: fmt::Display;

    /// Attaches a cache of tuned plans with `cachelines` entries.
    fn attach_plan_cache(&mut self, cachelines: usize) -> Result<(), Self::Error>;

    fn create_descriptor(&self, layout: &TensorLayout<'_>) -> Result<Self::Descriptor, Self::Error>;

    /// Alignment in bytes the engine can rely on for `buffer`.
    fn alignment_requirement<E: Element>(
        &self,
        buffer: &Self::Buffer<E>,
        descriptor: &Self::Descriptor,
    ) -> Result<u32, Self::Error>;

    /// Usable size of a workspace in bytes.
    fn workspace_capacity(&self, workspace: &Self::Workspace) -> usize;

    #[allow(clippy::too_many_arguments)]
    fn contract<E: Element>(
        &self,
        desc: &ContractionDesc<'_, Self::Descriptor>,
        alpha: E::Scalar,
        a: &Self::Buffer<E>,
        b: &Self::Buffer<E>,
        beta: E::Scalar,
        c: &mut Self::Buffer<E>,
        workspace: &mut Self::Workspace,
        stream: &Self::Stream,
    ) -> Result<(), Self::Error>;

    #[allow(clippy::too_many_arguments)]
    fn reduce<E: Element>(
        &self,
        desc: &ReductionDesc<'_, Self::Descriptor>,
        alpha: E::Scalar,
        a: &Self::Buffer<E>,
        beta: E::Scalar,
        c: &mut Self::Buffer<E>,
        workspace: &mut Self::Workspace,
        stream: &Self::Stream,
    ) -> Result<(), Self::Error>;
}
