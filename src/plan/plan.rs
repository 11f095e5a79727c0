//! Compiled einsum plan.

use alloc::string::{String, ToString};
use core::marker::PhantomData;

use num_traits::{One, Zero};

use super::layout::OperandLayout;
use crate::element::Element;
use crate::engine::{
    AutotuneMode, ContractionDesc, ContractionEngine, OperandDesc, ReduceOp, ReductionDesc,
    TensorLayout,
};
use crate::error::{EinsumError, EinsumResult};
use crate::launch::{EinsumConfig, ExecutionContext};
use crate::notation::validation::{
    resolve_output_extents, validate_operand, validate_output_modes, validate_shared_extents,
};
use crate::notation::{infer_output_modes, parse_equation, Extents, Mode, ModeSeq, Operand};

/// Operation a plan dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Two operands: `C = A ⊗ B`.
    Contraction,
    /// One operand: `C = sum(A)` over the modes absent from C.
    Reduction,
}

/// A fully resolved einsum: modes, extents and strides of A and B, modes
/// and extents of C.
///
/// Built once per (equation, shapes) pair and reused across executions with
/// different buffers. C strides are supplied per execution, since the
/// output may be materialized with a different layout on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EinsumPlan<E: Element> {
    modes_a: ModeSeq,
    modes_b: ModeSeq,
    modes_c: ModeSeq,
    extents_a: Extents,
    extents_b: Extents,
    extents_c: Extents,
    strides_a: Extents,
    strides_b: Extents,
    uses_b: bool,
    workspace_size: usize,
    autotune: AutotuneMode,
    _element: PhantomData<fn() -> E>,
}

impl<E: Element> EinsumPlan<E> {
    /// Compiles `equation` with the default configuration.
    ///
    /// `b` is ignored when the equation has no second operand.
    pub fn new(equation: &str, a: &OperandLayout, b: Option<&OperandLayout>) -> EinsumResult<Self> {
        Self::with_config(equation, a, b, &EinsumConfig::default())
    }

    /// Compiles `equation` against the given operand layouts.
    pub fn with_config(
        equation: &str,
        a: &OperandLayout,
        b: Option<&OperandLayout>,
        config: &EinsumConfig,
    ) -> EinsumResult<Self> {
        let parsed = parse_equation(equation)?;
        let uses_b = parsed.uses_b();
        let max_modes = config.max_modes;

        validate_operand(Operand::A, &parsed.a, a.shape(), a.strides(), max_modes)?;

        let empty = OperandLayout::default();
        let (modes_b, layout_b) = match parsed.b {
            Some(modes_b) => (modes_b, b.unwrap_or(&empty)),
            None => {
                if b.is_some() {
                    log::debug!("einsum '{}' has one operand, ignoring layout of B", equation);
                }
                (ModeSeq::new(), &empty)
            }
        };
        validate_operand(Operand::B, &modes_b, layout_b.shape(), layout_b.strides(), max_modes)?;
        validate_shared_extents(&parsed.a, a.shape(), &modes_b, layout_b.shape())?;

        let modes_c = match parsed.output {
            Some(explicit) => explicit,
            None => infer_output_modes(&parsed.a, uses_b.then_some(&modes_b)),
        };
        modes_c.check_capacity(Operand::C, max_modes)?;
        validate_output_modes(&modes_c)?;

        let extents_c =
            resolve_output_extents(&modes_c, &parsed.a, a.shape(), &modes_b, layout_b.shape())?;

        log::debug!(
            "compiled einsum '{}' as {},{}->{} with output shape {:?}",
            equation,
            parsed.a,
            modes_b,
            modes_c,
            extents_c
        );

        Ok(Self {
            modes_a: parsed.a,
            modes_b,
            modes_c,
            extents_a: Extents::from_slice(a.shape()),
            extents_b: Extents::from_slice(layout_b.shape()),
            extents_c,
            strides_a: Extents::from_slice(a.strides()),
            strides_b: Extents::from_slice(layout_b.strides()),
            uses_b,
            workspace_size: config.workspace_size,
            autotune: config.autotune,
            _element: PhantomData,
        })
    }

    /// Extents of the output, one per output mode.
    #[inline]
    pub fn output_shape(&self) -> &[i64] {
        &self.extents_c
    }

    /// Number of elements of the output, `None` if it does not fit in `usize`.
    pub fn output_len(&self) -> Option<usize> {
        self.extents_c
            .iter()
            .try_fold(1usize, |len, &e| len.checked_mul(usize::try_from(e).ok()?))
    }

    #[inline]
    pub fn kind(&self) -> PlanKind {
        if self.uses_b {
            PlanKind::Contraction
        } else {
            PlanKind::Reduction
        }
    }

    #[inline]
    pub fn num_modes_a(&self) -> usize {
        self.modes_a.len()
    }

    #[inline]
    pub fn num_modes_b(&self) -> usize {
        self.modes_b.len()
    }

    #[inline]
    pub fn num_modes_c(&self) -> usize {
        self.modes_c.len()
    }

    pub fn modes_a(&self) -> String {
        self.modes_a.label()
    }

    pub fn modes_b(&self) -> String {
        self.modes_b.label()
    }

    pub fn modes_c(&self) -> String {
        self.modes_c.label()
    }

    /// Workspace size in bytes the engine is told it may use.
    #[inline]
    pub fn workspace_size(&self) -> usize {
        self.workspace_size
    }

    /// Runs the plan on `engine` with α = 1 and β = 0.
    ///
    /// `b` must be given exactly when the plan is a contraction. Empty
    /// `c_strides` mean a packed output. Work may be enqueued
    /// asynchronously on `stream`.
    #[allow(clippy::too_many_arguments)]
    pub fn execute<En: ContractionEngine>(
        &self,
        ctx: &ExecutionContext<En>,
        a: &En::Buffer<E>,
        b: Option<&En::Buffer<E>>,
        c: &mut En::Buffer<E>,
        c_strides: &[i64],
        workspace: &mut En::Workspace,
        stream: &En::Stream,
    ) -> EinsumResult<()> {
        if !c_strides.is_empty() && c_strides.len() != self.modes_c.len() {
            return Err(EinsumError::StrideCountMismatch {
                operand: Operand::C,
                modes: self.modes_c.len(),
                strides: c_strides.len(),
            });
        }

        let engine = ctx.engine();
        let capacity = engine.workspace_capacity(workspace);
        if capacity < self.workspace_size {
            return Err(EinsumError::WorkspaceTooSmall {
                required: self.workspace_size,
                got: capacity,
            });
        }

        let desc_a = create_descriptor::<En, E>(engine, &self.extents_a, &self.strides_a)?;
        let desc_c = create_descriptor::<En, E>(engine, &self.extents_c, c_strides)?;
        let align_a = alignment::<En, E>(engine, a, &desc_a)?;
        let align_c = alignment::<En, E>(engine, &*c, &desc_c)?;

        let alpha = E::Scalar::one();
        let beta = E::Scalar::zero();

        match (self.kind(), b) {
            (PlanKind::Contraction, Some(b)) => {
                let desc_b = create_descriptor::<En, E>(engine, &self.extents_b, &self.strides_b)?;
                let align_b = alignment::<En, E>(engine, b, &desc_b)?;

                let desc = ContractionDesc {
                    a: operand(&desc_a, &self.modes_a, align_a),
                    b: operand(&desc_b, &self.modes_b, align_b),
                    c: operand(&desc_c, &self.modes_c, align_c),
                    compute_type: E::COMPUTE_TYPE,
                    autotune: self.autotune,
                    workspace_size: self.workspace_size,
                };
                log::debug!(
                    "dispatching contraction {},{}->{}",
                    self.modes_a,
                    self.modes_b,
                    self.modes_c
                );
                engine
                    .contract::<E>(&desc, alpha, a, b, beta, c, workspace, stream)
                    .map_err(|e| EinsumError::backend("contraction", e.to_string()))
            }
            (PlanKind::Reduction, None) => {
                let desc = ReductionDesc {
                    a: operand(&desc_a, &self.modes_a, align_a),
                    c: operand(&desc_c, &self.modes_c, align_c),
                    op: ReduceOp::Add,
                    compute_type: E::COMPUTE_TYPE,
                    workspace_size: self.workspace_size,
                };
                log::debug!("dispatching reduction {}->{}", self.modes_a, self.modes_c);
                engine
                    .reduce::<E>(&desc, alpha, a, beta, c, workspace, stream)
                    .map_err(|e| EinsumError::backend("reduction", e.to_string()))
            }
            (PlanKind::Contraction, None) => Err(EinsumError::operand(
                "contraction plan executed without a buffer for B",
            )),
            (PlanKind::Reduction, Some(_)) => Err(EinsumError::operand(
                "reduction plan executed with a buffer for B",
            )),
        }
    }
}

fn create_descriptor<En: ContractionEngine, E: Element>(
    engine: &En,
    extents: &[i64],
    strides: &[i64],
) -> EinsumResult<En::Descriptor> {
    let layout = TensorLayout {
        extents,
        strides,
        data_type: E::DATA_TYPE,
    };
    engine
        .create_descriptor(&layout)
        .map_err(|e| EinsumError::backend("tensor descriptor creation", e.to_string()))
}

fn alignment<En: ContractionEngine, E: Element>(
    engine: &En,
    buffer: &En::Buffer<E>,
    descriptor: &En::Descriptor,
) -> EinsumResult<u32> {
    engine
        .alignment_requirement::<E>(buffer, descriptor)
        .map_err(|e| EinsumError::backend("alignment query", e.to_string()))
}

fn operand<'a, D>(descriptor: &'a D, modes: &'a ModeSeq, alignment: u32) -> OperandDesc<'a, D> {
    let modes: &'a [Mode] = modes.as_slice();
    OperandDesc {
        descriptor,
        modes,
        alignment,
    }
}
