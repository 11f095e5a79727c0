//! One-shot einsum execution.

use super::config::EinsumConfig;
use super::context::ExecutionContext;
use crate::element::Element;
use crate::engine::ContractionEngine;
use crate::error::{EinsumError, EinsumResult};
use crate::plan::{EinsumPlan, OperandLayout};

/// Compiles `equation` and executes it once.
///
/// # Arguments
/// * `ctx` - The execution context
/// * `equation` - Einsum equation (e.g., "ij,jk->ik")
/// * `inputs` - One or two input layouts with their buffers
/// * `output` - Output buffer, written packed
/// * `workspace` - Scratch memory of at least the configured workspace size
/// * `stream` - Stream to enqueue work on
/// * `config` - Optional configuration
///
/// Returns the compiled plan so it can be reused for later calls with the
/// same shapes.
///
/// # Example
///
/// ```ignore
/// let plan = einsum::<CpuEngine, f32>(
///     &ctx,
///     "ij,jk->ik",
///     &[(&a_layout, &a[..]), (&b_layout, &b[..])],
///     &mut c,
///     &mut workspace,
///     &(),
///     None,
/// )?;
/// ```
pub fn einsum<En: ContractionEngine, E: Element>(
    ctx: &ExecutionContext<En>,
    equation: &str,
    inputs: &[(&OperandLayout, &En::Buffer<E>)],
    output: &mut En::Buffer<E>,
    workspace: &mut En::Workspace,
    stream: &En::Stream,
    config: Option<EinsumConfig>,
) -> EinsumResult<EinsumPlan<E>> {
    let config = config.unwrap_or_default();

    let plan = match inputs {
        [(layout_a, _)] => EinsumPlan::with_config(equation, layout_a, None, &config)?,
        [(layout_a, _), (layout_b, _)] => {
            EinsumPlan::with_config(equation, layout_a, Some(*layout_b), &config)?
        }
        _ => {
            return Err(EinsumError::operand(alloc::format!(
                "expected one or two inputs, got {}",
                inputs.len()
            )));
        }
    };

    let a = inputs[0].1;
    let b = inputs.get(1).map(|(_, buffer)| *buffer);
    plan.execute(ctx, a, b, output, &[], workspace, stream)?;

    Ok(plan)
}
