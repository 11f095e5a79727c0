//! Validation of parsed modes against operand shapes.

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::modes::{Mode, ModeSeq, Operand, INLINE_MODES};
use crate::error::{EinsumError, EinsumResult};

/// Extent sequence of one operand.
pub type Extents = SmallVec<[i64; INLINE_MODES]>;

/// Validates one input operand's modes against its shape and strides.
///
/// Checks, in order:
/// - number of modes equals the shape length
/// - number of modes does not exceed `max_modes`
/// - strides are either empty (packed default) or one per mode
/// - every extent is non-negative
pub fn validate_operand(
    operand: Operand,
    modes: &ModeSeq,
    shape: &[i64],
    strides: &[i64],
    max_modes: usize,
) -> EinsumResult<()> {
    if modes.len() != shape.len() {
        return Err(EinsumError::ModeCountMismatch {
            operand,
            modes: modes.len(),
            extents: shape.len(),
        });
    }
    modes.check_capacity(operand, max_modes)?;

    if !strides.is_empty() && strides.len() != modes.len() {
        return Err(EinsumError::StrideCountMismatch {
            operand,
            modes: modes.len(),
            strides: strides.len(),
        });
    }

    for (mode, &extent) in modes.iter().zip(shape) {
        if extent < 0 {
            return Err(EinsumError::NegativeExtent {
                operand,
                mode,
                extent,
            });
        }
    }

    Ok(())
}

/// Checks that every occurrence of a mode, in A and in B, has the same extent.
///
/// A mode repeated inside one operand is held to the same rule as a mode
/// shared between operands.
pub fn validate_shared_extents(
    modes_a: &ModeSeq,
    extents_a: &[i64],
    modes_b: &ModeSeq,
    extents_b: &[i64],
) -> EinsumResult<()> {
    let mut dim_map: HashMap<Mode, i64> = HashMap::new();

    let occurrences = modes_a
        .iter()
        .zip(extents_a.iter().copied())
        .chain(modes_b.iter().zip(extents_b.iter().copied()));
    for (mode, extent) in occurrences {
        let expected = *dim_map.entry(mode).or_insert(extent);
        if expected != extent {
            return Err(EinsumError::ExtentMismatch {
                mode,
                expected,
                found: extent,
            });
        }
    }
    Ok(())
}

/// Rejects an output that names the same mode twice.
pub fn validate_output_modes(output: &ModeSeq) -> EinsumResult<()> {
    for (pos, mode) in output.iter().enumerate() {
        if output.position(mode) != Some(pos) {
            return Err(EinsumError::RepeatedOutputMode { mode });
        }
    }
    Ok(())
}

/// Resolves the extent of each output mode.
///
/// A's modes are searched first, then B's; the first match wins. A mode
/// found in neither operand is an error.
pub fn resolve_output_extents(
    output: &ModeSeq,
    modes_a: &ModeSeq,
    extents_a: &[i64],
    modes_b: &ModeSeq,
    extents_b: &[i64],
) -> EinsumResult<Extents> {
    output
        .iter()
        .map(|mode| {
            if let Some(pos) = modes_a.position(mode) {
                Ok(extents_a[pos])
            } else if let Some(pos) = modes_b.position(mode) {
                Ok(extents_b[pos])
            } else {
                Err(EinsumError::OutputModeNotInInputs { mode })
            }
        })
        .collect()
}
