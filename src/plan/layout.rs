//! Shape and stride description of one input operand.

use crate::notation::Extents;

/// Extents and element strides of an operand.
///
/// Empty strides mean the operand is packed with its first mode fastest,
/// which is what the engine assumes when no strides are given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandLayout {
    shape: Extents,
    strides: Extents,
}

impl OperandLayout {
    /// Creates a packed layout.
    pub fn new(shape: &[i64]) -> Self {
        Self {
            shape: Extents::from_slice(shape),
            strides: Extents::new(),
        }
    }

    /// Sets explicit element strides, one per mode.
    pub fn with_strides(mut self, strides: &[i64]) -> Self {
        self.strides = Extents::from_slice(strides);
        self
    }

    /// Creates a row-major (last mode fastest) layout.
    ///
    /// Strides saturate at `i64::MAX`; such a layout cannot address any real
    /// buffer and is rejected by the engine at execution.
    pub fn row_major(shape: &[i64]) -> Self {
        let mut strides = Extents::from_elem(1, shape.len());
        for i in (0..shape.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1].saturating_mul(shape[i + 1].max(1));
        }
        Self {
            shape: Extents::from_slice(shape),
            strides,
        }
    }

    #[inline]
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    #[inline]
    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    /// Number of elements addressed by the shape, `None` on overflow.
    pub fn num_elements(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |len, &e| len.checked_mul(usize::try_from(e.max(0)).ok()?))
    }
}
