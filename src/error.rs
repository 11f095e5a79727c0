//! Error types for equation compilation and plan execution.

use alloc::string::String;

use crate::notation::Operand;

/// Errors that can occur while compiling or executing an einsum plan.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum EinsumError {
    /// Malformed equation text.
    #[cfg_attr(feature = "std", error("parse error: {message}"))]
    ParseError { message: String },

    /// The equation uses the `...` broadcast marker.
    #[cfg_attr(feature = "std", error("broadcast einsum with '...' is not supported"))]
    BroadcastUnsupported,

    /// Number of parsed modes does not match the operand's shape length.
    #[cfg_attr(
        feature = "std",
        error("modes substring for operand {operand} and shape don't match: {modes} modes, shape has {extents} extents")
    )]
    ModeCountMismatch {
        operand: Operand,
        modes: usize,
        extents: usize,
    },

    /// An operand carries more modes than the configured maximum.
    #[cfg_attr(feature = "std", error("too many modes in operand {operand}: {count} > {max}"))]
    TooManyModes {
        operand: Operand,
        count: usize,
        max: usize,
    },

    /// Stride sequence length does not match the operand's mode count.
    #[cfg_attr(
        feature = "std",
        error("operand {operand} has {modes} modes but {strides} strides")
    )]
    StrideCountMismatch {
        operand: Operand,
        modes: usize,
        strides: usize,
    },

    /// An extent is negative.
    #[cfg_attr(feature = "std", error("negative extent {extent} for mode '{mode}' of operand {operand}"))]
    NegativeExtent {
        operand: Operand,
        mode: char,
        extent: i64,
    },

    /// Two occurrences of a mode, in the same input or across inputs, have different extents.
    #[cfg_attr(
        feature = "std",
        error("extent mismatch for mode '{mode}': first seen with {expected}, then {found}")
    )]
    ExtentMismatch {
        mode: char,
        expected: i64,
        found: i64,
    },

    /// The output names a mode more than once.
    #[cfg_attr(feature = "std", error("mode '{mode}' appears more than once in the output"))]
    RepeatedOutputMode { mode: char },

    /// Mode appears in the output but in neither input.
    #[cfg_attr(feature = "std", error("output mode '{mode}' not found in any input"))]
    OutputModeNotInInputs { mode: char },

    /// Operand buffers supplied to execute do not match the plan's arity.
    #[cfg_attr(feature = "std", error("operand mismatch: {message}"))]
    OperandMismatch { message: String },

    /// Workspace is smaller than the plan requires.
    #[cfg_attr(feature = "std", error("workspace too small: {got} bytes, plan requires {required}"))]
    WorkspaceTooSmall { required: usize, got: usize },

    /// Non-success status from the tensor-algebra engine.
    #[cfg_attr(feature = "std", error("engine error during {context}: {message}"))]
    Backend {
        context: &'static str,
        message: String,
    },
}

impl EinsumError {
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    pub fn operand(message: impl Into<String>) -> Self {
        Self::OperandMismatch {
            message: message.into(),
        }
    }

    pub fn backend(context: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            context,
            message: message.into(),
        }
    }

    /// Returns true for errors raised while compiling the equation.
    pub fn is_format_error(&self) -> bool {
        !matches!(
            self,
            Self::Backend { .. }
                | Self::OperandMismatch { .. }
                | Self::WorkspaceTooSmall { .. }
                | Self::StrideCountMismatch {
                    operand: Operand::C,
                    ..
                }
        )
    }
}

/// Result type for einsum operations.
pub type EinsumResult<T> = core::result::Result<T, EinsumError>;
