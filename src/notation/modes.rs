//! Mode labels and mode sequences.

use alloc::string::String;
use core::fmt;

use smallvec::SmallVec;

use crate::error::{EinsumError, EinsumResult};

/// A single mode label. Labels are compared by raw character identity.
pub type Mode = char;

/// Number of modes stored inline before a sequence spills to the heap.
pub const INLINE_MODES: usize = 8;

/// Identifies one of the three operands of `C = op(A, B)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    A,
    B,
    C,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::A => write!(f, "A"),
            Operand::B => write!(f, "B"),
            Operand::C => write!(f, "C"),
        }
    }
}

/// Ordered mode labels of one operand.
///
/// Position `i` corresponds to entry `i` of the operand's extent and stride
/// sequences. The container grows freely; the maximum mode count is enforced
/// with [`ModeSeq::check_capacity`] rather than by truncating during scanning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ModeSeq {
    modes: SmallVec<[Mode; INLINE_MODES]>,
}

impl ModeSeq {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence from characters, in order.
    pub fn from_chars(chars: impl IntoIterator<Item = Mode>) -> Self {
        Self {
            modes: chars.into_iter().collect(),
        }
    }

    /// Appends a mode.
    #[inline]
    pub fn push(&mut self, mode: Mode) {
        self.modes.push(mode);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.modes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        self.modes.iter().copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Mode] {
        &self.modes
    }

    /// Checks if this sequence contains a mode.
    pub fn contains(&self, mode: Mode) -> bool {
        self.modes.contains(&mode)
    }

    /// Returns the position of the first occurrence of a mode.
    pub fn position(&self, mode: Mode) -> Option<usize> {
        self.modes.iter().position(|&m| m == mode)
    }

    /// Sorts modes by character value.
    pub fn sort(&mut self) {
        self.modes.sort_unstable();
    }

    /// Fails if this sequence holds more than `max` modes.
    pub fn check_capacity(&self, operand: Operand, max: usize) -> EinsumResult<()> {
        if self.modes.len() > max {
            return Err(EinsumError::TooManyModes {
                operand,
                count: self.modes.len(),
                max,
            });
        }
        Ok(())
    }

    /// Mode labels as a string, for diagnostics.
    pub fn label(&self) -> String {
        self.modes.iter().collect()
    }
}

impl fmt::Display for ModeSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for mode in &self.modes {
            write!(f, "{}", mode)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ModeSeq {
    type Item = &'a Mode;
    type IntoIter = core::slice::Iter<'a, Mode>;

    fn into_iter(self) -> Self::IntoIter {
        self.modes.iter()
    }
}
