//! Equation parser.
//!
//! Splits strings like `"ij,jk->ik"` into per-operand mode sequences.

use core::ops::Range;

use super::modes::{Mode, ModeSeq};
use crate::error::{EinsumError, EinsumResult};

const ARROW: &str = "->";
const COMMA: char = ',';
const BROADCAST: &str = "...";

/// Mode sequences extracted from an equation, before any shape is consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEquation {
    /// Modes of the first operand.
    pub a: ModeSeq,
    /// Modes of the second operand, `None` when the equation has no comma.
    pub b: Option<ModeSeq>,
    /// Explicit output modes, `None` when the equation has no `->`.
    pub output: Option<ModeSeq>,
}

impl ParsedEquation {
    /// True when the output must be inferred.
    #[inline]
    pub fn is_implicit(&self) -> bool {
        self.output.is_none()
    }

    /// True for two-operand equations.
    #[inline]
    pub fn uses_b(&self) -> bool {
        self.b.is_some()
    }
}

/// Parses an einsum equation.
///
/// # Grammar
///
/// ```text
/// equation ::= modes (',' modes)? ('->' modes)?
/// modes    ::= (mode | whitespace)*
/// mode     ::= any character other than whitespace, ',', '-', '>', '.'
/// ```
///
/// The broadcast marker `...` is rejected. Whitespace is skipped and never
/// counted as a mode.
pub fn parse_equation(equation: &str) -> EinsumResult<ParsedEquation> {
    if equation.contains(BROADCAST) {
        return Err(EinsumError::BroadcastUnsupported);
    }

    let arrow_pos = equation.find(ARROW);
    let comma_pos = equation.find(COMMA);

    if let Some(arrow) = arrow_pos {
        if equation.rfind(ARROW) != Some(arrow) {
            return Err(EinsumError::parse("multiple '->' in equation"));
        }
    }
    if let Some(comma) = comma_pos {
        if equation.rfind(COMMA) != Some(comma) {
            return Err(EinsumError::parse("at most two operands are supported"));
        }
        if matches!(arrow_pos, Some(arrow) if comma > arrow) {
            return Err(EinsumError::parse("',' is not allowed in the output clause"));
        }
    }

    let windows = Windows::locate(equation.len(), arrow_pos, comma_pos);
    log::trace!("einsum '{}': windows {:?}", equation, windows);

    let a = extract_modes(equation, windows.a)?;
    let b = match windows.b {
        Some(range) => Some(extract_modes(equation, range)?),
        None => None,
    };
    let output = match windows.c {
        Some(range) => Some(extract_modes(equation, range)?),
        None => None,
    };

    Ok(ParsedEquation { a, b, output })
}

/// Byte ranges of the A, B and C mode text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Windows {
    a: Range<usize>,
    b: Option<Range<usize>>,
    c: Option<Range<usize>>,
}

impl Windows {
    fn locate(len: usize, arrow: Option<usize>, comma: Option<usize>) -> Self {
        let a_end = comma.or(arrow).unwrap_or(len);
        let b = comma.map(|comma| comma + COMMA.len_utf8()..arrow.unwrap_or(len));
        let c = arrow.map(|arrow| arrow + ARROW.len()..len);
        Self { a: 0..a_end, b, c }
    }
}

fn extract_modes(equation: &str, window: Range<usize>) -> EinsumResult<ModeSeq> {
    let mut modes = ModeSeq::new();
    for c in equation[window].chars() {
        if c.is_whitespace() {
            continue;
        }
        if is_reserved(c) {
            return Err(EinsumError::parse(alloc::format!(
                "invalid character '{}' in equation",
                c
            )));
        }
        modes.push(c);
    }
    Ok(modes)
}

fn is_reserved(c: Mode) -> bool {
    matches!(c, ',' | '-' | '>' | '.')
}

/// Infers the output modes of an implicit equation.
///
/// Takes the set of modes of A absent from B, then those of B absent from A,
/// and sorts the result by character value so the order does not depend on
/// operand order. A mode repeated inside one operand is kept once.
pub fn infer_output_modes(a: &ModeSeq, b: Option<&ModeSeq>) -> ModeSeq {
    let empty = ModeSeq::new();
    let b = b.unwrap_or(&empty);

    let mut output = ModeSeq::new();
    let exclusive_a = a.iter().filter(|&m| !b.contains(m));
    let exclusive_b = b.iter().filter(|&m| !a.contains(m));
    for mode in exclusive_a.chain(exclusive_b) {
        if !output.contains(mode) {
            output.push(mode);
        }
    }
    output.sort();
    output
}
