//! Host-memory reference engine.
//!
//! Executes contractions and reductions with plain strided loops. Every mode
//! is iterated explicitly, so repeated modes, negative strides and zero
//! extents all behave as the index algebra says they should. Accumulation
//! happens in [`Element::Scalar`].

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use num_traits::{One, Zero};

use super::{ContractionDesc, ContractionEngine, ReduceOp, ReductionDesc, TensorLayout};
use crate::element::{DataType, Element};
use crate::notation::{Extents, Mode};

/// Largest alignment reported for a host buffer.
const MAX_ALIGNMENT: usize = 256;

/// Error raised by [`CpuEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuEngineError {
    message: String,
}

impl CpuEngineError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CpuEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CpuEngineError {}

/// Tensor descriptor with strides already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuDescriptor {
    extents: Extents,
    strides: Extents,
    data_type: DataType,
}

impl CpuDescriptor {
    pub fn extents(&self) -> &[i64] {
        &self.extents
    }

    pub fn strides(&self) -> &[i64] {
        &self.strides
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Reference engine operating on host slices.
#[derive(Debug, Clone, Default)]
pub struct CpuEngine {
    plan_cache_lines: Option<usize>,
}

impl CpuEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of plan-cache lines attached, if any.
    pub fn plan_cache_lines(&self) -> Option<usize> {
        self.plan_cache_lines
    }
}

impl ContractionEngine for CpuEngine {
    type Descriptor = CpuDescriptor;
    type Buffer<E: Element> = [E];
    type Workspace = [u8];
    type Stream = ();
    type Error = CpuEngineError;

    fn attach_plan_cache(&mut self, cachelines: usize) -> Result<(), CpuEngineError> {
        if cachelines == 0 {
            return Err(CpuEngineError::new("plan cache needs at least one cacheline"));
        }
        self.plan_cache_lines = Some(cachelines);
        Ok(())
    }

    fn create_descriptor(&self, layout: &TensorLayout<'_>) -> Result<CpuDescriptor, CpuEngineError> {
        if let Some(&extent) = layout.extents.iter().find(|&&e| e < 0) {
            return Err(CpuEngineError::new(format!("negative extent {}", extent)));
        }
        let strides = if layout.strides.is_empty() {
            packed_strides(layout.extents)?
        } else if layout.strides.len() == layout.extents.len() {
            Extents::from_slice(layout.strides)
        } else {
            return Err(CpuEngineError::new(format!(
                "{} strides for {} extents",
                layout.strides.len(),
                layout.extents.len()
            )));
        };

        Ok(CpuDescriptor {
            extents: Extents::from_slice(layout.extents),
            strides,
            data_type: layout.data_type,
        })
    }

    fn alignment_requirement<E: Element>(
        &self,
        buffer: &[E],
        descriptor: &CpuDescriptor,
    ) -> Result<u32, CpuEngineError> {
        check_data_type::<E>(descriptor)?;
        let addr = buffer.as_ptr() as usize;
        let alignment = match addr {
            0 => MAX_ALIGNMENT,
            _ => (1usize << addr.trailing_zeros()).min(MAX_ALIGNMENT),
        };
        Ok(alignment as u32)
    }

    fn workspace_capacity(&self, workspace: &[u8]) -> usize {
        workspace.len()
    }

    fn contract<E: Element>(
        &self,
        desc: &ContractionDesc<'_, CpuDescriptor>,
        alpha: E::Scalar,
        a: &[E],
        b: &[E],
        beta: E::Scalar,
        c: &mut [E],
        _workspace: &mut [u8],
        _stream: &(),
    ) -> Result<(), CpuEngineError> {
        log::trace!(
            "cpu contraction {:?},{:?}->{:?}",
            desc.a.modes,
            desc.b.modes,
            desc.c.modes
        );
        let terms = [
            Term::new(a, desc.a.descriptor, desc.a.modes)?,
            Term::new(b, desc.b.descriptor, desc.b.modes)?,
        ];
        check_data_type::<E>(desc.c.descriptor)?;
        check_rank(desc.c.descriptor, desc.c.modes)?;
        let output = OutputTerm {
            desc: desc.c.descriptor,
            modes: desc.c.modes,
        };
        fold_into(&terms, ReduceOp::Add, alpha, beta, c, &output)
    }

    fn reduce<E: Element>(
        &self,
        desc: &ReductionDesc<'_, CpuDescriptor>,
        alpha: E::Scalar,
        a: &[E],
        beta: E::Scalar,
        c: &mut [E],
        _workspace: &mut [u8],
        _stream: &(),
    ) -> Result<(), CpuEngineError> {
        log::trace!("cpu reduction {:?}->{:?} ({:?})", desc.a.modes, desc.c.modes, desc.op);
        let terms = [Term::new(a, desc.a.descriptor, desc.a.modes)?];
        check_data_type::<E>(desc.c.descriptor)?;
        check_rank(desc.c.descriptor, desc.c.modes)?;
        let output = OutputTerm {
            desc: desc.c.descriptor,
            modes: desc.c.modes,
        };
        fold_into(&terms, desc.op, alpha, beta, c, &output)
    }
}

/// Packed strides with the first mode fastest.
fn packed_strides(extents: &[i64]) -> Result<Extents, CpuEngineError> {
    let mut strides = Extents::with_capacity(extents.len());
    let mut stride = 1i64;
    for (axis, &extent) in extents.iter().enumerate() {
        strides.push(stride);
        if axis + 1 < extents.len() {
            stride = stride.checked_mul(extent.max(1)).ok_or_else(|| {
                CpuEngineError::new(format!("packed strides of {:?} overflow i64", extents))
            })?;
        }
    }
    Ok(strides)
}

fn check_data_type<E: Element>(descriptor: &CpuDescriptor) -> Result<(), CpuEngineError> {
    if descriptor.data_type != E::DATA_TYPE {
        return Err(CpuEngineError::new(format!(
            "descriptor holds {:?}, buffer holds {:?}",
            descriptor.data_type,
            E::DATA_TYPE
        )));
    }
    Ok(())
}

fn check_rank(descriptor: &CpuDescriptor, modes: &[Mode]) -> Result<(), CpuEngineError> {
    if descriptor.extents.len() != modes.len() {
        return Err(CpuEngineError::new(format!(
            "{} modes for a descriptor of rank {}",
            modes.len(),
            descriptor.extents.len()
        )));
    }
    Ok(())
}

struct Term<'a, E> {
    data: &'a [E],
    desc: &'a CpuDescriptor,
    modes: &'a [Mode],
}

impl<'a, E: Element> Term<'a, E> {
    fn new(
        data: &'a [E],
        desc: &'a CpuDescriptor,
        modes: &'a [Mode],
    ) -> Result<Self, CpuEngineError> {
        check_data_type::<E>(desc)?;
        check_rank(desc, modes)?;
        Ok(Self { data, desc, modes })
    }
}

struct OutputTerm<'a> {
    desc: &'a CpuDescriptor,
    modes: &'a [Mode],
}

/// Distinct modes of an operation with one extent each.
#[derive(Default)]
struct LoopSpace {
    modes: Vec<Mode>,
    extents: Vec<i64>,
}

impl LoopSpace {
    fn register(&mut self, modes: &[Mode], extents: &[i64]) -> Result<Vec<usize>, CpuEngineError> {
        modes
            .iter()
            .zip(extents)
            .map(|(&mode, &extent)| match self.modes.iter().position(|&m| m == mode) {
                Some(pos) if self.extents[pos] == extent => Ok(pos),
                Some(pos) => Err(CpuEngineError::new(format!(
                    "mode '{}' has extents {} and {}",
                    mode, self.extents[pos], extent
                ))),
                None => {
                    self.modes.push(mode);
                    self.extents.push(extent);
                    Ok(self.modes.len() - 1)
                }
            })
            .collect()
    }
}

fn fold_into<E: Element>(
    terms: &[Term<'_, E>],
    op: ReduceOp,
    alpha: E::Scalar,
    beta: E::Scalar,
    c: &mut [E],
    output: &OutputTerm<'_>,
) -> Result<(), CpuEngineError> {
    let mut space = LoopSpace::default();
    let c_positions = space.register(output.modes, &output.desc.extents)?;
    let num_out = space.modes.len();

    let mut positions = Vec::with_capacity(terms.len());
    for term in terms {
        positions.push(space.register(term.modes, &term.desc.extents)?);
    }

    for &mode in output.modes {
        if !terms.iter().any(|t| t.modes.contains(&mode)) {
            return Err(CpuEngineError::new(format!(
                "output mode '{}' not present in any input",
                mode
            )));
        }
    }

    let out_extents = &space.extents[..num_out];
    let acc_len = out_extents
        .iter()
        .try_fold(1usize, |len, &e| len.checked_mul(usize::try_from(e).ok()?))
        .ok_or_else(|| {
            CpuEngineError::new(format!("output extents {:?} overflow usize", out_extents))
        })?;
    let identity = match op {
        ReduceOp::Add => E::Scalar::zero(),
        ReduceOp::Mul => E::Scalar::one(),
    };
    let mut acc = vec![identity; acc_len];

    for_each_index(&space.extents, |index| {
        let mut value = E::Scalar::one();
        for (term, term_positions) in terms.iter().zip(&positions) {
            let offset = element_offset(index, term_positions, &term.desc.strides, term.data.len())?;
            value = value * term.data[offset].to_scalar();
        }
        let slot = linear_index(&index[..num_out], out_extents);
        acc[slot] = match op {
            ReduceOp::Add => acc[slot] + value,
            ReduceOp::Mul => acc[slot] * value,
        };
        Ok(())
    })?;

    let c_len = c.len();
    let overwrite = beta == E::Scalar::zero();
    for_each_index(out_extents, |index| {
        let offset = element_offset(index, &c_positions, &output.desc.strides, c_len)?;
        let mut value = alpha * acc[linear_index(index, out_extents)];
        if !overwrite {
            value = value + beta * c[offset].to_scalar();
        }
        c[offset] = E::from_scalar(value);
        Ok(())
    })
}

/// Visits every multi-index of `extents`, first mode fastest.
fn for_each_index(
    extents: &[i64],
    mut visit: impl FnMut(&[i64]) -> Result<(), CpuEngineError>,
) -> Result<(), CpuEngineError> {
    if extents.iter().any(|&e| e == 0) {
        return Ok(());
    }
    let mut index = vec![0i64; extents.len()];
    loop {
        visit(&index)?;
        let mut axis = 0;
        loop {
            if axis == extents.len() {
                return Ok(());
            }
            index[axis] += 1;
            if index[axis] < extents[axis] {
                break;
            }
            index[axis] = 0;
            axis += 1;
        }
    }
}

fn linear_index(index: &[i64], extents: &[i64]) -> usize {
    let mut linear = 0usize;
    let mut scale = 1usize;
    for (&i, &extent) in index.iter().zip(extents) {
        linear += i as usize * scale;
        scale *= extent as usize;
    }
    linear
}

fn element_offset(
    index: &[i64],
    positions: &[usize],
    strides: &[i64],
    len: usize,
) -> Result<usize, CpuEngineError> {
    let offset = positions
        .iter()
        .zip(strides)
        .try_fold(0i64, |offset, (&pos, &stride)| {
            index[pos].checked_mul(stride)?.checked_add(offset)
        });
    match offset.and_then(|offset| usize::try_from(offset).ok()) {
        Some(offset) if offset < len => Ok(offset),
        _ => Err(CpuEngineError::new(format!(
            "element offset {:?} outside buffer of length {}",
            offset, len
        ))),
    }
}
