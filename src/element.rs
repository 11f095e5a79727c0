//! Element types and their engine-native storage and compute formats.
//!
//! The mapping is a fixed table: every element declares the data type it is
//! stored as and the (possibly wider) type the engine accumulates in.

use core::fmt::Debug;
use core::ops::{Add, Mul};

use half::{bf16, f16};
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

/// Storage format of a tensor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    F64,
    F32,
    F16,
    BF16,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            DataType::F64 => 8,
            DataType::F32 => 4,
            DataType::F16 | DataType::BF16 => 2,
        }
    }
}

/// Accumulation format used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputeType {
    F64,
    F32,
    /// f32 storage multiplied through tensor-float-32 units.
    Tf32,
}

/// An element type a plan can be compiled for.
pub trait Element: Copy + Debug + Send + Sync + 'static {
    /// Type of the scale factors and of the accumulator.
    type Scalar: Copy + Debug + PartialEq + Zero + One + Add<Output = Self::Scalar> + Mul<Output = Self::Scalar>;

    const DATA_TYPE: DataType;
    const COMPUTE_TYPE: ComputeType;

    fn to_scalar(self) -> Self::Scalar;
    fn from_scalar(scalar: Self::Scalar) -> Self;
}

impl Element for f64 {
    type Scalar = f64;

    const DATA_TYPE: DataType = DataType::F64;
    const COMPUTE_TYPE: ComputeType = ComputeType::F64;

    #[inline]
    fn to_scalar(self) -> f64 {
        self
    }

    #[inline]
    fn from_scalar(scalar: f64) -> Self {
        scalar
    }
}

impl Element for f32 {
    type Scalar = f32;

    const DATA_TYPE: DataType = DataType::F32;
    #[cfg(feature = "tf32")]
    const COMPUTE_TYPE: ComputeType = ComputeType::Tf32;
    #[cfg(not(feature = "tf32"))]
    const COMPUTE_TYPE: ComputeType = ComputeType::F32;

    #[inline]
    fn to_scalar(self) -> f32 {
        self
    }

    #[inline]
    fn from_scalar(scalar: f32) -> Self {
        scalar
    }
}

// Half precision storage still accumulates in f32.
impl Element for f16 {
    type Scalar = f32;

    const DATA_TYPE: DataType = DataType::F16;
    const COMPUTE_TYPE: ComputeType = ComputeType::F32;

    #[inline]
    fn to_scalar(self) -> f32 {
        self.to_f32()
    }

    #[inline]
    fn from_scalar(scalar: f32) -> Self {
        f16::from_f32(scalar)
    }
}

impl Element for bf16 {
    type Scalar = f32;

    const DATA_TYPE: DataType = DataType::BF16;
    const COMPUTE_TYPE: ComputeType = ComputeType::F32;

    #[inline]
    fn to_scalar(self) -> f32 {
        self.to_f32()
    }

    #[inline]
    fn from_scalar(scalar: f32) -> Self {
        bf16::from_f32(scalar)
    }
}
