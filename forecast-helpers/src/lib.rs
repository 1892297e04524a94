use ndarray::{NdFloat, ScalarOperand};

use num_traits::FromPrimitive;

use std::iter::Sum;

// Include submodules
mod common;
mod dataset;
pub mod stats;

// Re-export types from submodules
pub use common::{Cell, RawDataset, Record};
pub use dataset::{Dataset, DatasetError, Schema, FEATURE_COUNT};

/// Float types the regression engine can run on.
///
/// Everything numeric in the workspace is generic over this trait so the
/// same code serves `f32` and `f64` datasets.
pub trait Float: NdFloat + FromPrimitive + Default + Sum + ScalarOperand + std::marker::Unpin {
    /// Converts a row or column count.
    fn from_len(n: usize) -> Self;

    /// Converts a value handed over by the ingestion layer, which always
    /// reads numbers as `f64`.
    fn from_value(x: f64) -> Self;

    /// Relative threshold used to decide that a design matrix is singular.
    fn default_tolerance() -> Self {
        Self::epsilon().sqrt()
    }
}

impl Float for f32 {
    fn from_len(n: usize) -> Self {
        n as f32
    }

    fn from_value(x: f64) -> Self {
        x as f32
    }
}

impl Float for f64 {
    fn from_len(n: usize) -> Self {
        n as f64
    }

    fn from_value(x: f64) -> Self {
        x
    }
}
