use ndarray::{Array1, array};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use forecast_helpers::{Dataset, FEATURE_COUNT, Float};
use linear_regression::RegressionError;

/// Inputs of a what-if forecast, in the canonical feature order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct PredictionRequest<F> {
    pub price: F,
    pub advertising: F,
    pub satisfaction: F,
}

impl<F: Float> PredictionRequest<F> {
    pub fn new(price: F, advertising: F, satisfaction: F) -> Self {
        PredictionRequest {
            price,
            advertising,
            satisfaction,
        }
    }

    /// Builds a request from `[price, advertising, satisfaction]`.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` unless exactly three values are given.
    pub fn from_slice(values: &[F]) -> Result<Self, RegressionError> {
        match *values {
            [price, advertising, satisfaction] => Ok(Self::new(price, advertising, satisfaction)),
            _ => Err(RegressionError::DimensionMismatch {
                expected: FEATURE_COUNT,
                found: values.len(),
            }),
        }
    }

    /// The average observation of `dataset`, used as the starting point of a
    /// what-if form.
    pub fn from_means(dataset: &Dataset<F>) -> Self {
        let means = dataset.feature_means();
        Self::new(means[0], means[1], means[2])
    }

    pub fn to_array(&self) -> Array1<F> {
        array![self.price, self.advertising, self.satisfaction]
    }
}
