use ndarray::{Array1, ArrayView1, ArrayView2};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use forecast_helpers::Float;
use forecast_helpers::stats::{centered_sum_of_squares, is_constant};

use crate::{Model, RegressionError};

/// Goodness-of-fit figures for a set of predictions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Metrics<F> {
    /// Coefficient of determination, `1 - SS_res / SS_tot`.
    pub r2: F,
    /// Mean absolute error.
    pub mae: F,
    /// Root mean squared error.
    pub rmse: F,
}

impl<F: Float> Metrics<F> {
    /// Compares observed values with predictions.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` if the two vectors differ in length.
    /// Returns `RegressionError::EmptyInput` if they are empty.
    /// Returns `RegressionError::DegenerateTarget` if `y` is constant.
    pub fn from_predictions(
        y: ArrayView1<F>,
        y_hat: ArrayView1<F>,
    ) -> Result<Self, RegressionError> {
        if y.len() != y_hat.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: y.len(),
                found: y_hat.len(),
            });
        }
        if y.is_empty() {
            return Err(RegressionError::EmptyInput);
        }
        let ss_tot = centered_sum_of_squares(y);
        if is_constant(y) || !(ss_tot > F::zero()) {
            return Err(RegressionError::DegenerateTarget);
        }

        let n = F::from_len(y.len());
        let residuals = &y - &y_hat;
        let ss_res = residuals.dot(&residuals);
        let mae = residuals.iter().map(|r| r.abs()).sum::<F>() / n;

        Ok(Metrics {
            r2: F::one() - ss_res / ss_tot,
            mae,
            rmse: (ss_res / n).sqrt(),
        })
    }
}

/// Evaluates `model` on `(x, y)`.
///
/// # Errors
///
/// Returns `RegressionError::DimensionMismatch` if `x` and `y` disagree on the row
/// count or `x` has the wrong number of columns, plus the errors of
/// [`Metrics::from_predictions`].
pub fn evaluate<F: Float>(
    model: &Model<F>,
    x: ArrayView2<F>,
    y: ArrayView1<F>,
) -> Result<Metrics<F>, RegressionError> {
    let y_hat = predictions_for(model, x, y)?;
    Metrics::from_predictions(y, y_hat.view())
}

/// Observed minus predicted values, row by row.
///
/// # Errors
///
/// Returns `RegressionError::DimensionMismatch` on inconsistent shapes.
pub fn residuals<F: Float>(
    model: &Model<F>,
    x: ArrayView2<F>,
    y: ArrayView1<F>,
) -> Result<Array1<F>, RegressionError> {
    let y_hat = predictions_for(model, x, y)?;
    Ok(&y - &y_hat)
}

fn predictions_for<F: Float>(
    model: &Model<F>,
    x: ArrayView2<F>,
    y: ArrayView1<F>,
) -> Result<Array1<F>, RegressionError> {
    if x.nrows() != y.len() {
        return Err(RegressionError::DimensionMismatch {
            expected: x.nrows(),
            found: y.len(),
        });
    }
    model.predict_batch(x)
}
