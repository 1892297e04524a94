use std::error::Error;
use std::fmt::{Display, Formatter};

use log::{debug, trace};
use ndarray::{Array1, ArrayView1, ArrayView2};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

// Core components from shared library
use forecast_helpers::Float;
use forecast_helpers::stats::all_finite;

mod metrics;
mod solver;

pub use metrics::{Metrics, evaluate, residuals};
pub use solver::Solver;

/// Errors that can occur while fitting, evaluating or using a linear model.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum RegressionError {
    /// Fewer rows than parameters (features + intercept).
    InsufficientData { rows: usize, required: usize },
    /// The design matrix has linearly dependent columns. `parameter` is the
    /// first dependent one, 0 being the intercept.
    SingularMatrix { parameter: usize },
    /// The target is constant, so R² is undefined.
    DegenerateTarget,
    /// A vector or matrix has the wrong number of entries.
    DimensionMismatch { expected: usize, found: usize },
    /// Nothing to evaluate.
    EmptyInput,
    /// A feature or target value is NaN or infinite.
    NonFiniteInput,
}

impl Display for RegressionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RegressionError::InsufficientData { rows, required } => write!(
                f,
                "Not enough data to fit the model: {} rows, at least {} required",
                rows, required
            ),
            RegressionError::SingularMatrix { parameter } => write!(
                f,
                "Design matrix is singular (parameter {} is collinear with the previous ones)",
                parameter
            ),
            RegressionError::DegenerateTarget => {
                write!(f, "Target has zero variance, R² is undefined")
            }
            RegressionError::DimensionMismatch { expected, found } => {
                write!(f, "Expected {} values, found {}", expected, found)
            }
            RegressionError::EmptyInput => write!(f, "No rows to evaluate"),
            RegressionError::NonFiniteInput => {
                write!(f, "Input contains NaN or infinite values")
            }
        }
    }
}

impl Error for RegressionError {}

/// Ordinary least squares trainer.
///
/// Fits `y ≈ intercept + X · coefficients` by minimizing the sum of squared
/// residuals. The trainer itself holds only options; every call to
/// [`LinearRegression::fit`] returns an independent [`Model`].
///
/// # Type Parameters
///
/// * `F`: The float type for the features (e.g., `f32`, `f64`).
#[derive(Debug, Clone)]
pub struct LinearRegression<F: Float> {
    solver: Solver,
    tolerance: F,
}

impl<F: Float> Default for LinearRegression<F> {
    fn default() -> Self {
        Self {
            solver: Solver::default(),
            tolerance: F::default_tolerance(),
        }
    }
}

impl<F: Float> LinearRegression<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the linear-algebra routine.
    pub fn solver(mut self, solver: Solver) -> Self {
        self.solver = solver;
        self
    }

    /// Relative threshold below which a parameter's column counts as a linear
    /// combination of the previous ones.
    pub fn tolerance(mut self, tolerance: F) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fits the model on `x` (one row per observation) and `y`.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` if `y` and `x` disagree on the row count.
    /// Returns `RegressionError::InsufficientData` if there are fewer rows than parameters.
    /// Returns `RegressionError::NonFiniteInput` if any value is NaN or infinite.
    /// Returns `RegressionError::SingularMatrix` if the columns of `x` (plus the
    /// intercept column) are linearly dependent. Columns are centered first, so
    /// the test looks at each feature's spread rather than its magnitude.
    pub fn fit(&self, x: ArrayView2<F>, y: ArrayView1<F>) -> Result<Model<F>, RegressionError> {
        let (n, p) = x.dim();
        if y.len() != n {
            return Err(RegressionError::DimensionMismatch {
                expected: n,
                found: y.len(),
            });
        }
        let required = p + 1;
        if n < required {
            return Err(RegressionError::InsufficientData { rows: n, required });
        }
        if !all_finite(&x) || !all_finite(&y) {
            return Err(RegressionError::NonFiniteInput);
        }

        debug!("Fitting {} rows x {} features with {:?}", n, p, self.solver);
        let (x_means, centered) = solver::center(x);
        let y_mean = y.sum() / F::from_len(n);
        let y_centered = y.mapv(|v| v - y_mean);
        let coefficients =
            solver::solve(self.solver, centered.view(), y_centered.view(), self.tolerance)?;
        let intercept = y_mean - x_means.dot(&coefficients);
        trace!("Fitted intercept {}, coefficients {}", intercept, coefficients);

        Ok(Model {
            intercept,
            coefficients,
        })
    }
}

/// A fitted linear model: an intercept plus one coefficient per feature, in
/// the order of the feature columns it was trained on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct Model<F: Float> {
    intercept: F,
    coefficients: Array1<F>,
}

impl<F: Float> Model<F> {
    pub fn intercept(&self) -> F {
        self.intercept
    }

    pub fn coefficients(&self) -> ArrayView1<'_, F> {
        self.coefficients.view()
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Pairs each coefficient with the name of its feature.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` unless there is exactly one name per coefficient.
    pub fn influence<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<(String, F)>, RegressionError> {
        self.check_width(names.len())?;
        Ok(names
            .iter()
            .map(|name| name.as_ref().to_string())
            .zip(self.coefficients.iter().copied())
            .collect())
    }

    /// Predicts the target for a single feature vector.
    ///
    /// No range checks are made: values outside the training range are
    /// extrapolated.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` if `features` does not have one
    /// value per coefficient.
    pub fn predict(&self, features: ArrayView1<F>) -> Result<F, RegressionError> {
        self.check_width(features.len())?;
        Ok(self.intercept + self.coefficients.dot(&features))
    }

    /// Predicts the target for every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns `RegressionError::DimensionMismatch` if `x` does not have one column
    /// per coefficient.
    pub fn predict_batch(&self, x: ArrayView2<F>) -> Result<Array1<F>, RegressionError> {
        self.check_width(x.ncols())?;
        Ok(x.dot(&self.coefficients) + self.intercept)
    }

    fn check_width(&self, found: usize) -> Result<(), RegressionError> {
        if found != self.coefficients.len() {
            return Err(RegressionError::DimensionMismatch {
                expected: self.coefficients.len(),
                found,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, array, s};
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;

    /// Direct solution of the normal equations by Gauss-Jordan inversion of `XᵗX`.
    fn normal_equation_reference(x: &Array2<f64>, y: &Array1<f64>) -> Array1<f64> {
        let mut design = Array2::<f64>::ones((x.nrows(), x.ncols() + 1));
        design.slice_mut(s![.., 1..]).assign(x);
        let p = design.ncols();
        let gram = design.t().dot(&design);
        let mut aug = Array2::<f64>::zeros((p, 2 * p));
        aug.slice_mut(s![.., ..p]).assign(&gram);
        for i in 0..p {
            aug[[i, p + i]] = 1.0;
        }
        for col in 0..p {
            let pivot_row = (col..p)
                .max_by(|&a, &b| aug[[a, col]].abs().total_cmp(&aug[[b, col]].abs()))
                .unwrap();
            for k in 0..2 * p {
                aug.swap([col, k], [pivot_row, k]);
            }
            let pivot = aug[[col, col]];
            aug.row_mut(col).mapv_inplace(|v| v / pivot);
            for r in 0..p {
                if r != col {
                    let factor = aug[[r, col]];
                    let pivot_row = aug.row(col).to_owned();
                    aug.row_mut(r).scaled_add(-factor, &pivot_row);
                }
            }
        }
        let inverse = aug.slice(s![.., p..]).to_owned();
        inverse.dot(&design.t().dot(y))
    }

    fn get_test_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![[1.0, 2.0, 3.0], [2.0, 1.0, 5.0], [3.0, 4.0, 2.0], [5.0, 3.0, 1.0]];
        let y = array![10.0, 12.0, 9.0, 15.0];
        (x, y)
    }

    #[test]
    fn test_four_rows_match_normal_equations() {
        let (x, y) = get_test_data();
        let reference = normal_equation_reference(&x, &y);
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let model = LinearRegression::new().solver(solver).fit(x.view(), y.view()).unwrap();
            assert_abs_diff_eq!(model.intercept(), reference[0], epsilon = 1e-9);
            assert_abs_diff_eq!(
                model.coefficients(),
                reference.slice(s![1..]),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_recovers_exact_linear_relation() {
        let x = array![
            [10.0, 50.0, 80.0],
            [11.0, 55.0, 82.0],
            [9.0, 40.0, 78.0],
            [12.0, 60.0, 85.0],
            [10.5, 52.0, 81.0],
            [8.0, 45.0, 90.0]
        ];
        let y = x.dot(&array![-4.0, 1.5, 0.25]) + 30.0;
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let model = LinearRegression::new().solver(solver).fit(x.view(), y.view()).unwrap();
            assert_abs_diff_eq!(model.intercept(), 30.0, epsilon = 1e-6);
            assert_abs_diff_eq!(model.coefficients(), array![-4.0, 1.5, 0.25], epsilon = 1e-8);
        }
    }

    #[test]
    fn test_solvers_agree_on_random_data() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let n = 200;
        let x = Array2::from_shape_fn((n, 3), |(_, j)| {
            let scale = [10.0, 100.0, 1.0][j];
            scale * rng.random_range(0.5..1.5)
        });
        let noise = Array1::from_shape_fn(n, |_| rng.random_range(-1.0..1.0));
        let y = x.dot(&array![-3.0, 0.2, 12.0]) + 80.0 + noise;

        let normal = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let qr = LinearRegression::new()
            .solver(Solver::Qr)
            .fit(x.view(), y.view())
            .unwrap();
        assert_abs_diff_eq!(normal.intercept(), qr.intercept(), epsilon = 1e-6);
        assert_abs_diff_eq!(normal.coefficients(), qr.coefficients(), epsilon = 1e-6);
        assert_abs_diff_eq!(qr.coefficients(), array![-3.0, 0.2, 12.0], epsilon = 0.5);
    }

    #[test]
    fn test_insufficient_data() {
        let x = array![[1.0, 2.0, 3.0], [2.0, 1.0, 5.0], [3.0, 4.0, 2.0]];
        let y = array![1.0, 2.0, 3.0];
        let result = LinearRegression::new().fit(x.view(), y.view());
        assert_eq!(
            result.unwrap_err(),
            RegressionError::InsufficientData {
                rows: 3,
                required: 4
            }
        );
    }

    #[test]
    fn test_constant_features_are_singular() {
        let x = array![
            [10.0, 50.0, 80.0],
            [10.0, 50.0, 80.0],
            [10.0, 50.0, 80.0],
            [10.0, 50.0, 80.0],
            [10.0, 50.0, 80.0]
        ];
        let y = array![100.0, 120.0, 90.0, 130.0, 110.0];
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let result = LinearRegression::new().solver(solver).fit(x.view(), y.view());
            assert!(matches!(
                result,
                Err(RegressionError::SingularMatrix { parameter: 1 })
            ));
        }
    }

    fn get_sales_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [10.0, 50.0, 80.0],
            [11.0, 55.0, 82.0],
            [9.0, 40.0, 78.0],
            [12.0, 60.0, 85.0],
            [10.5, 52.0, 81.0]
        ];
        let y = array![100.0, 120.0, 90.0, 130.0, 110.0];
        (x, y)
    }

    #[test]
    fn test_f32_matches_f64() {
        let (x, y) = get_sales_data();
        let reference = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let x32 = x.mapv(|v| v as f32);
        let y32 = y.mapv(|v| v as f32);
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let model = LinearRegression::<f32>::new()
                .solver(solver)
                .fit(x32.view(), y32.view())
                .unwrap();
            assert_abs_diff_eq!(model.intercept(), reference.intercept() as f32, epsilon = 0.1);
            assert_abs_diff_eq!(
                model.coefficients(),
                reference.coefficients().mapv(|c| c as f32),
                epsilon = 0.01
            );
            let forecast = model.predict(array![10.0f32, 50.0, 80.0].view()).unwrap();
            assert_abs_diff_eq!(forecast, 99.79, epsilon = 0.1);
        }
    }

    #[test]
    fn test_offset_column_keeps_slopes() {
        let (x, y) = get_sales_data();
        let base = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let mut shifted = x.clone();
        shifted.column_mut(1).mapv_inplace(|v| v + 1_000_000.0);
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let model = LinearRegression::new()
                .solver(solver)
                .fit(shifted.view(), y.view())
                .unwrap();
            assert_abs_diff_eq!(model.coefficients(), base.coefficients(), epsilon = 1e-6);
            assert_abs_diff_eq!(
                model.intercept(),
                base.intercept() - 1_000_000.0 * base.coefficients()[1],
                epsilon = 1e-3
            );
            assert_abs_diff_eq!(
                model.predict_batch(shifted.view()).unwrap(),
                base.predict_batch(x.view()).unwrap(),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_small_spread_is_not_singular() {
        // Satisfaction moves by hundredths of a point around 80.
        let (x, y) = get_sales_data();
        let base = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let mut narrow = x.clone();
        narrow.column_mut(2).mapv_inplace(|v| 80.0 + (v - 80.0) * 0.01);
        let model = LinearRegression::new().fit(narrow.view(), y.view()).unwrap();
        assert_abs_diff_eq!(
            model.coefficients()[2],
            base.coefficients()[2] * 100.0,
            epsilon = 1e-4
        );
        assert_abs_diff_eq!(
            model.predict_batch(narrow.view()).unwrap(),
            base.predict_batch(x.view()).unwrap(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_errors() {
        let (x, y) = get_test_data();
        let short_y = array![1.0, 2.0];
        assert_eq!(
            LinearRegression::new().fit(x.view(), short_y.view()).unwrap_err(),
            RegressionError::DimensionMismatch {
                expected: 4,
                found: 2
            }
        );
        let mut bad = x.clone();
        bad[[2, 1]] = f64::NAN;
        assert_eq!(
            LinearRegression::new().fit(bad.view(), y.view()).unwrap_err(),
            RegressionError::NonFiniteInput
        );
    }

    #[test]
    fn test_predict() {
        let (x, y) = get_test_data();
        let model = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let point = array![2.0, 2.0, 2.0];
        let expected = model.intercept() + model.coefficients().sum() * 2.0;
        assert_abs_diff_eq!(model.predict(point.view()).unwrap(), expected, epsilon = 1e-12);

        let batch = model.predict_batch(x.view()).unwrap();
        for (row, fitted) in x.rows().into_iter().zip(batch.iter()) {
            assert_abs_diff_eq!(model.predict(row).unwrap(), *fitted, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_predict_is_linear_without_intercept() {
        let (x, y) = get_test_data();
        let model = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let v = array![3.0, -1.0, 7.5];
        let base = model.predict(v.view()).unwrap() - model.intercept();
        for k in [-2.0, 0.5, 3.0] {
            let scaled = model.predict((&v * k).view()).unwrap() - model.intercept();
            assert_abs_diff_eq!(scaled, k * base, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_predict_wrong_width() {
        let (x, y) = get_test_data();
        let model = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        assert_eq!(
            model.predict(array![1.0, 2.0].view()).unwrap_err(),
            RegressionError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
        assert!(matches!(
            model.predict_batch(Array2::zeros((2, 4)).view()),
            Err(RegressionError::DimensionMismatch {
                expected: 3,
                found: 4
            })
        ));
    }

    #[test]
    fn test_influence() {
        let (x, y) = get_test_data();
        let model = LinearRegression::new().fit(x.view(), y.view()).unwrap();
        let table = model.influence(&["Prix", "Pub", "Satisfaction"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table[1].0, "Pub");
        assert_eq!(table[1].1, model.coefficients()[1]);
        assert!(model.influence(&["Prix"]).is_err());
    }
}
