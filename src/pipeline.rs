use log::{debug, info, warn};

#[cfg(feature = "serde")]
use serde_crate::Serialize;

use correlation::{CorrelationError, CorrelationMatrix};
use forecast_helpers::{Dataset, Float, RawDataset, Schema};
use linear_regression::{LinearRegression, Metrics, Model, RegressionError, Solver, evaluate};

use crate::error::ForecastError;
use crate::request::PredictionRequest;

/// Trainer settings for [`analyze`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisOptions<F> {
    pub solver: Solver,
    /// Singularity threshold; `None` keeps the trainer default.
    pub tolerance: Option<F>,
    /// Correlate the period column too when all of its labels are numbers.
    pub correlate_period: bool,
}

impl<F> Default for AnalysisOptions<F> {
    fn default() -> Self {
        AnalysisOptions {
            solver: Solver::default(),
            tolerance: None,
            correlate_period: true,
        }
    }
}

impl<F: Float> AnalysisOptions<F> {
    fn trainer(&self) -> LinearRegression<F> {
        let trainer = LinearRegression::new().solver(self.solver);
        match self.tolerance {
            Some(tolerance) => trainer.tolerance(tolerance),
            None => trainer,
        }
    }
}

/// Everything computed for one dataset.
///
/// The model is always present. Evaluation and correlation do not depend on
/// each other and are kept with their own outcome, so a constant target
/// still leaves a usable model behind.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(crate = "serde_crate"))]
pub struct Analysis<F: Float> {
    pub dataset: Dataset<F>,
    pub model: Model<F>,
    /// Fit quality on the training rows.
    pub metrics: Result<Metrics<F>, RegressionError>,
    pub correlation: Result<CorrelationMatrix<F>, CorrelationError>,
}

impl<F: Float> Analysis<F> {
    /// Fits an already validated dataset, then evaluates and correlates it.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::Regression` if the model cannot be fitted.
    pub fn from_dataset(
        dataset: Dataset<F>,
        options: &AnalysisOptions<F>,
    ) -> Result<Self, ForecastError> {
        let model = options.trainer().fit(dataset.features(), dataset.target())?;
        debug!(
            "Model intercept {}, coefficients {}",
            model.intercept(),
            model.coefficients()
        );

        let metrics = evaluate(&model, dataset.features(), dataset.target());
        match &metrics {
            Ok(m) => info!(
                "Fitted {} rows: R² = {:.3}, MAE = {:.2}, RMSE = {:.2}",
                dataset.len(),
                m.r2,
                m.mae,
                m.rmse
            ),
            Err(e) => warn!("Fitted {} rows, evaluation unavailable: {}", dataset.len(), e),
        }

        let correlation = if options.correlate_period {
            CorrelationMatrix::from_dataset(&dataset)
        } else {
            CorrelationMatrix::without_period(&dataset)
        };
        if let Err(e) = &correlation {
            warn!("Correlation matrix unavailable: {}", e);
        }

        Ok(Analysis {
            dataset,
            model,
            metrics,
            correlation,
        })
    }

    /// Coefficients labelled with the dataset's feature names.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::Regression` if the model was not fitted on
    /// this dataset's features.
    pub fn influence(&self) -> Result<Vec<(String, F)>, ForecastError> {
        Ok(self.model.influence(&self.dataset.feature_names())?)
    }

    /// What-if forecast for one combination of inputs.
    ///
    /// # Errors
    ///
    /// Propagates the model's `RegressionError`.
    pub fn predict(&self, request: &PredictionRequest<F>) -> Result<F, ForecastError> {
        Ok(self.model.predict(request.to_array().view())?)
    }

    /// Request filled with the feature means of the training data.
    pub fn default_request(&self) -> PredictionRequest<F> {
        PredictionRequest::from_means(&self.dataset)
    }
}

/// Validates `raw` against `schema`, fits the model, then evaluates and
/// correlates the data.
///
/// # Errors
///
/// Returns a [`ForecastError`] when validation or fitting fails. Evaluation
/// and correlation failures are kept inside the returned [`Analysis`].
pub fn analyze<F: Float>(
    raw: &RawDataset,
    schema: &Schema,
    options: &AnalysisOptions<F>,
) -> Result<Analysis<F>, ForecastError> {
    let dataset = Dataset::validate(raw, schema)?;
    Analysis::from_dataset(dataset, options)
}
