use std::error::Error;
use std::fmt::{Display, Formatter};

use correlation::CorrelationError;
use forecast_helpers::DatasetError;
use linear_regression::RegressionError;

/// Any failure of the validate, fit, evaluate, correlate chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    Dataset(DatasetError),
    Regression(RegressionError),
    Correlation(CorrelationError),
}

impl Display for ForecastError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ForecastError::Dataset(e) => write!(f, "Invalid dataset: {}", e),
            ForecastError::Regression(e) => write!(f, "Regression failed: {}", e),
            ForecastError::Correlation(e) => write!(f, "Correlation failed: {}", e),
        }
    }
}

impl Error for ForecastError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ForecastError::Dataset(e) => Some(e),
            ForecastError::Regression(e) => Some(e),
            ForecastError::Correlation(e) => Some(e),
        }
    }
}

impl From<DatasetError> for ForecastError {
    fn from(err: DatasetError) -> Self {
        ForecastError::Dataset(err)
    }
}

impl From<RegressionError> for ForecastError {
    fn from(err: RegressionError) -> Self {
        ForecastError::Regression(err)
    }
}

impl From<CorrelationError> for ForecastError {
    fn from(err: CorrelationError) -> Self {
        ForecastError::Correlation(err)
    }
}
