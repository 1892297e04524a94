//! Multiple linear regression for monthly sales figures.
//!
//! The engine takes an already-parsed table, checks it against a [`Schema`],
//! fits `sales ≈ intercept + price · b1 + advertising · b2 + satisfaction · b3`
//! by ordinary least squares, reports R², MAE and RMSE, computes the Pearson
//! correlation matrix of the numeric columns and answers what-if predictions.
//! A failed evaluation or correlation does not discard the fitted model.
//!
//! ```
//! use sales_forecast::{AnalysisOptions, PredictionRequest, RawDataset, Record, Schema, analyze};
//!
//! let rows = [
//!     (1, 100.0, 10.0, 50.0, 80.0),
//!     (2, 120.0, 11.0, 55.0, 82.0),
//!     (3, 90.0, 9.0, 40.0, 78.0),
//!     (4, 130.0, 12.0, 60.0, 85.0),
//!     (5, 110.0, 10.5, 52.0, 81.0),
//! ];
//! let raw: RawDataset = rows
//!     .iter()
//!     .map(|&(mois, ventes, prix, pub_dh, satisfaction)| {
//!         Record::new()
//!             .with("Mois", mois)
//!             .with("Ventes", ventes)
//!             .with("Prix", prix)
//!             .with("Publicité (DH)", pub_dh)
//!             .with("Satisfaction (%)", satisfaction)
//!     })
//!     .collect();
//!
//! let analysis = analyze::<f64>(&raw, &Schema::default(), &AnalysisOptions::default()).unwrap();
//! let metrics = analysis.metrics.clone().unwrap();
//! assert!(metrics.r2 > 0.9);
//! let forecast = analysis.predict(&PredictionRequest::new(10.0, 50.0, 80.0)).unwrap();
//! assert!((forecast - 100.0).abs() < 1.0);
//! ```

mod error;
mod pipeline;
mod request;

pub use error::ForecastError;
pub use pipeline::{Analysis, AnalysisOptions, analyze};
pub use request::PredictionRequest;

// Re-export the building blocks so callers need a single dependency.
pub use correlation::{CorrelationError, CorrelationMatrix};
pub use forecast_helpers::stats;
pub use forecast_helpers::{
    Cell, Dataset, DatasetError, FEATURE_COUNT, Float, RawDataset, Record, Schema,
};
pub use linear_regression::{
    LinearRegression, Metrics, Model, RegressionError, Solver, evaluate, residuals,
};
