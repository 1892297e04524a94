use std::fmt::{self, Write};

use sales_forecast::{
    Analysis, CorrelationMatrix, ForecastError, Metrics, Model, PredictionRequest,
};
use serde::Serialize;

use crate::cli::Rounding;

/// Everything shown to the user for one run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub rows: usize,
    pub series: Vec<(&'a str, f64)>,
    pub model: &'a Model<f64>,
    pub influence: Vec<(String, f64)>,
    pub metrics: Option<Metrics<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_error: Option<String>,
    pub correlation: Option<&'a CorrelationMatrix<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_error: Option<String>,
    pub request: PredictionRequest<f64>,
    pub forecast: f64,
    pub forecast_units: String,
}

impl<'a> Report<'a> {
    pub fn new(
        analysis: &'a Analysis<f64>,
        request: PredictionRequest<f64>,
        forecast: f64,
        rounding: Rounding,
    ) -> Result<Self, ForecastError> {
        Ok(Report {
            rows: analysis.dataset.len(),
            series: analysis.dataset.target_series(),
            model: &analysis.model,
            influence: analysis.influence()?,
            metrics: analysis.metrics.as_ref().ok().copied(),
            metrics_error: analysis.metrics.as_ref().err().map(|e| e.to_string()),
            correlation: analysis.correlation.as_ref().ok(),
            correlation_error: analysis.correlation.as_ref().err().map(|e| e.to_string()),
            request,
            forecast,
            forecast_units: rounding.units(forecast),
        })
    }
}

pub fn render_text(report: &Report<'_>) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let names = report.influence.iter().map(|(name, _)| name);
    let width = match report.correlation {
        Some(correlation) => names.chain(correlation.names()).map(|n| n.chars().count()).max(),
        None => names.map(|n| n.chars().count()).max(),
    }
    .unwrap_or(0)
    .max(9);

    writeln!(out, "Sales over time ({} rows)", report.rows)?;
    for (period, sales) in &report.series {
        writeln!(out, "  {:<w$}  {:>10.2}", period, sales, w = width)?;
    }

    writeln!(out, "\nModel")?;
    writeln!(out, "  {:<w$}  {:>10.4}", "Intercept", report.model.intercept(), w = width)?;
    for (name, coefficient) in &report.influence {
        writeln!(out, "  {:<w$}  {:>10.4}", name, coefficient, w = width)?;
    }

    writeln!(out, "\nEvaluation")?;
    match (&report.metrics, &report.metrics_error) {
        (Some(metrics), _) => {
            writeln!(out, "  R²    {:.3}", metrics.r2)?;
            writeln!(out, "  MAE   {:.2}", metrics.mae)?;
            writeln!(out, "  RMSE  {:.2}", metrics.rmse)?;
        }
        (None, reason) => {
            writeln!(out, "  unavailable: {}", reason.as_deref().unwrap_or("unknown"))?;
        }
    }

    writeln!(out, "\nCorrelations")?;
    match report.correlation {
        Some(correlation) => {
            write!(out, "  {:<w$}", "", w = width)?;
            for name in correlation.names() {
                write!(out, "  {:>w$}", name, w = width)?;
            }
            writeln!(out)?;
            for (name, row) in correlation.names().iter().zip(correlation.values().rows()) {
                write!(out, "  {:<w$}", name, w = width)?;
                for r in row {
                    write!(out, "  {:>w$.2}", r, w = width)?;
                }
                writeln!(out)?;
            }
        }
        None => writeln!(
            out,
            "  unavailable: {}",
            report.correlation_error.as_deref().unwrap_or("unknown")
        )?,
    }

    writeln!(out, "\nForecast")?;
    for ((name, _), value) in report.influence.iter().zip([
        report.request.price,
        report.request.advertising,
        report.request.satisfaction,
    ]) {
        writeln!(out, "  {:<w$}  {:>10.2}", name, value, w = width)?;
    }
    writeln!(
        out,
        "  Sales forecast: {} units ({:.2})",
        report.forecast_units, report.forecast
    )?;
    Ok(out)
}
