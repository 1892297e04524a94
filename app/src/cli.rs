use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use sales_forecast::{AnalysisOptions, PredictionRequest, Schema, Solver, analyze};

use crate::input::{read_rows, read_schema};
use crate::report::{Report, render_text};

#[derive(Parser, Debug)]
#[command(
    name = "forecast",
    version,
    about = "Multiple regression on monthly sales figures"
)]
pub struct Cli {
    /// JSON file with one object per row, keyed by column name.
    pub input: PathBuf,
    /// JSON file overriding the expected column names.
    #[arg(long)]
    pub schema: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = SolverArg::Normal)]
    pub solver: SolverArg,
    /// Relative singularity threshold of the solver.
    #[arg(long)]
    pub tolerance: Option<f64>,
    /// Leave the period column out of the correlation matrix.
    #[arg(long)]
    pub exclude_period: bool,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
    /// Price of the what-if forecast (defaults to the mean price).
    #[arg(long)]
    pub price: Option<f64>,
    /// Advertising spend of the what-if forecast (defaults to the mean).
    #[arg(long)]
    pub advertising: Option<f64>,
    /// Customer satisfaction of the what-if forecast (defaults to the mean).
    #[arg(long)]
    pub satisfaction: Option<f64>,
    /// How the forecast is turned into a unit count.
    #[arg(long, value_enum, default_value_t = Rounding::Truncate)]
    pub rounding: Rounding,
    /// More logging, repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverArg {
    Normal,
    Qr,
}

impl From<SolverArg> for Solver {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Normal => Solver::NormalEquations,
            SolverArg::Qr => Solver::Qr,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    /// Drop the fractional part, toward zero.
    Truncate,
    /// Nearest whole unit.
    Round,
    /// Keep two decimals.
    None,
}

impl Rounding {
    pub fn units(self, forecast: f64) -> String {
        // Adding zero turns a -0 left by rounding into +0.
        match self {
            Rounding::Truncate => format!("{}", forecast.trunc() + 0.0),
            Rounding::Round => format!("{}", forecast.round() + 0.0),
            Rounding::None => format!("{:.2}", (forecast * 100.0).round() / 100.0 + 0.0),
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let raw = read_rows(&cli.input)?;
    let schema = match &cli.schema {
        Some(path) => read_schema(path)?,
        None => Schema::default(),
    };
    info!("Loaded {} rows from {}", raw.len(), cli.input.display());

    let options = AnalysisOptions {
        solver: cli.solver.into(),
        tolerance: cli.tolerance,
        correlate_period: !cli.exclude_period,
    };
    let analysis = analyze::<f64>(&raw, &schema, &options)
        .with_context(|| format!("cannot build a model from {}", cli.input.display()))?;

    let defaults = analysis.default_request();
    let request = PredictionRequest::new(
        cli.price.unwrap_or(defaults.price),
        cli.advertising.unwrap_or(defaults.advertising),
        cli.satisfaction.unwrap_or(defaults.satisfaction),
    );
    let forecast = analysis.predict(&request)?;

    let report = Report::new(&analysis, request, forecast, cli.rounding)?;
    match cli.format {
        Format::Text => print!("{}", render_text(&report)?),
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_modes() {
        assert_eq!(Rounding::Truncate.units(99.79), "99");
        assert_eq!(Rounding::Round.units(99.79), "100");
        assert_eq!(Rounding::None.units(99.794), "99.79");
        assert_eq!(Rounding::Truncate.units(-3.7), "-3");
    }

    #[test]
    fn test_rounding_never_prints_negative_zero() {
        assert_eq!(Rounding::Truncate.units(-0.3), "0");
        assert_eq!(Rounding::Round.units(-0.4), "0");
        assert_eq!(Rounding::None.units(-0.001), "0.00");
        assert_eq!(Rounding::Truncate.units(0.0), "0");
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "forecast",
            "ventes.json",
            "--solver",
            "qr",
            "--price",
            "10",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.solver, SolverArg::Qr);
        assert_eq!(cli.price, Some(10.0));
        assert_eq!(cli.advertising, None);
        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.rounding, Rounding::Truncate);
        assert_eq!(cli.verbose, 2);
        assert!(!cli.exclude_period);
    }
}
