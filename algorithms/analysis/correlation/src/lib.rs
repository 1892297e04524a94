use std::error::Error;
use std::fmt::{Display, Formatter};

use log::debug;
use ndarray::{Array2, ArrayView2};
use ndarray_stats::CorrelationExt;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

// Core components from shared library
use forecast_helpers::stats::is_constant;
use forecast_helpers::{Dataset, Float};

/// Errors that can occur when computing a correlation matrix.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub enum CorrelationError {
    /// At least two observations are needed to estimate a variance.
    InsufficientRows { rows: usize },
    /// The number of names does not match the number of columns.
    NameMismatch { columns: usize, names: usize },
    /// The named column has zero variance; its correlations are undefined.
    ZeroVariance(String),
}

impl Display for CorrelationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationError::InsufficientRows { rows } => write!(
                f,
                "At least 2 rows are needed for correlations, found {}",
                rows
            ),
            CorrelationError::NameMismatch { columns, names } => {
                write!(f, "{} columns but {} names", columns, names)
            }
            CorrelationError::ZeroVariance(column) => {
                write!(f, "Column '{}' has zero variance", column)
            }
        }
    }
}

impl Error for CorrelationError {}

/// Pairwise Pearson correlations between named columns.
///
/// Symmetric with an exact unit diagonal.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
pub struct CorrelationMatrix<F: Float> {
    names: Vec<String>,
    values: Array2<F>,
}

impl<F: Float> CorrelationMatrix<F> {
    /// Computes the Pearson correlation of every pair of columns of `columns`
    /// (one variable per column, one observation per row).
    ///
    /// # Errors
    ///
    /// Returns `CorrelationError::NameMismatch` if `names` does not name every column.
    /// Returns `CorrelationError::InsufficientRows` with fewer than two rows.
    /// Returns `CorrelationError::ZeroVariance` for the first constant column.
    pub fn pearson<S: AsRef<str>>(
        columns: ArrayView2<F>,
        names: &[S],
    ) -> Result<Self, CorrelationError> {
        let (rows, k) = columns.dim();
        if names.len() != k {
            return Err(CorrelationError::NameMismatch {
                columns: k,
                names: names.len(),
            });
        }
        if rows < 2 {
            return Err(CorrelationError::InsufficientRows { rows });
        }
        let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();

        for (column, name) in columns.columns().into_iter().zip(&names) {
            if is_constant(column) {
                return Err(CorrelationError::ZeroVariance(name.clone()));
            }
        }

        // `cov` treats rows as variables, hence the transpose.
        let cov = columns
            .t()
            .cov(F::zero())
            .map_err(|_| CorrelationError::InsufficientRows { rows })?;
        let mut std_dev = Vec::with_capacity(k);
        for (j, name) in names.iter().enumerate() {
            let variance = cov[[j, j]];
            if !(variance > F::zero()) || !variance.is_finite() {
                return Err(CorrelationError::ZeroVariance(name.clone()));
            }
            std_dev.push(variance.sqrt());
        }

        let one = F::one();
        let mut values = Array2::<F>::eye(k);
        for i in 0..k {
            for j in (i + 1)..k {
                let r = (cov[[i, j]] / (std_dev[i] * std_dev[j])).max(-one).min(one);
                values[[i, j]] = r;
                values[[j, i]] = r;
            }
        }
        debug!("Computed {}x{} correlation matrix over {} rows", k, k, rows);

        Ok(CorrelationMatrix { names, values })
    }

    /// Correlations across every numeric column of `dataset`: the period
    /// when all of its labels are numbers, then the target and the features.
    ///
    /// # Errors
    ///
    /// See [`CorrelationMatrix::pearson`].
    pub fn from_dataset(dataset: &Dataset<F>) -> Result<Self, CorrelationError> {
        let (names, columns) = dataset.all_numeric_columns();
        Self::pearson(columns.view(), names.as_slice())
    }

    /// Correlations between the target and the features only.
    ///
    /// # Errors
    ///
    /// See [`CorrelationMatrix::pearson`].
    pub fn without_period(dataset: &Dataset<F>) -> Result<Self, CorrelationError> {
        let (names, columns) = dataset.numeric_columns();
        Self::pearson(columns, names.as_slice())
    }

    /// Correlation between two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<F> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Some(self.values[[i, j]])
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> ArrayView2<'_, F> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Every unordered pair, self-pairs included, row by row.
    pub fn pairs(&self) -> Vec<(&str, &str, F)> {
        let mut pairs = Vec::with_capacity(self.len() * (self.len() + 1) / 2);
        for i in 0..self.len() {
            for j in i..self.len() {
                pairs.push((
                    self.names[i].as_str(),
                    self.names[j].as_str(),
                    self.values[[i, j]],
                ));
            }
        }
        pairs
    }

    pub fn is_symmetric(&self) -> bool {
        self.values == self.values.t()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}
