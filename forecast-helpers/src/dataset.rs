use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::common::{Cell, RawDataset};
use crate::Float;

/// Number of explanatory variables: price, advertising spend, satisfaction.
pub const FEATURE_COUNT: usize = 3;

/// Errors raised while turning a [`RawDataset`] into a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetError {
    /// The table has no rows at all.
    EmptyDataset,
    /// Required columns are absent or hold values that are not numbers.
    /// Both lists follow the canonical column order.
    Schema {
        missing: Vec<String>,
        non_numeric: Vec<String>,
    },
}

impl Display for DatasetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetError::EmptyDataset => write!(f, "Dataset contains no rows"),
            DatasetError::Schema {
                missing,
                non_numeric,
            } => {
                write!(f, "Dataset does not match the schema")?;
                if !missing.is_empty() {
                    write!(f, "; missing columns: {}", missing.join(", "))?;
                }
                if !non_numeric.is_empty() {
                    write!(f, "; non-numeric columns: {}", non_numeric.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

impl Error for DatasetError {}

/// Exact column names the validator looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", default)
)]
pub struct Schema {
    pub period: String,
    pub target: String,
    pub price: String,
    pub advertising: String,
    pub satisfaction: String,
}

impl Default for Schema {
    /// Column headers of the monthly sales workbook.
    fn default() -> Self {
        Schema::new(
            "Mois",
            "Ventes",
            "Prix",
            "Publicité (DH)",
            "Satisfaction (%)",
        )
    }
}

impl Schema {
    pub fn new(
        period: impl Into<String>,
        target: impl Into<String>,
        price: impl Into<String>,
        advertising: impl Into<String>,
        satisfaction: impl Into<String>,
    ) -> Self {
        Schema {
            period: period.into(),
            target: target.into(),
            price: price.into(),
            advertising: advertising.into(),
            satisfaction: satisfaction.into(),
        }
    }

    /// Explanatory columns in canonical order.
    pub fn feature_names(&self) -> [&str; FEATURE_COUNT] {
        [
            self.price.as_str(),
            self.advertising.as_str(),
            self.satisfaction.as_str(),
        ]
    }

    /// Target followed by the explanatory columns.
    pub fn numeric_names(&self) -> [&str; FEATURE_COUNT + 1] {
        [
            self.target.as_str(),
            self.price.as_str(),
            self.advertising.as_str(),
            self.satisfaction.as_str(),
        ]
    }
}

/// A validated table in canonical column order.
///
/// Holds the period labels and one `n x 4` matrix whose first column is the
/// target and whose remaining columns are the features. Rows keep the order
/// of the raw input.
///
/// Only serializable: a dataset is built through [`Dataset::validate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(crate = "serde_crate"))]
pub struct Dataset<F: Float> {
    schema: Schema,
    periods: Vec<String>,
    numeric: Array2<F>,
}

impl<F: Float> Dataset<F> {
    /// Checks `raw` against `schema` and normalizes it.
    ///
    /// # Errors
    ///
    /// Returns `DatasetError::EmptyDataset` if `raw` has no rows.
    /// Returns `DatasetError::Schema` listing every required column that is
    /// absent from at least one row, and every numeric column holding a value
    /// that cannot be read as a number. A column is reported in one list only.
    pub fn validate(raw: &RawDataset, schema: &Schema) -> Result<Self, DatasetError> {
        if raw.is_empty() {
            return Err(DatasetError::EmptyDataset);
        }
        let n = raw.len();
        let mut missing = Vec::new();
        let mut non_numeric = Vec::new();

        // The period is only required to be present and non-empty.
        let periods: Option<Vec<String>> = raw
            .iter()
            .map(|row| row.get(&schema.period).and_then(Cell::as_label))
            .collect();
        if periods.is_none() {
            missing.push(schema.period.clone());
        }

        let names = schema.numeric_names();
        let mut numeric = Array2::zeros((n, names.len()));
        for (j, name) in names.iter().enumerate() {
            if raw.iter().any(|row| row.get(name).is_none()) {
                missing.push(name.to_string());
                continue;
            }
            for (i, row) in raw.iter().enumerate() {
                match row.get(name).and_then(Cell::as_number) {
                    Some(v) => numeric[[i, j]] = F::from_value(v),
                    None => {
                        non_numeric.push(name.to_string());
                        break;
                    }
                }
            }
        }

        if !missing.is_empty() || !non_numeric.is_empty() {
            return Err(DatasetError::Schema {
                missing,
                non_numeric,
            });
        }

        let required: BTreeSet<&str> = std::iter::once(schema.period.as_str())
            .chain(names.iter().copied())
            .collect();
        let extra: BTreeSet<&str> = raw
            .iter()
            .flat_map(|row| row.columns())
            .filter(|column| !required.contains(column))
            .collect();
        if !extra.is_empty() {
            debug!("Dropping columns not used by the model: {:?}", extra);
        }
        debug!("Validated dataset with {} rows", n);

        Ok(Dataset {
            schema: schema.clone(),
            periods: periods.unwrap_or_default(),
            numeric,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.numeric.nrows()
    }

    /// Always false for a validated dataset; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.numeric.nrows() == 0
    }

    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    pub fn target(&self) -> ArrayView1<'_, F> {
        self.numeric.column(0)
    }

    /// Feature matrix, one row per record: `[price, advertising, satisfaction]`.
    pub fn features(&self) -> ArrayView2<'_, F> {
        self.numeric.slice(s![.., 1..])
    }

    pub fn feature_names(&self) -> [&str; FEATURE_COUNT] {
        self.schema.feature_names()
    }

    /// All numeric columns (target first) with their names.
    pub fn numeric_columns(&self) -> (Vec<String>, ArrayView2<'_, F>) {
        let names = self
            .schema
            .numeric_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        (names, self.numeric.view())
    }

    /// Period labels as numbers, when every label reads as one.
    pub fn numeric_periods(&self) -> Option<Array1<F>> {
        self.periods
            .iter()
            .map(|label| {
                label
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .map(F::from_value)
            })
            .collect()
    }

    /// Every column holding numbers: the period when all of its labels are
    /// numeric, then the target and the features.
    pub fn all_numeric_columns(&self) -> (Vec<String>, Array2<F>) {
        let (mut names, values) = self.numeric_columns();
        match self.numeric_periods() {
            Some(periods) => {
                names.insert(0, self.schema.period.clone());
                let mut columns = Array2::zeros((self.len(), names.len()));
                columns.column_mut(0).assign(&periods);
                columns.slice_mut(s![.., 1..]).assign(&values);
                (names, columns)
            }
            None => (names, values.to_owned()),
        }
    }

    /// Target values paired with their period label, in row order.
    pub fn target_series(&self) -> Vec<(&str, F)> {
        self.periods
            .iter()
            .map(String::as_str)
            .zip(self.target().iter().copied())
            .collect()
    }

    /// Column means of the features.
    pub fn feature_means(&self) -> Array1<F> {
        self.features().sum_axis(Axis(0)) / F::from_len(self.len())
    }
}
