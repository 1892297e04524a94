//! Small summary statistics shared by the evaluation and correlation crates.

use ndarray::ArrayView1;

use crate::Float;

/// Arithmetic mean, `None` for an empty view.
pub fn mean<F: Float>(values: ArrayView1<F>) -> Option<F> {
    if values.is_empty() {
        return None;
    }
    Some(values.sum() / F::from_len(values.len()))
}

/// Sum of squared deviations from the mean (zero for an empty view).
pub fn centered_sum_of_squares<F: Float>(values: ArrayView1<F>) -> F {
    match mean(values) {
        Some(m) => values.iter().map(|&v| (v - m) * (v - m)).sum(),
        None => F::zero(),
    }
}

/// True when every value equals the first one.
///
/// Checked exactly, so a column of identical readings is caught even when
/// rounding in the mean would leave a tiny non-zero variance.
pub fn is_constant<F: Float>(values: ArrayView1<F>) -> bool {
    match values.first() {
        Some(&first) => values.iter().all(|&v| v == first),
        None => true,
    }
}

/// True when no value is NaN or infinite.
pub fn all_finite<'a, F: Float>(values: impl IntoIterator<Item = &'a F>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}
