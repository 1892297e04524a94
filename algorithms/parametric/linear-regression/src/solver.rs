use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use forecast_helpers::Float;

use crate::RegressionError;

/// Linear-algebra routine used to solve the least-squares problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate", rename_all = "snake_case")
)]
pub enum Solver {
    /// Cholesky factorization of `AᵗA`.
    #[default]
    NormalEquations,
    /// Householder QR of `A`. Never forms `AᵗA`, so it keeps more digits
    /// on badly scaled columns.
    Qr,
}

/// Column means of `x` and `x` with those means removed.
///
/// The intercept is not part of the solved system; it is recovered from the
/// means once the slopes are known.
pub(crate) fn center<F: Float>(x: ArrayView2<F>) -> (Array1<F>, Array2<F>) {
    let means = x.sum_axis(Axis(0)) / F::from_len(x.nrows());
    let centered = &x - &means;
    (means, centered)
}

/// Solves the least-squares problem on centered columns.
///
/// A rejected column `j` is reported as parameter `j + 1`, 0 being the intercept.
pub(crate) fn solve<F: Float>(
    solver: Solver,
    a: ArrayView2<F>,
    y: ArrayView1<F>,
    tolerance: F,
) -> Result<Array1<F>, RegressionError> {
    match solver {
        Solver::NormalEquations => normal_equations(a, y, tolerance),
        Solver::Qr => householder_qr(a, y, tolerance),
    }
}

/// Solves `(AᵗA) θ = Aᵗy` through a Cholesky factor `L Lᵗ = AᵗA`.
///
/// Column `j` is rejected as collinear when `L_jj² <= tolerance * (AᵗA)_jj`,
/// i.e. when almost none of its spread survives projecting out the columns
/// before it. A constant column has no spread once centered and always fails.
fn normal_equations<F: Float>(
    a: ArrayView2<F>,
    y: ArrayView1<F>,
    tolerance: F,
) -> Result<Array1<F>, RegressionError> {
    let gram = a.t().dot(&a);
    let rhs = a.t().dot(&y);
    let p = gram.nrows();

    let mut l = Array2::<F>::zeros((p, p));
    for j in 0..p {
        let mut diag = gram[[j, j]];
        for k in 0..j {
            diag -= l[[j, k]] * l[[j, k]];
        }
        if !(diag > tolerance * gram[[j, j]]) {
            return Err(RegressionError::SingularMatrix { parameter: j + 1 });
        }
        let pivot = diag.sqrt();
        l[[j, j]] = pivot;
        for i in (j + 1)..p {
            let mut acc = gram[[i, j]];
            for k in 0..j {
                acc -= l[[i, k]] * l[[j, k]];
            }
            l[[i, j]] = acc / pivot;
        }
    }

    // L z = Aᵗy, then Lᵗ θ = z.
    let mut z = Array1::<F>::zeros(p);
    for i in 0..p {
        let mut acc = rhs[i];
        for k in 0..i {
            acc -= l[[i, k]] * z[k];
        }
        z[i] = acc / l[[i, i]];
    }
    Ok(back_substitute(l.t(), z.view()))
}

/// Solves `min ‖Aθ - y‖` with Householder reflections, `A = QR`.
///
/// Uses the same rejection rule as the normal equations, expressed on `R`:
/// `R_jj² <= tolerance * ‖a_j‖²`.
fn householder_qr<F: Float>(
    a: ArrayView2<F>,
    y: ArrayView1<F>,
    tolerance: F,
) -> Result<Array1<F>, RegressionError> {
    let p = a.ncols();
    let mut r = a.to_owned();
    let mut qty = y.to_owned();
    let norms: Vec<F> = a.columns().into_iter().map(|c| c.dot(&c)).collect();
    let two = F::one() + F::one();

    for j in 0..p {
        let mut v = r.slice(s![j.., j]).to_owned();
        let energy = v.dot(&v);
        if !(energy > tolerance * norms[j]) {
            return Err(RegressionError::SingularMatrix { parameter: j + 1 });
        }
        // Reflect onto -sign(v0) * ‖v‖ e1 to avoid cancellation.
        let alpha = if v[0] > F::zero() {
            -energy.sqrt()
        } else {
            energy.sqrt()
        };
        v[0] -= alpha;
        let v_norm = v.dot(&v);

        for k in j..p {
            let mut column = r.slice_mut(s![j.., k]);
            let scale = two * v.dot(&column) / v_norm;
            column.scaled_add(-scale, &v);
        }
        let mut tail = qty.slice_mut(s![j..]);
        let scale = two * v.dot(&tail) / v_norm;
        tail.scaled_add(-scale, &v);
    }

    Ok(back_substitute(r.slice(s![..p, ..p]), qty.slice(s![..p])))
}

/// Solves `U x = b` for upper-triangular `U` with a non-zero diagonal.
fn back_substitute<F: Float>(upper: ArrayView2<F>, b: ArrayView1<F>) -> Array1<F> {
    let p = b.len();
    let mut x = Array1::<F>::zeros(p);
    for i in (0..p).rev() {
        let mut acc = b[i];
        for k in (i + 1)..p {
            acc -= upper[[i, k]] * x[k];
        }
        x[i] = acc / upper[[i, i]];
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_center() {
        let x = array![[2.0, 3.0], [4.0, 7.0]];
        let (means, centered) = center(x.view());
        assert_eq!(means, array![3.0, 5.0]);
        assert_eq!(centered, array![[-1.0, -2.0], [1.0, 2.0]]);
    }

    #[test]
    fn test_back_substitute() {
        let u = array![[2.0, 1.0], [0.0, 4.0]];
        let x = back_substitute(u.view(), array![5.0, 8.0].view());
        assert_abs_diff_eq!(x, array![1.5, 2.0], epsilon = 1e-12);
    }

    #[test]
    fn test_simple_line_both_solvers() {
        // y = 2 + 3x, centered around x = 1, y = 5
        let (_, a) = center(array![[0.0], [1.0], [2.0]].view());
        let y = array![-3.0, 0.0, 3.0];
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let beta = solve(solver, a.view(), y.view(), 1e-10).unwrap();
            assert_abs_diff_eq!(beta, array![3.0], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_duplicated_column_is_singular() {
        let (_, a) = center(array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [5.0, 10.0]].view());
        let y = array![-1.5, -0.5, 0.5, 1.5];
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let err = solve(solver, a.view(), y.view(), 1e-8).unwrap_err();
            assert_eq!(err, RegressionError::SingularMatrix { parameter: 2 });
        }
    }

    #[test]
    fn test_constant_column_is_singular() {
        let (_, a) = center(array![[1.0, 7.0], [2.0, 7.0], [4.0, 7.0]].view());
        let y = array![-1.0, 0.0, 1.0];
        for solver in [Solver::NormalEquations, Solver::Qr] {
            let err = solve(solver, a.view(), y.view(), 1e-8).unwrap_err();
            assert_eq!(err, RegressionError::SingularMatrix { parameter: 2 });
        }
    }
}
