//! Fits a model on a year of monthly figures and answers a few what-if
//! questions, showing how each error surfaces.

use linear_regression::{LinearRegression, RegressionError, Solver, evaluate};
use ndarray::{Array1, Array2, array};

fn main() {
    println!("What-if sales forecasts");
    println!("=======================");

    // price, advertising (DH), satisfaction (%)
    let x: Array2<f64> = array![
        [10.0, 50.0, 80.0],
        [11.0, 55.0, 82.0],
        [9.0, 40.0, 78.0],
        [12.0, 60.0, 85.0],
        [10.5, 52.0, 81.0],
        [9.5, 45.0, 79.0],
        [11.5, 58.0, 84.0],
        [10.0, 48.0, 83.0],
        [12.5, 65.0, 86.0],
        [9.0, 38.0, 77.0],
        [10.5, 54.0, 82.0],
        [11.0, 57.0, 80.0]
    ];
    let y: Array1<f64> = array![
        100.0, 120.0, 90.0, 130.0, 110.0, 96.0, 126.0, 104.0, 138.0, 87.0, 114.0, 118.0
    ];

    println!("\n1. Fitting with both solvers:");
    for solver in [Solver::NormalEquations, Solver::Qr] {
        match LinearRegression::new().solver(solver).fit(x.view(), y.view()) {
            Ok(model) => {
                println!(
                    "   {:?}: intercept {:.3}, coefficients {:.3}",
                    solver,
                    model.intercept(),
                    model.coefficients()
                );
                if let Ok(metrics) = evaluate(&model, x.view(), y.view()) {
                    println!(
                        "   R² {:.3}  MAE {:.2}  RMSE {:.2}",
                        metrics.r2, metrics.mae, metrics.rmse
                    );
                }
            }
            Err(e) => println!("   ✗ {:?} failed: {}", solver, e),
        }
    }

    println!("\n2. Predictions, including extrapolation:");
    if let Ok(model) = LinearRegression::new().fit(x.view(), y.view()) {
        for point in [array![10.0, 50.0, 80.0], array![15.0, 100.0, 95.0]] {
            match model.predict(point.view()) {
                Ok(sales) => println!("   {} -> {:.1} units", point, sales),
                Err(e) => println!("   ✗ {}", e),
            }
        }

        println!("\n3. A request with the wrong number of inputs:");
        match model.predict(array![10.0, 50.0].view()) {
            Err(RegressionError::DimensionMismatch { expected, found }) => {
                println!("   ✓ Rejected: expected {} values, found {}", expected, found)
            }
            other => println!("   ✗ Unexpected result: {:?}", other),
        }
    }

    println!("\n4. Identical inputs every month:");
    let flat = Array2::from_shape_fn((6, 3), |(_, j)| [10.0, 50.0, 80.0][j]);
    let sales = array![100.0, 120.0, 90.0, 130.0, 110.0, 105.0];
    match LinearRegression::new().fit(flat.view(), sales.view()) {
        Err(e @ RegressionError::SingularMatrix { .. }) => println!("   ✓ {}", e),
        other => println!("   ✗ Unexpected result: {:?}", other),
    }

    println!("\n5. Too little history:");
    match LinearRegression::new().fit(x.slice(ndarray::s![..3, ..]), y.slice(ndarray::s![..3])) {
        Err(e @ RegressionError::InsufficientData { .. }) => println!("   ✓ {}", e),
        other => println!("   ✗ Unexpected result: {:?}", other),
    }
}
