//! Ordinary least squares with intercept
//!
//! Fitting is delegated to smartcore's SVD-based `LinearRegression`, which
//! returns the minimum-norm solution when features are collinear. Constant
//! columns are left out of the fit and get a zero coefficient.

use itertools::izip;
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression as SvdRegression, LinearRegressionParameters, LinearRegressionSolverName,
};

use super::scaler::{check_width, to_matrix, MIN_STD};
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::{mean, population_std_dev};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    pub fn fit(rows: &[Vec<f64>], targets: &[f64]) -> AdvisorResult<Self> {
        let width = rows.first().ok_or(AdvisorError::EmptyTrainingSet)?.len();
        if rows.len() != targets.len() {
            return Err(AdvisorError::TargetLengthMismatch {
                rows: rows.len(),
                targets: targets.len(),
            });
        }
        check_width(rows, width)?;

        let y_mean = mean(targets).ok_or(AdvisorError::EmptyTrainingSet)?;

        let active: Vec<usize> = (0..width)
            .filter(|&col| {
                let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                population_std_dev(&column).is_some_and(|std| std > MIN_STD)
            })
            .collect();

        let mut coefficients = vec![0.0; width];
        if active.is_empty() {
            return Ok(Self {
                intercept: y_mean,
                coefficients,
            });
        }

        let x: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| active.iter().map(|&col| row[col]).collect())
            .collect();
        let x = to_matrix(&x)?;
        let y = targets.to_vec();

        let params = LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
        let model: SvdRegression<f64, f64, DenseMatrix<f64>, Vec<f64>> =
            SvdRegression::fit(&x, &y, params).map_err(|e| AdvisorError::ModelFit(e.to_string()))?;

        // Weights are the responses at the origin and at each unit vector
        let k = active.len();
        let basis: Vec<Vec<f64>> = (0..=k)
            .map(|i| (0..k).map(|j| if i == j + 1 { 1.0 } else { 0.0 }).collect())
            .collect();
        let outputs = model
            .predict(&to_matrix(&basis)?)
            .map_err(|e| AdvisorError::ModelFit(e.to_string()))?;

        let intercept = outputs[0];
        for (j, &col) in active.iter().enumerate() {
            coefficients[col] = outputs[j + 1] - intercept;
        }

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    pub fn predict_row(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(beta, x)| beta * x)
                .sum::<f64>()
    }

    /// Coefficient of determination on `(rows, targets)`.
    ///
    /// A constant target scores 1.0 when fitted exactly and 0.0 otherwise.
    pub fn score(&self, rows: &[Vec<f64>], targets: &[f64]) -> f64 {
        if targets.is_empty() {
            return 0.0;
        }
        let predicted: Vec<f64> = rows.iter().map(|row| self.predict_row(row)).collect();

        let constant = population_std_dev(targets).is_some_and(|std| std == 0.0);
        if constant {
            let exact = izip!(&predicted, targets).all(|(p, y)| (p - y).abs() < MIN_STD);
            return if exact { 1.0 } else { 0.0 };
        }

        smartcore::metrics::r2(&targets.to_vec(), &predicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_recovers_exact_plane() {
        // y = 2 + 3a - 0.5b
        let rows: Vec<Vec<f64>> = (0..20)
            .map(|i| vec![i as f64, ((i * 7) % 5) as f64])
            .collect();
        let targets: Vec<f64> = rows.iter().map(|r| 2.0 + 3.0 * r[0] - 0.5 * r[1]).collect();

        let model = LinearRegression::fit(&rows, &targets).unwrap();
        assert_abs_diff_eq!(model.intercept, 2.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.coefficients[0], 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.coefficients[1], -0.5, epsilon = 1e-8);
        assert_abs_diff_eq!(model.score(&rows, &targets), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_constant_column_gets_zero_weight() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 4.0]).collect();
        let targets: Vec<f64> = rows.iter().map(|r| 1.0 + r[0]).collect();

        let model = LinearRegression::fit(&rows, &targets).unwrap();
        assert_eq!(model.coefficients[1], 0.0);
        assert_abs_diff_eq!(model.predict_row(&[3.0, 4.0]), 4.0, epsilon = 1e-8);
    }

    #[test]
    fn test_collinear_columns_still_fit() {
        // Second column is twice the first; any split with a + 2b = 1 fits
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let targets: Vec<f64> = (0..10).map(|i| i as f64).collect();

        let model = LinearRegression::fit(&rows, &targets).unwrap();
        let combined = model.coefficients[0] + 2.0 * model.coefficients[1];
        assert_abs_diff_eq!(combined, 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.predict_row(&[3.0, 6.0]), 3.0, epsilon = 1e-8);
        assert_abs_diff_eq!(model.score(&rows, &targets), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_constant_target_scores_one() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64]).collect();
        let targets = vec![0.05; 6];

        let model = LinearRegression::fit(&rows, &targets).unwrap();
        assert_abs_diff_eq!(model.predict_row(&[2.0]), 0.05, epsilon = 1e-10);
        assert_eq!(model.score(&rows, &targets), 1.0);
    }

    #[test]
    fn test_score_of_mean_model_is_zero() {
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![i as f64]).collect();
        let targets = vec![1.0, 3.0, 1.0, 3.0];
        let mean_model = LinearRegression {
            intercept: 2.0,
            coefficients: vec![0.0],
        };
        assert_abs_diff_eq!(mean_model.score(&rows, &targets), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let rows = vec![vec![1.0], vec![2.0]];
        assert_eq!(
            LinearRegression::fit(&rows, &[1.0]),
            Err(AdvisorError::TargetLengthMismatch { rows: 2, targets: 1 })
        );
    }
}
