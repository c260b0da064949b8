//! Feature standardization
//!
//! Wraps smartcore's `StandardScaler` so inference inputs are scaled exactly
//! like the training matrix. Zero-variance columns never reach the inner
//! scaler and pass through unchanged.

use smartcore::api::{Transformer, UnsupervisedEstimator};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::preprocessing::numerical::{StandardScaler, StandardScalerParameters};

use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::population_std_dev;

/// Columns with a spread at or below this are passed through unchanged
pub const MIN_STD: f64 = 1e-12;

/// Fitted z-score scaler
#[derive(Debug)]
pub struct FeatureScaler {
    width: usize,
    /// Indices of the columns the inner scaler was fitted on
    scaled_columns: Vec<usize>,
    inner: Option<StandardScaler<f64>>,
}

impl FeatureScaler {
    /// Compute per-column statistics over all rows
    pub fn fit(rows: &[Vec<f64>]) -> AdvisorResult<Self> {
        let width = rows.first().ok_or(AdvisorError::EmptyTrainingSet)?.len();
        check_width(rows, width)?;

        let scaled_columns: Vec<usize> = (0..width)
            .filter(|&col| {
                let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                population_std_dev(&column).is_some_and(|std| std > MIN_STD)
            })
            .collect();

        let inner = if scaled_columns.is_empty() {
            None
        } else {
            let matrix = to_matrix(&select(rows, &scaled_columns))?;
            let scaler = StandardScaler::fit(&matrix, StandardScalerParameters::default())
                .map_err(|e| AdvisorError::ModelFit(e.to_string()))?;
            Some(scaler)
        };

        Ok(Self {
            width,
            scaled_columns,
            inner,
        })
    }

    /// Fit on `rows` and return the scaled copy alongside the scaler
    pub fn fit_transform(rows: &[Vec<f64>]) -> AdvisorResult<(Self, Vec<Vec<f64>>)> {
        let scaler = Self::fit(rows)?;
        let scaled = scaler.transform(rows)?;
        Ok((scaler, scaled))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether column `col` is passed through unchanged
    pub fn is_identity(&self, col: usize) -> bool {
        !self.scaled_columns.contains(&col)
    }

    /// Scale a matrix with the fitted statistics
    pub fn transform(&self, rows: &[Vec<f64>]) -> AdvisorResult<Vec<Vec<f64>>> {
        check_width(rows, self.width)?;

        let mut out = rows.to_vec();
        let Some(inner) = &self.inner else {
            return Ok(out);
        };
        if rows.is_empty() {
            return Ok(out);
        }

        let matrix = to_matrix(&select(rows, &self.scaled_columns))?;
        let scaled = inner
            .transform(&matrix)
            .map_err(|e| AdvisorError::ModelFit(e.to_string()))?;

        for (i, row) in out.iter_mut().enumerate() {
            for (j, &col) in self.scaled_columns.iter().enumerate() {
                row[col] = *scaled.get((i, j));
            }
        }
        Ok(out)
    }

    /// Scale a single row
    pub fn transform_row(&self, row: &[f64]) -> AdvisorResult<Vec<f64>> {
        let mut scaled = self.transform(&[row.to_vec()])?;
        scaled.pop().ok_or(AdvisorError::EmptyTrainingSet)
    }
}

fn select(rows: &[Vec<f64>], columns: &[usize]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|row| columns.iter().map(|&col| row[col]).collect())
        .collect()
}

pub(crate) fn to_matrix(rows: &[Vec<f64>]) -> AdvisorResult<DenseMatrix<f64>> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| AdvisorError::ModelFit(e.to_string()))
}

pub(crate) fn check_width(rows: &[Vec<f64>], width: usize) -> AdvisorResult<()> {
    match rows.iter().find(|row| row.len() != width) {
        Some(row) => Err(AdvisorError::FeatureWidthMismatch {
            expected: width,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn matrix() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 10.0, 5.0],
            vec![6.0, 20.0, 5.0],
            vec![12.0, 30.0, 5.0],
            vec![18.0, 40.0, 5.0],
        ]
    }

    fn column(rows: &[Vec<f64>], col: usize) -> Vec<f64> {
        rows.iter().map(|r| r[col]).collect()
    }

    #[test]
    fn test_scaled_columns_are_centered_with_equal_spread() {
        let (_, scaled) = FeatureScaler::fit_transform(&matrix()).unwrap();

        let first = column(&scaled, 0);
        let second = column(&scaled, 1);
        assert_abs_diff_eq!(first.iter().sum::<f64>(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(second.iter().sum::<f64>(), 0.0, epsilon = 1e-9);

        // Both columns are evenly spaced, so they standardize to the same values
        for (a, b) in first.iter().zip(&second) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
        assert!(first[0] < first[1] && first[1] < first[2] && first[2] < first[3]);
    }

    #[test]
    fn test_zero_variance_column_is_identity() {
        let (scaler, scaled) = FeatureScaler::fit_transform(&matrix()).unwrap();
        assert!(scaler.is_identity(2));
        assert!(!scaler.is_identity(0));
        assert!(scaled.iter().all(|r| r[2] == 5.0));
    }

    #[test]
    fn test_all_constant_columns_pass_through() {
        let rows = vec![vec![1.0, 2.0], vec![1.0, 2.0]];
        let (_, scaled) = FeatureScaler::fit_transform(&rows).unwrap();
        assert_eq!(scaled, rows);
    }

    #[test]
    fn test_transform_row_matches_matrix_transform() {
        let scaler = FeatureScaler::fit(&matrix()).unwrap();
        let row = scaler.transform_row(&[12.0, 30.0, 5.0]).unwrap();
        let full = scaler.transform(&matrix()).unwrap();
        for (a, b) in row.iter().zip(&full[2]) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_width_mismatch() {
        let scaler = FeatureScaler::fit(&matrix()).unwrap();
        assert_eq!(
            scaler.transform_row(&[1.0, 2.0]).unwrap_err(),
            AdvisorError::FeatureWidthMismatch { expected: 3, actual: 2 }
        );
        assert!(FeatureScaler::fit(&[vec![1.0, 2.0], vec![1.0]]).is_err());
    }

    #[test]
    fn test_fit_empty() {
        assert_eq!(
            FeatureScaler::fit(&[]).unwrap_err(),
            AdvisorError::EmptyTrainingSet
        );
    }
}
