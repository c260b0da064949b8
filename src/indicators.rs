//! Statistical indicators
//!
//! Rolling means, dispersion and trend helpers used by the trend analyzer
//! and the regression model.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use statrs::statistics::Statistics;

/// Calculate Simple Moving Average
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if period == 0 || i + 1 < period {
            result.push(None);
        } else {
            let sum: f64 = values[i + 1 - period..=i].iter().sum();
            result.push(Some(sum / period as f64));
        }
    }

    result
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Population standard deviation (divides by N), `None` for an empty slice
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().population_std_dev())
}

/// Slope of the least-squares line through `values` against their index
pub fn linear_slope(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < 1e-10 {
        return None;
    }

    Some((n * sum_xy - sum_x * sum_y) / denominator)
}

/// Round to `dp` decimal places with banker's rounding, on the decimal digits
pub fn round_to(value: f64, dp: u32) -> f64 {
    Decimal::from_f64(value)
        .map(|d| d.round_dp(dp))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sma() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = sma(&values, 3);

        assert_eq!(result[0], None);
        assert_eq!(result[1], None);
        assert_eq!(result[2], Some(2.0));
        assert_eq!(result[3], Some(3.0));
        assert_eq!(result[4], Some(4.0));
    }

    #[test]
    fn test_sma_window_longer_than_series() {
        let result = sma(&[1.0, 2.0], 24);
        assert!(result.iter().all(Option::is_none));
    }

    #[test]
    fn test_population_std_dev() {
        // Textbook example: population std of this set is exactly 2
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(population_std_dev(&values).unwrap(), 2.0, epsilon = 1e-12);
        assert_eq!(population_std_dev(&[]), None);
    }

    #[test]
    fn test_linear_slope() {
        let rising: Vec<f64> = (0..24).map(|i| 0.05 + 0.001 * i as f64).collect();
        assert_abs_diff_eq!(linear_slope(&rising).unwrap(), 0.001, epsilon = 1e-12);

        let flat = [0.05; 24];
        assert_abs_diff_eq!(linear_slope(&flat).unwrap(), 0.0, epsilon = 1e-15);

        assert_eq!(linear_slope(&[1.0]), None);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(99.994, 2), 99.99);
        assert_eq!(round_to(0.95, 2), 0.95);
    }
}
