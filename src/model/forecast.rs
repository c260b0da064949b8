//! Price forecasting model
//!
//! Trains a linear map from `(hour, demand, supply)` to price on the scaled
//! feature matrix and serves floored point predictions.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::regression::LinearRegression;
use super::scaler::FeatureScaler;
use crate::data::PRICE_DECIMALS;
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::round_to;
use crate::{FeatureVector, MarketSample};

/// Predictions never go below this price
pub const PRICE_FLOOR: f64 = 0.01;

/// Trainer for [`FittedModel`]
pub struct PriceForecastModel;

impl PriceForecastModel {
    /// Fit scaler and regression on the series.
    ///
    /// The returned model's `r_squared` is measured on the training data itself.
    pub fn train(samples: &[MarketSample]) -> AdvisorResult<FittedModel> {
        if samples.is_empty() {
            return Err(AdvisorError::EmptyTrainingSet);
        }

        let rows = feature_matrix(samples);
        let targets: Vec<f64> = samples.iter().map(|s| s.price).collect();

        let (scaler, scaled) = FeatureScaler::fit_transform(&rows)?;
        let regression = LinearRegression::fit(&scaled, &targets)?;
        let r_squared = regression.score(&scaled, &targets);

        debug!(
            "Fitted coefficients {:?} (intercept {:.6}) over features {:?}",
            regression.coefficients,
            regression.intercept,
            FeatureVector::NAMES
        );
        info!(
            "Trained price model on {} samples, R² = {:.3}",
            samples.len(),
            r_squared
        );

        Ok(FittedModel {
            scaler,
            regression,
            r_squared,
            training_samples: samples.len(),
            trained_at: Utc::now(),
        })
    }
}

/// Feature rows in schema order
pub fn feature_matrix(samples: &[MarketSample]) -> Vec<Vec<f64>> {
    samples
        .iter()
        .map(|s| s.features().to_array().to_vec())
        .collect()
}

/// Scaler statistics and regression weights from one training run
#[derive(Debug)]
pub struct FittedModel {
    scaler: FeatureScaler,
    regression: LinearRegression,
    r_squared: f64,
    training_samples: usize,
    trained_at: DateTime<Utc>,
}

impl FittedModel {
    /// In-sample coefficient of determination
    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn training_samples(&self) -> usize {
        self.training_samples
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    pub fn regression(&self) -> &LinearRegression {
        &self.regression
    }

    /// Raw regression output, before rounding and the price floor
    pub fn predict_raw(&self, features: FeatureVector) -> AdvisorResult<f64> {
        let scaled = self.scaler.transform_row(&features.to_array())?;
        Ok(self.regression.predict_row(&scaled))
    }

    /// Predicted price rounded to 4 dp, never below [`PRICE_FLOOR`]
    pub fn predict(&self, features: FeatureVector) -> AdvisorResult<f64> {
        let raw = self.predict_raw(features)?;
        Ok(round_to(raw, PRICE_DECIMALS).max(PRICE_FLOOR))
    }

    /// Largest absolute in-sample residual over `samples`
    pub fn max_residual(&self, samples: &[MarketSample]) -> AdvisorResult<f64> {
        let rows = feature_matrix(samples);
        let scaled = self.scaler.transform(&rows)?;
        Ok(scaled
            .iter()
            .zip(samples)
            .map(|(row, s)| (s.price - self.regression.predict_row(row)).abs())
            .fold(0.0, f64::max))
    }
}
