//! Core data types shared by every pipeline stage

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for market samples
#[derive(Debug, Error, PartialEq)]
pub enum SampleValidationError {
    #[error("price ({0}) must be positive")]
    NonPositivePrice(f64),

    #[error("demand ({0}) must be >= 0")]
    NegativeDemand(f64),

    #[error("supply ({0}) must be >= 0")]
    NegativeSupply(f64),

    #[error("hour ({0}) must be within 0..=23")]
    HourOutOfRange(u32),

    #[error("hour ({hour}) does not match timestamp hour ({timestamp_hour})")]
    HourMismatch { hour: u32, timestamp_hour: u32 },
}

/// One hourly observation of the synthetic energy-token market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSample {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub demand: f64,
    pub supply: f64,
    pub hour: u32,
}

impl MarketSample {
    /// Create a new sample with validation. The hour is taken from the timestamp.
    pub fn new(
        timestamp: DateTime<Utc>,
        price: f64,
        demand: f64,
        supply: f64,
    ) -> Result<Self, SampleValidationError> {
        let sample = Self {
            timestamp,
            price,
            demand,
            supply,
            hour: timestamp.hour(),
        };
        sample.validate()?;
        Ok(sample)
    }

    /// Validate the sample data
    pub fn validate(&self) -> Result<(), SampleValidationError> {
        if self.price <= 0.0 {
            return Err(SampleValidationError::NonPositivePrice(self.price));
        }
        if self.demand < 0.0 {
            return Err(SampleValidationError::NegativeDemand(self.demand));
        }
        if self.supply < 0.0 {
            return Err(SampleValidationError::NegativeSupply(self.supply));
        }
        if self.hour > 23 {
            return Err(SampleValidationError::HourOutOfRange(self.hour));
        }
        if self.hour != self.timestamp.hour() {
            return Err(SampleValidationError::HourMismatch {
                hour: self.hour,
                timestamp_hour: self.timestamp.hour(),
            });
        }
        Ok(())
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.hour, self.demand, self.supply)
    }
}

/// Model input in the fixed `(hour, demand, supply)` order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub hour: u32,
    pub demand: f64,
    pub supply: f64,
}

impl FeatureVector {
    pub const NUM_FEATURES: usize = 3;
    pub const NAMES: [&'static str; Self::NUM_FEATURES] = ["hour", "demand", "supply"];

    pub fn new(hour: u32, demand: f64, supply: f64) -> Self {
        Self {
            hour,
            demand,
            supply,
        }
    }

    /// Column values in schema order. Training and inference both go through here.
    pub fn to_array(&self) -> [f64; Self::NUM_FEATURES] {
        [self.hour as f64, self.demand, self.supply]
    }
}

/// Volatility and trend signals over the analyzed series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub price_volatility: f64,
    pub demand_volatility: f64,
    pub price_trend_slope: f64,
    pub current_price: f64,
    pub avg_price_24h: f64,
}

/// One projected hour of the forward forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub hour: u32,
    pub predicted_price: f64,
    pub demand: f64,
    pub supply: f64,
}

/// Recommended trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TradeAction::Buy => "buy",
            TradeAction::Sell => "sell",
            TradeAction::Hold => "hold",
        };
        write!(f, "{}", s)
    }
}

/// Qualitative risk tier derived from price volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        };
        write!(f, "{}", s)
    }
}

/// Final output of one advisor run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_address: String,
    pub recommended_action: TradeAction,
    pub confidence: f64,
    pub optimal_amount: u32,
    pub current_price: f64,
    pub predicted_price_24h: f64,
    pub price_change_percent: f64,
    pub reasoning: Vec<String>,
    pub risk_level: RiskLevel,
    pub market_analysis: TrendSummary,
    /// Only the first hours of the forecast are surfaced
    pub predictions: Vec<ForecastPoint>,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_sample_takes_hour_from_timestamp() {
        let sample = MarketSample::new(ts(17), 0.05, 100.0, 80.0).unwrap();
        assert_eq!(sample.hour, 17);
    }

    #[test]
    fn test_sample_rejects_non_positive_price() {
        let err = MarketSample::new(ts(0), 0.0, 100.0, 80.0).unwrap_err();
        assert_eq!(err, SampleValidationError::NonPositivePrice(0.0));
    }

    #[test]
    fn test_sample_rejects_negative_volumes() {
        assert!(MarketSample::new(ts(0), 0.05, -1.0, 80.0).is_err());
        assert!(MarketSample::new(ts(0), 0.05, 100.0, -0.5).is_err());
    }

    #[test]
    fn test_sample_detects_hour_mismatch() {
        let mut sample = MarketSample::new(ts(5), 0.05, 100.0, 80.0).unwrap();
        sample.hour = 6;
        assert!(matches!(
            sample.validate(),
            Err(SampleValidationError::HourMismatch { hour: 6, timestamp_hour: 5 })
        ));
    }

    #[test]
    fn test_feature_order_is_fixed() {
        let fv = FeatureVector::new(12, 100.0, 80.0);
        assert_eq!(fv.to_array(), [12.0, 100.0, 80.0]);
        assert_eq!(FeatureVector::NAMES, ["hour", "demand", "supply"]);
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&TradeAction::Buy).unwrap(), "\"buy\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
        assert_eq!(TradeAction::Hold.to_string(), "hold");
    }
}
