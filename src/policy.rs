//! Recommendation policy
//!
//! Turns the fitted model, the current market snapshot and the trend summary
//! into a buy/sell/hold decision with a confidence, position size, risk tier
//! and human-readable reasons.
//!
//! Decision rule on `price_change = (mean forecast - current) / current`:
//! ```text
//! price_change >  buy_threshold   -> BUY,  confidence = min(cap, base + k * |change|)
//! price_change < -sell_threshold  -> SELL, confidence = min(cap, base + k * |change|)
//! otherwise                       -> HOLD, confidence = hold_confidence
//! ```
//! Both comparisons are strict, so a change of exactly ±5% holds.

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{PRICE_DECIMALS, VOLUME_DECIMALS};
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::{mean, round_to};
use crate::model::FittedModel;
use crate::{
    FeatureVector, ForecastPoint, MarketSample, Recommendation, RiskLevel, TradeAction,
    TrendSummary,
};

pub const REASON_TREND_UP: &str = "Price trend is upward";
pub const REASON_TREND_DOWN: &str = "Price trend is downward";
pub const REASON_HIGH_VOLATILITY: &str = "High market volatility detected";
pub const REASON_DEMAND_HEAVY: &str = "High demand relative to supply";
pub const REASON_SUPPLY_HEAVY: &str = "High supply relative to demand";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Hours projected forward (default: 24)
    #[serde(default = "default_horizon")]
    pub horizon_hours: usize,

    /// Forecast points surfaced in the recommendation (default: 6)
    #[serde(default = "default_published")]
    pub published_points: usize,

    /// Max relative perturbation of demand/supply per forecast hour (default: 0.10)
    #[serde(default = "default_perturbation")]
    pub perturbation: f64,

    /// Expected rise that triggers BUY (default: 0.05)
    #[serde(default = "default_change_threshold")]
    pub buy_threshold: f64,

    /// Expected fall that triggers SELL (default: 0.05)
    #[serde(default = "default_change_threshold")]
    pub sell_threshold: f64,

    #[serde(default = "default_base_confidence")]
    pub base_confidence: f64,

    #[serde(default = "default_confidence_slope")]
    pub confidence_slope: f64,

    #[serde(default = "default_max_confidence")]
    pub max_confidence: f64,

    #[serde(default = "default_hold_confidence")]
    pub hold_confidence: f64,

    /// Inclusive BUY size range in tokens (default: 50..=200)
    #[serde(default = "default_buy_amount")]
    pub buy_amount: (u32, u32),

    /// Inclusive SELL size range in tokens (default: 30..=150)
    #[serde(default = "default_sell_amount")]
    pub sell_amount: (u32, u32),

    /// Price volatility above which the market is flagged volatile / medium risk (default: 0.01)
    #[serde(default = "default_medium_risk")]
    pub medium_risk_volatility: f64,

    /// Price volatility above which risk is high (default: 0.02)
    #[serde(default = "default_high_risk")]
    pub high_risk_volatility: f64,

    /// Demand/supply ratio that counts as imbalanced (default: 1.2)
    #[serde(default = "default_imbalance_ratio")]
    pub imbalance_ratio: f64,
}

fn default_horizon() -> usize {
    24
}
fn default_published() -> usize {
    6
}
fn default_perturbation() -> f64 {
    0.10
}
fn default_change_threshold() -> f64 {
    0.05
}
fn default_base_confidence() -> f64 {
    0.6
}
fn default_confidence_slope() -> f64 {
    2.0
}
fn default_max_confidence() -> f64 {
    0.95
}
fn default_hold_confidence() -> f64 {
    0.5
}
fn default_buy_amount() -> (u32, u32) {
    (50, 200)
}
fn default_sell_amount() -> (u32, u32) {
    (30, 150)
}
fn default_medium_risk() -> f64 {
    0.01
}
fn default_high_risk() -> f64 {
    0.02
}
fn default_imbalance_ratio() -> f64 {
    1.2
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            horizon_hours: default_horizon(),
            published_points: default_published(),
            perturbation: default_perturbation(),
            buy_threshold: default_change_threshold(),
            sell_threshold: default_change_threshold(),
            base_confidence: default_base_confidence(),
            confidence_slope: default_confidence_slope(),
            max_confidence: default_max_confidence(),
            hold_confidence: default_hold_confidence(),
            buy_amount: default_buy_amount(),
            sell_amount: default_sell_amount(),
            medium_risk_volatility: default_medium_risk(),
            high_risk_volatility: default_high_risk(),
            imbalance_ratio: default_imbalance_ratio(),
        }
    }
}

impl PolicyConfig {
    pub fn validate(&self) -> AdvisorResult<()> {
        let invalid = |msg: &str| Err(AdvisorError::InvalidConfig(format!("policy: {}", msg)));

        if self.horizon_hours == 0 {
            return invalid("horizon_hours must be positive");
        }
        if !(self.perturbation.abs() < 1.0) {
            return invalid("perturbation must be below 1.0 to keep volumes non-negative");
        }
        if !(self.high_risk_volatility >= self.medium_risk_volatility) {
            return invalid("high_risk_volatility must be >= medium_risk_volatility");
        }
        if !(self.hold_confidence <= self.max_confidence) {
            return invalid("hold_confidence must not exceed max_confidence");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationPolicy {
    config: PolicyConfig,
}

impl RecommendationPolicy {
    pub fn new(config: PolicyConfig) -> AdvisorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Project prices for the next `horizon_hours`, starting at `start_hour`.
    ///
    /// Demand and supply are the current values, each jittered independently.
    pub fn forecast<R: Rng + ?Sized>(
        &self,
        model: &FittedModel,
        current: &MarketSample,
        start_hour: u32,
        rng: &mut R,
    ) -> AdvisorResult<Vec<ForecastPoint>> {
        let jitter = self.config.perturbation.abs();

        (0..self.config.horizon_hours)
            .map(|i| {
                let hour = (start_hour + i as u32) % 24;
                let demand = current.demand * (1.0 + rng.random_range(-jitter..=jitter));
                let supply = current.supply * (1.0 + rng.random_range(-jitter..=jitter));
                let predicted_price = model.predict(FeatureVector::new(hour, demand, supply))?;

                Ok(ForecastPoint {
                    hour,
                    predicted_price,
                    demand: round_to(demand, VOLUME_DECIMALS),
                    supply: round_to(supply, VOLUME_DECIMALS),
                })
            })
            .collect()
    }

    /// Action and unrounded confidence for a relative price change
    pub fn decide(&self, price_change: f64) -> (TradeAction, f64) {
        let scaled = (self.config.base_confidence
            + self.config.confidence_slope * price_change.abs())
        .min(self.config.max_confidence);

        if price_change > self.config.buy_threshold {
            (TradeAction::Buy, scaled)
        } else if price_change < -self.config.sell_threshold {
            (TradeAction::Sell, scaled)
        } else {
            (TradeAction::Hold, self.config.hold_confidence)
        }
    }

    pub fn size_position<R: Rng + ?Sized>(&self, action: TradeAction, rng: &mut R) -> u32 {
        let draw = |(lo, hi): (u32, u32), rng: &mut R| rng.random_range(lo.min(hi)..=hi.max(lo));
        match action {
            TradeAction::Buy => draw(self.config.buy_amount, rng),
            TradeAction::Sell => draw(self.config.sell_amount, rng),
            TradeAction::Hold => 0,
        }
    }

    pub fn assess_risk(&self, price_volatility: f64) -> RiskLevel {
        if price_volatility > self.config.high_risk_volatility {
            RiskLevel::High
        } else if price_volatility > self.config.medium_risk_volatility {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn reasoning(&self, trends: &TrendSummary, current: &MarketSample) -> Vec<String> {
        let mut reasons = Vec::new();

        if trends.price_trend_slope > 0.0 {
            reasons.push(REASON_TREND_UP.to_string());
        } else if trends.price_trend_slope < 0.0 {
            reasons.push(REASON_TREND_DOWN.to_string());
        }

        if trends.price_volatility > self.config.medium_risk_volatility {
            reasons.push(REASON_HIGH_VOLATILITY.to_string());
        }

        let ratio = self.config.imbalance_ratio;
        if current.demand > current.supply * ratio {
            reasons.push(REASON_DEMAND_HEAVY.to_string());
        } else if current.supply > current.demand * ratio {
            reasons.push(REASON_SUPPLY_HEAVY.to_string());
        }

        reasons
    }

    /// Assemble the recommendation from an already computed forecast
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        user_address: &str,
        current: &MarketSample,
        trends: &TrendSummary,
        forecast: &[ForecastPoint],
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> AdvisorResult<Recommendation> {
        current.validate()?;
        let prices: Vec<f64> = forecast.iter().map(|p| p.predicted_price).collect();
        let avg_predicted = mean(&prices).ok_or(AdvisorError::EmptyForecast)?;

        let current_price = current.price;
        let price_change = (avg_predicted - current_price) / current_price;

        let (action, confidence) = self.decide(price_change);
        let optimal_amount = self.size_position(action, rng);
        let risk_level = self.assess_risk(trends.price_volatility);
        let reasoning = self.reasoning(trends, current);

        debug!(
            "price_change={:.4} action={} confidence={:.2} amount={} risk={}",
            price_change, action, confidence, optimal_amount, risk_level
        );

        Ok(Recommendation {
            user_address: user_address.to_string(),
            recommended_action: action,
            confidence: round_to(confidence, 2),
            optimal_amount,
            current_price,
            predicted_price_24h: round_to(avg_predicted, PRICE_DECIMALS),
            price_change_percent: round_to(price_change * 100.0, 2),
            reasoning,
            risk_level,
            market_analysis: trends.clone(),
            predictions: forecast
                .iter()
                .take(self.config.published_points)
                .cloned()
                .collect(),
            timestamp,
        })
    }

    /// Forecast from `timestamp`'s hour, then decide
    pub fn forecast_and_recommend<R: Rng + ?Sized>(
        &self,
        user_address: &str,
        model: &FittedModel,
        current: &MarketSample,
        trends: &TrendSummary,
        timestamp: DateTime<Utc>,
        rng: &mut R,
    ) -> AdvisorResult<Recommendation> {
        let forecast = self.forecast(model, current, timestamp.hour(), rng)?;
        self.recommend(user_address, current, trends, &forecast, timestamp, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn snapshot(price: f64, demand: f64, supply: f64) -> MarketSample {
        let ts = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        MarketSample::new(ts, price, demand, supply).unwrap()
    }

    fn trends(slope: f64, volatility: f64) -> TrendSummary {
        TrendSummary {
            price_volatility: volatility,
            demand_volatility: 10.0,
            price_trend_slope: slope,
            current_price: 0.05,
            avg_price_24h: 0.05,
        }
    }

    fn flat_forecast(price: f64, n: usize) -> Vec<ForecastPoint> {
        (0..n)
            .map(|i| ForecastPoint {
                hour: i as u32 % 24,
                predicted_price: price,
                demand: 100.0,
                supply: 80.0,
            })
            .collect()
    }

    #[test]
    fn test_threshold_boundaries_hold() {
        let policy = RecommendationPolicy::default();
        assert_eq!(policy.decide(0.05), (TradeAction::Hold, 0.5));
        assert_eq!(policy.decide(-0.05), (TradeAction::Hold, 0.5));
        assert_eq!(policy.decide(0.0), (TradeAction::Hold, 0.5));
    }

    #[test]
    fn test_just_past_threshold_trades() {
        let policy = RecommendationPolicy::default();

        let (action, confidence) = policy.decide(0.0501);
        assert_eq!(action, TradeAction::Buy);
        assert!((confidence - 0.7002).abs() < 1e-12);

        let (action, _) = policy.decide(-0.0501);
        assert_eq!(action, TradeAction::Sell);
    }

    #[test]
    fn test_confidence_capped() {
        let policy = RecommendationPolicy::default();
        assert_eq!(policy.decide(10.0), (TradeAction::Buy, 0.95));
        assert_eq!(policy.decide(-10.0), (TradeAction::Sell, 0.95));
    }

    #[test]
    fn test_risk_tiers() {
        let policy = RecommendationPolicy::default();
        assert_eq!(policy.assess_risk(0.005), RiskLevel::Low);
        assert_eq!(policy.assess_risk(0.015), RiskLevel::Medium);
        assert_eq!(policy.assess_risk(0.03), RiskLevel::High);
        assert_eq!(policy.assess_risk(0.01), RiskLevel::Low);
        assert_eq!(policy.assess_risk(0.02), RiskLevel::Medium);
    }

    #[test]
    fn test_position_sizes() {
        let policy = RecommendationPolicy::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let buy = policy.size_position(TradeAction::Buy, &mut rng);
            assert!((50..=200).contains(&buy));
            let sell = policy.size_position(TradeAction::Sell, &mut rng);
            assert!((30..=150).contains(&sell));
        }
        assert_eq!(policy.size_position(TradeAction::Hold, &mut rng), 0);
    }

    #[test]
    fn test_reasoning_clauses() {
        let policy = RecommendationPolicy::default();

        let reasons = policy.reasoning(&trends(0.0001, 0.02), &snapshot(0.05, 130.0, 100.0));
        assert_eq!(
            reasons,
            vec![REASON_TREND_UP, REASON_HIGH_VOLATILITY, REASON_DEMAND_HEAVY]
        );

        let reasons = policy.reasoning(&trends(-0.0001, 0.001), &snapshot(0.05, 50.0, 80.0));
        assert_eq!(reasons, vec![REASON_TREND_DOWN, REASON_SUPPLY_HEAVY]);

        let reasons = policy.reasoning(&trends(0.0, 0.01), &snapshot(0.05, 100.0, 90.0));
        assert!(reasons.is_empty());
    }

    #[test]
    fn test_recommend_buy_and_truncation() {
        let policy = RecommendationPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();

        let rec = policy
            .recommend(
                "0xabc",
                &snapshot(0.05, 100.0, 80.0),
                &trends(0.0, 0.005),
                &flat_forecast(0.06, 24),
                now,
                &mut rng,
            )
            .unwrap();

        assert_eq!(rec.recommended_action, TradeAction::Buy);
        // change = 20% -> 0.6 + 0.4
        assert_eq!(rec.confidence, 0.95);
        assert_eq!(rec.price_change_percent, 20.0);
        assert_eq!(rec.predicted_price_24h, 0.06);
        assert_eq!(rec.predictions.len(), 6);
        assert_eq!(rec.risk_level, RiskLevel::Low);
        assert!((50..=200).contains(&rec.optimal_amount));
        assert_eq!(rec.timestamp, now);
    }

    #[test]
    fn test_recommend_hold() {
        let policy = RecommendationPolicy::default();
        let mut rng = StdRng::seed_from_u64(1);
        let rec = policy
            .recommend(
                "0xabc",
                &snapshot(0.05, 100.0, 80.0),
                &trends(0.0, 0.015),
                &flat_forecast(0.051, 24),
                Utc::now(),
                &mut rng,
            )
            .unwrap();
        assert_eq!(rec.recommended_action, TradeAction::Hold);
        assert_eq!(rec.confidence, 0.5);
        assert_eq!(rec.optimal_amount, 0);
        assert_eq!(rec.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_recommend_empty_forecast() {
        let policy = RecommendationPolicy::default();
        let err = policy
            .recommend(
                "0xabc",
                &snapshot(0.05, 100.0, 80.0),
                &trends(0.0, 0.0),
                &[],
                Utc::now(),
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap_err();
        assert_eq!(err, AdvisorError::EmptyForecast);
    }

    #[test]
    fn test_forecast_covers_full_horizon_with_bounded_jitter() {
        use crate::data::SyntheticSeriesGenerator;
        use crate::model::{PriceForecastModel, PRICE_FLOOR};

        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let samples = SyntheticSeriesGenerator::default()
            .generate_until(10, end, &mut StdRng::seed_from_u64(4))
            .unwrap();
        let model = PriceForecastModel::train(&samples).unwrap();

        let policy = RecommendationPolicy::default();
        let current = snapshot(0.05, 100.0, 80.0);
        let points = policy
            .forecast(&model, &current, 20, &mut StdRng::seed_from_u64(12))
            .unwrap();

        assert_eq!(points.len(), 24);
        let hours: Vec<u32> = points.iter().map(|p| p.hour).collect();
        let expected: Vec<u32> = (20..24).chain(0..20).collect();
        assert_eq!(hours, expected);

        for point in &points {
            assert!(point.demand >= 90.0 - 0.005 && point.demand <= 110.0 + 0.005);
            assert!(point.supply >= 72.0 - 0.005 && point.supply <= 88.0 + 0.005);
            assert!(point.predicted_price >= PRICE_FLOOR);
        }
        // Demand and supply are drawn independently
        assert!(points.iter().any(|p| (p.demand / 100.0 - p.supply / 80.0).abs() > 1e-3));
    }

    #[test]
    fn test_recommend_rejects_non_positive_price() {
        let policy = RecommendationPolicy::default();
        let mut current = snapshot(0.05, 100.0, 80.0);
        current.price = 0.0;

        let err = policy
            .recommend(
                "0xabc",
                &current,
                &trends(0.0, 0.0),
                &flat_forecast(0.05, 24),
                Utc::now(),
                &mut StdRng::seed_from_u64(1),
            )
            .unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidSample(_)));
    }

    #[test]
    fn test_invalid_policy_config_is_rejected() {
        let config = PolicyConfig {
            horizon_hours: 0,
            ..PolicyConfig::default()
        };
        assert!(matches!(
            RecommendationPolicy::new(config),
            Err(AdvisorError::InvalidConfig(_))
        ));
    }
}
