//! Trade advisor
//!
//! Owns the random source and the trained model for one pipeline run:
//! generate → train → analyze → forecast → recommend.
//!
//! An advisor is not synchronized. Concurrent callers should each use their
//! own instance.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::analysis::TrendAnalyzer;
use crate::config::AdvisorConfig;
use crate::data::SyntheticSeriesGenerator;
use crate::error::{AdvisorError, AdvisorResult};
use crate::model::{FittedModel, PriceForecastModel};
use crate::policy::RecommendationPolicy;
use crate::{FeatureVector, MarketSample, Recommendation, TrendSummary};

pub struct TradeAdvisor {
    generator: SyntheticSeriesGenerator,
    analyzer: TrendAnalyzer,
    policy: RecommendationPolicy,
    rng: StdRng,
    model: Option<FittedModel>,
}

impl TradeAdvisor {
    /// Build from config. Uses `config.seed` when set, OS entropy otherwise.
    pub fn new(config: &AdvisorConfig) -> AdvisorResult<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &AdvisorConfig, rng: StdRng) -> AdvisorResult<Self> {
        Ok(Self {
            generator: SyntheticSeriesGenerator::new(config.generator.clone())?,
            analyzer: TrendAnalyzer::default(),
            policy: RecommendationPolicy::new(config.policy.clone())?,
            rng,
            model: None,
        })
    }

    /// Default configuration with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            generator: SyntheticSeriesGenerator::default(),
            analyzer: TrendAnalyzer::default(),
            policy: RecommendationPolicy::default(),
            rng: StdRng::seed_from_u64(seed),
            model: None,
        }
    }

    pub fn generate_market_data(&mut self, days: u32) -> AdvisorResult<Vec<MarketSample>> {
        self.generator.generate(days, &mut self.rng)
    }

    pub fn generate_market_data_until(
        &mut self,
        days: u32,
        end: DateTime<Utc>,
    ) -> AdvisorResult<Vec<MarketSample>> {
        self.generator.generate_until(days, end, &mut self.rng)
    }

    /// Train on `samples`, replacing any previous model. Returns in-sample R².
    pub fn train(&mut self, samples: &[MarketSample]) -> AdvisorResult<f64> {
        let model = PriceForecastModel::train(samples)?;
        let score = model.r_squared();
        self.model = Some(model);
        Ok(score)
    }

    pub fn model(&self) -> Option<&FittedModel> {
        self.model.as_ref()
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    pub fn predict_price(&self, hour: u32, demand: f64, supply: f64) -> AdvisorResult<f64> {
        let model = self.model.as_ref().ok_or(AdvisorError::ModelNotTrained)?;
        model.predict(FeatureVector::new(hour, demand, supply))
    }

    pub fn analyze_market_trends(&self, samples: &[MarketSample]) -> AdvisorResult<TrendSummary> {
        self.analyzer.analyze(samples)
    }

    /// Recommendation as of now
    pub fn generate_trade_suggestions(
        &mut self,
        user_address: &str,
        samples: &[MarketSample],
    ) -> AdvisorResult<Recommendation> {
        self.generate_trade_suggestions_at(user_address, samples, Utc::now())
    }

    /// Recommendation as of `as_of`; the forecast starts at its hour
    pub fn generate_trade_suggestions_at(
        &mut self,
        user_address: &str,
        samples: &[MarketSample],
        as_of: DateTime<Utc>,
    ) -> AdvisorResult<Recommendation> {
        let model = self.model.as_ref().ok_or(AdvisorError::ModelNotTrained)?;
        let current = samples.last().ok_or(AdvisorError::InsufficientHistory {
            required: self.analyzer.window(),
            actual: 0,
        })?;

        let trends = self.analyzer.analyze(samples)?;
        let recommendation = self.policy.forecast_and_recommend(
            user_address,
            model,
            current,
            &trends,
            as_of,
            &mut self.rng,
        )?;

        info!(
            "Recommendation for {}: {} ({:.0}% confidence, risk {})",
            user_address,
            recommendation.recommended_action,
            recommendation.confidence * 100.0,
            recommendation.risk_level
        );

        Ok(recommendation)
    }
}
