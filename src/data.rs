//! Market data generation and CSV storage
//!
//! Fabricates the hourly price/demand/supply history the forecaster trains
//! on, and moves such series in and out of CSV files.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::round_to;
use crate::MarketSample;

pub const PRICE_DECIMALS: u32 = 4;
pub const VOLUME_DECIMALS: u32 = 2;

/// Smallest price that survives rounding to [`PRICE_DECIMALS`]
const MIN_GENERATED_PRICE: f64 = 1e-4;

/// Shape of the synthetic market
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Days of hourly history to fabricate (default: 30)
    #[serde(default = "default_days")]
    pub days: u32,

    /// Base token price in ETH (default: 0.05)
    #[serde(default = "default_base_price")]
    pub base_price: f64,

    /// Base demand (default: 100)
    #[serde(default = "default_base_demand")]
    pub base_demand: f64,

    /// Base supply (default: 80)
    #[serde(default = "default_base_supply")]
    pub base_supply: f64,

    /// Diurnal price swing around 1.0 (default: 0.10)
    #[serde(default = "default_price_amplitude")]
    pub price_amplitude: f64,

    /// Diurnal demand swing around 1.0 (default: 0.20)
    #[serde(default = "default_demand_amplitude")]
    pub demand_amplitude: f64,

    /// Diurnal supply swing around 1.0 (default: 0.15)
    #[serde(default = "default_supply_amplitude")]
    pub supply_amplitude: f64,

    /// Lower bound of the shared multiplicative noise (default: 0.95)
    #[serde(default = "default_noise_low")]
    pub noise_low: f64,

    /// Upper bound of the shared multiplicative noise (default: 1.05)
    #[serde(default = "default_noise_high")]
    pub noise_high: f64,
}

fn default_days() -> u32 {
    30
}
fn default_base_price() -> f64 {
    0.05
}
fn default_base_demand() -> f64 {
    100.0
}
fn default_base_supply() -> f64 {
    80.0
}
fn default_price_amplitude() -> f64 {
    0.10
}
fn default_demand_amplitude() -> f64 {
    0.20
}
fn default_supply_amplitude() -> f64 {
    0.15
}
fn default_noise_low() -> f64 {
    0.95
}
fn default_noise_high() -> f64 {
    1.05
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            days: default_days(),
            base_price: default_base_price(),
            base_demand: default_base_demand(),
            base_supply: default_base_supply(),
            price_amplitude: default_price_amplitude(),
            demand_amplitude: default_demand_amplitude(),
            supply_amplitude: default_supply_amplitude(),
            noise_low: default_noise_low(),
            noise_high: default_noise_high(),
        }
    }
}

impl GeneratorConfig {
    /// Reject shapes that could produce non-positive prices or negative volumes
    pub fn validate(&self) -> AdvisorResult<()> {
        let invalid = |msg: &str| Err(AdvisorError::InvalidConfig(format!("generator: {}", msg)));

        if !(self.noise_low > 0.0 && self.noise_low <= self.noise_high) {
            return invalid("noise bounds must satisfy 0 < noise_low <= noise_high");
        }
        if !(self.price_amplitude.abs() < 1.0) {
            return invalid("price_amplitude must be below 1.0");
        }
        if !(self.demand_amplitude.abs() <= 1.0 && self.supply_amplitude.abs() <= 1.0) {
            return invalid("demand and supply amplitudes must be at most 1.0");
        }
        if !(self.base_demand >= 0.0 && self.base_supply >= 0.0) {
            return invalid("base_demand and base_supply must be >= 0");
        }
        let lowest_price = self.base_price * (1.0 - self.price_amplitude.abs()) * self.noise_low;
        if !(lowest_price >= MIN_GENERATED_PRICE) {
            return invalid("base_price is too small to stay positive after rounding");
        }
        Ok(())
    }
}

/// Diurnal multipliers for one hour of the day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiurnalFactors {
    pub price: f64,
    pub demand: f64,
    pub supply: f64,
}

/// Fabricates hourly market history with daily cycles and correlated noise
#[derive(Debug, Clone, Default)]
pub struct SyntheticSeriesGenerator {
    config: GeneratorConfig,
}

impl SyntheticSeriesGenerator {
    pub fn new(config: GeneratorConfig) -> AdvisorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Price, demand and supply multipliers for an hour of the day.
    ///
    /// Each series has its own phase: price peaks at 06:00, demand at 03:00
    /// and supply at midnight.
    pub fn diurnal_factors(&self, hour: u32) -> DiurnalFactors {
        let angle = 2.0 * PI * hour as f64 / 24.0;
        DiurnalFactors {
            price: 1.0 + self.config.price_amplitude * angle.sin(),
            demand: 1.0 + self.config.demand_amplitude * (angle + PI / 4.0).sin(),
            supply: 1.0 + self.config.supply_amplitude * angle.cos(),
        }
    }

    /// Generate `days * 24` hourly samples ending now
    pub fn generate<R: Rng + ?Sized>(
        &self,
        days: u32,
        rng: &mut R,
    ) -> AdvisorResult<Vec<MarketSample>> {
        self.generate_until(days, Utc::now(), rng)
    }

    /// Generate `days * 24` hourly samples; the last one is an hour before `end`
    pub fn generate_until<R: Rng + ?Sized>(
        &self,
        days: u32,
        end: DateTime<Utc>,
        rng: &mut R,
    ) -> AdvisorResult<Vec<MarketSample>> {
        let count = days as usize * 24;
        let mut samples = Vec::with_capacity(count);

        for i in 0..count {
            let timestamp = end - Duration::hours((count - i) as i64);
            let hour = timestamp.hour();
            let factors = self.diurnal_factors(hour);

            // One draw per hour, shared by all three series
            let noise = rng.random_range(self.config.noise_low..=self.config.noise_high);

            samples.push(MarketSample::new(
                timestamp,
                round_to(self.config.base_price * factors.price * noise, PRICE_DECIMALS),
                round_to(self.config.base_demand * factors.demand * noise, VOLUME_DECIMALS),
                round_to(self.config.base_supply * factors.supply * noise, VOLUME_DECIMALS),
            )?);
        }

        debug!(
            "Generated {} samples from {} to {}",
            samples.len(),
            samples.first().map(|s| s.timestamp.to_rfc3339()).unwrap_or_default(),
            samples.last().map(|s| s.timestamp.to_rfc3339()).unwrap_or_default()
        );

        Ok(samples)
    }
}

// =============================================================================
// CSV Storage
// =============================================================================

/// Write a market series to CSV (`timestamp,price,demand,supply,hour`)
pub fn save_csv(path: impl AsRef<Path>, samples: &[MarketSample]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path).context("Failed to create CSV file")?;
    for sample in samples {
        writer.serialize(sample).context("Failed to write CSV row")?;
    }
    writer.flush().context("Failed to flush CSV file")?;

    info!("Saved {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Load a market series from CSV, validating every row
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<MarketSample>> {
    let mut reader = csv::Reader::from_path(path.as_ref()).context("Failed to open CSV file")?;

    let mut samples = Vec::new();
    for (row_idx, result) in reader.deserialize().enumerate() {
        let sample: MarketSample =
            result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        sample
            .validate()
            .with_context(|| format!("Invalid sample in row {}", row_idx + 1))?;
        samples.push(sample);
    }

    if samples.is_empty() {
        anyhow::bail!("No samples found in {}", path.as_ref().display());
    }

    info!("Loaded {} samples from {}", samples.len(), path.as_ref().display());
    Ok(samples)
}
