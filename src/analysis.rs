//! Market trend analysis
//!
//! Rolling averages, volatility and short-horizon trend slope over a market
//! series. Results are rounded for display stability and the policy reads
//! the rounded values.

use tracing::debug;

use crate::data::{PRICE_DECIMALS, VOLUME_DECIMALS};
use crate::error::{AdvisorError, AdvisorResult};
use crate::indicators::{linear_slope, population_std_dev, round_to, sma};
use crate::{MarketSample, TrendSummary};

pub const DEFAULT_WINDOW: usize = 24;
const SLOPE_DECIMALS: u32 = 6;

/// Rolling means of price and demand, aligned with the input series
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAverages {
    pub price: Vec<Option<f64>>,
    pub demand: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    window: usize,
}

/// Smallest window that still yields a slope
pub const MIN_WINDOW: usize = 2;

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

impl TrendAnalyzer {
    pub fn new(window: usize) -> AdvisorResult<Self> {
        if window < MIN_WINDOW {
            return Err(AdvisorError::InvalidConfig(format!(
                "trend window must be at least {MIN_WINDOW} hours, got {window}"
            )));
        }
        Ok(Self { window })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn rolling_averages(&self, samples: &[MarketSample]) -> RollingAverages {
        let prices: Vec<f64> = samples.iter().map(|s| s.price).collect();
        let demand: Vec<f64> = samples.iter().map(|s| s.demand).collect();
        RollingAverages {
            price: sma(&prices, self.window),
            demand: sma(&demand, self.window),
        }
    }

    pub fn analyze(&self, samples: &[MarketSample]) -> AdvisorResult<TrendSummary> {
        if samples.len() < self.window {
            return Err(AdvisorError::InsufficientHistory {
                required: self.window,
                actual: samples.len(),
            });
        }

        let prices: Vec<f64> = samples.iter().map(|s| s.price).collect();
        let demand: Vec<f64> = samples.iter().map(|s| s.demand).collect();
        let rolling = self.rolling_averages(samples);

        let insufficient = || AdvisorError::InsufficientHistory {
            required: self.window,
            actual: samples.len(),
        };

        let price_volatility = population_std_dev(&prices).ok_or_else(insufficient)?;
        let demand_volatility = population_std_dev(&demand).ok_or_else(insufficient)?;
        let slope = linear_slope(&prices[prices.len() - self.window..]).unwrap_or(0.0);
        let current_price = *prices.last().ok_or_else(insufficient)?;
        let avg_price = rolling
            .price
            .last()
            .copied()
            .flatten()
            .ok_or_else(insufficient)?;

        let summary = TrendSummary {
            price_volatility: round_to(price_volatility, PRICE_DECIMALS),
            demand_volatility: round_to(demand_volatility, VOLUME_DECIMALS),
            price_trend_slope: round_to(slope, SLOPE_DECIMALS),
            current_price: round_to(current_price, PRICE_DECIMALS),
            avg_price_24h: round_to(avg_price, PRICE_DECIMALS),
        };

        debug!("Trend summary: {:?}", summary);
        Ok(summary)
    }
}
