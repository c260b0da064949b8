//! Energy Trade Advisor
//!
//! Forecasting and recommendation engine for a tokenized energy-trading
//! simulation: fabricates hourly market history, fits a linear price model,
//! analyzes trend and volatility, and emits buy/sell/hold recommendations.

pub mod advisor;
pub mod analysis;
pub mod config;
pub mod data;
pub mod delivery;
pub mod energy;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod model;
pub mod policy;
pub mod types;

pub use advisor::TradeAdvisor;
pub use config::AdvisorConfig;
pub use error::{AdvisorError, AdvisorResult};
pub use types::*;
