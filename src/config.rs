//! Configuration management
//!
//! Handles loading of the JSON advisor configuration with environment
//! variable overrides for the delivery endpoint and random seed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::GeneratorConfig;
use crate::policy::PolicyConfig;

pub const ENV_API_URL: &str = "ADVISOR_API_URL";
pub const ENV_SEED: &str = "ADVISOR_SEED";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvisorConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Fixed RNG seed for reproducible runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl AdvisorConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let mut config: AdvisorConfig =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::from_file(path);
        }
        let mut config = AdvisorConfig::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var(ENV_API_URL) {
            self.delivery.api_url = url;
        }
        if let Ok(seed) = std::env::var(ENV_SEED) {
            let seed = seed
                .parse::<u64>()
                .with_context(|| format!("{} must be an unsigned integer, got {:?}", ENV_SEED, seed))?;
            self.seed = Some(seed);
        }
        Ok(())
    }

    /// Reject settings that would make generation or sizing ill-defined
    pub fn validate(&self) -> Result<()> {
        self.generator.validate()?;
        self.policy.validate()?;
        anyhow::ensure!(
            self.delivery.timeout_secs > 0,
            "delivery.timeout_secs must be positive"
        );
        Ok(())
    }
}

/// Backend API delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Base URL; the user address is appended as the last path segment
    pub api_url: String,
    /// Energy simulation endpoint
    #[serde(default = "default_energy_url")]
    pub energy_url: String,
    pub timeout_secs: u64,
}

fn default_energy_url() -> String {
    "http://localhost:5000/api/energy/simulate".to_string()
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        DeliveryConfig {
            api_url: "http://localhost:5000/api/ai/suggestions".to_string(),
            energy_url: default_energy_url(),
            timeout_secs: 10,
        }
    }
}

/// Result file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub results_dir: String,
    #[serde(default = "default_save_results")]
    pub save_results: bool,
}

fn default_save_results() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            results_dir: "results".to_string(),
            save_results: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AdvisorConfig = serde_json::from_str(
            r#"{ "policy": { "buy_threshold": 0.08 }, "seed": 7 }"#,
        )
        .unwrap();

        assert_eq!(config.policy.buy_threshold, 0.08);
        assert_eq!(config.policy.sell_threshold, 0.05);
        assert_eq!(config.generator.days, 30);
        assert_eq!(config.delivery.timeout_secs, 10);
        assert_eq!(config.seed, Some(7));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_noise() {
        let mut config = AdvisorConfig::default();
        config.generator.noise_low = 1.1;
        config.generator.noise_high = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_risk_tiers() {
        let mut config = AdvisorConfig::default();
        config.policy.high_risk_volatility = 0.005;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let tmp = std::env::temp_dir().join("energy_trade_advisor_config_test.json");
        fs::write(&tmp, r#"{ "output": { "results_dir": "out" } }"#).unwrap();
        let config = AdvisorConfig::from_file(&tmp).unwrap();
        fs::remove_file(&tmp).ok();

        assert_eq!(config.output.results_dir, "out");
        assert!(config.output.save_results);
    }
}
