//! Result delivery and persistence
//!
//! Posts finished recommendations and energy readings to the backend API and
//! writes both to timestamped JSON files. Payloads are only ever borrowed; a
//! failed delivery leaves the recommendation untouched.

use anyhow::{Context, Result};
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DeliveryConfig;
use crate::energy::EnergyReading;
use crate::Recommendation;

/// What the backend did with a payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Rejected(u16),
}

/// Blocking HTTP client for the backend API
pub struct ApiClient {
    client: reqwest::blocking::Client,
    api_url: String,
    energy_url: String,
}

#[derive(Debug, Serialize)]
struct EnergyPayload<'a> {
    address: &'a str,
    duration: usize,
    data: &'a [EnergyReading],
}

impl ApiClient {
    pub fn new(config: &DeliveryConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            energy_url: config.energy_url.clone(),
        })
    }

    /// Endpoint a recommendation for `user_address` is posted to
    pub fn suggestions_url(&self, user_address: &str) -> String {
        format!("{}/{}", self.api_url, user_address)
    }

    pub fn send_recommendation(&self, recommendation: &Recommendation) -> Result<DeliveryOutcome> {
        let url = self.suggestions_url(&recommendation.user_address);
        self.post_json(&url, recommendation)
    }

    pub fn send_energy_data(&self, address: &str, readings: &[EnergyReading]) -> Result<DeliveryOutcome> {
        let payload = EnergyPayload {
            address,
            duration: readings.len(),
            data: readings,
        };
        self.post_json(&self.energy_url, &payload)
    }

    fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<DeliveryOutcome> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .with_context(|| format!("Failed to reach {}", url))?;

        let status = response.status();
        if status.is_success() {
            info!("Delivered payload to {}", url);
            Ok(DeliveryOutcome::Delivered)
        } else {
            warn!("API request to {} failed: {}", url, status);
            Ok(DeliveryOutcome::Rejected(status.as_u16()))
        }
    }
}

/// File name for a recommendation saved now: `ai_suggestions_YYYYmmdd_HHMMSS.json`
pub fn results_file_name() -> String {
    format!("ai_suggestions_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// File name for energy readings saved now: `energy_data_YYYYmmdd_HHMMSS.json`
pub fn energy_file_name() -> String {
    format!("energy_data_{}.json", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write the recommendation as pretty JSON into `dir` and return the path
pub fn save_recommendation(dir: impl AsRef<Path>, recommendation: &Recommendation) -> Result<PathBuf> {
    let path = write_json(dir.as_ref(), &results_file_name(), recommendation)?;
    info!("Recommendation saved to {}", path.display());
    Ok(path)
}

/// Write energy readings as a pretty JSON array into `dir` and return the path
pub fn save_energy_data(dir: impl AsRef<Path>, readings: &[EnergyReading]) -> Result<PathBuf> {
    let path = write_json(dir.as_ref(), &energy_file_name(), readings)?;
    info!("Saved {} energy readings to {}", readings.len(), path.display());
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(dir: &Path, file_name: &str, value: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

    let path = dir.join(file_name);
    let json = serde_json::to_string_pretty(value).context("Failed to serialize results")?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
