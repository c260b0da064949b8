//! Energy generation simulation
//!
//! Fabricates hourly solar and wind output for a prosumer site. Solar follows
//! a daylight triangle peaking at noon scaled by a random weather draw; wind
//! is strongest overnight.

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::VOLUME_DECIMALS;
use crate::indicators::round_to;

const SOLAR_CAPACITY_KW: f64 = 5.0;
const WIND_CAPACITY_KW: f64 = 3.0;
const SOLAR_JITTER: f64 = 0.2;
const WIND_JITTER: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    PartlyCloudy,
    Cloudy,
    Rainy,
}

impl Weather {
    /// (weather, probability) table used for the daily draw
    pub const DISTRIBUTION: [(Weather, f64); 4] = [
        (Weather::Sunny, 0.4),
        (Weather::PartlyCloudy, 0.3),
        (Weather::Cloudy, 0.2),
        (Weather::Rainy, 0.1),
    ];

    pub fn solar_factor(self) -> f64 {
        match self {
            Weather::Sunny => 1.0,
            Weather::PartlyCloudy => 0.7,
            Weather::Cloudy => 0.4,
            Weather::Rainy => 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyReading {
    pub timestamp: DateTime<Utc>,
    pub solar_generation: f64,
    pub wind_generation: f64,
    pub total_generation: f64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySummary {
    pub hours: usize,
    pub total_solar: f64,
    pub total_wind: f64,
    pub total_generation: f64,
    /// Mean output per simulated hour, in kW
    pub average_generation: f64,
    pub peak_hour: Option<DateTime<Utc>>,
    pub peak_generation: f64,
}

impl EnergySummary {
    pub fn from_readings(readings: &[EnergyReading]) -> Self {
        let peak = readings
            .iter()
            .max_by(|a, b| a.total_generation.total_cmp(&b.total_generation));
        let total: f64 = readings.iter().map(|r| r.total_generation).sum();
        let average = if readings.is_empty() {
            0.0
        } else {
            total / readings.len() as f64
        };

        Self {
            hours: readings.len(),
            total_solar: round_to(readings.iter().map(|r| r.solar_generation).sum(), VOLUME_DECIMALS),
            total_wind: round_to(readings.iter().map(|r| r.wind_generation).sum(), VOLUME_DECIMALS),
            total_generation: round_to(total, VOLUME_DECIMALS),
            average_generation: round_to(average, VOLUME_DECIMALS),
            peak_hour: peak.map(|r| r.timestamp),
            peak_generation: peak.map(|r| r.total_generation).unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnergyGenerator {
    pub location: String,
    pub equipment_efficiency: f64,
}

impl Default for EnergyGenerator {
    fn default() -> Self {
        Self {
            location: "Mumbai, India".to_string(),
            equipment_efficiency: 0.85,
        }
    }
}

impl EnergyGenerator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn draw_weather<R: Rng + ?Sized>(rng: &mut R) -> Weather {
        Weather::DISTRIBUTION
            .choose_weighted(rng, |(_, weight)| *weight)
            .map(|(weather, _)| *weather)
            .unwrap_or(Weather::Sunny)
    }

    /// Daylight triangle: 0 outside 06:00–18:00, 1.0 at noon
    pub fn solar_time_factor(hour: u32) -> f64 {
        if (6..=18).contains(&hour) {
            let distance = (hour as f64 - 12.0).abs();
            (1.0 - distance / 6.0).max(0.0)
        } else {
            0.0
        }
    }

    pub fn wind_factor(hour: u32) -> f64 {
        match hour {
            h if h >= 22 || h <= 6 => 0.8,
            7..=9 | 18..=21 => 0.6,
            _ => 0.4,
        }
    }

    pub fn solar_output<R: Rng + ?Sized>(&self, hour: u32, weather: Weather, rng: &mut R) -> f64 {
        let base = SOLAR_CAPACITY_KW
            * Self::solar_time_factor(hour)
            * weather.solar_factor()
            * self.equipment_efficiency;
        let jittered = base + rng.random_range(-SOLAR_JITTER..=SOLAR_JITTER);
        round_to(jittered.max(0.0), VOLUME_DECIMALS)
    }

    pub fn wind_output<R: Rng + ?Sized>(&self, hour: u32, rng: &mut R) -> f64 {
        let base = WIND_CAPACITY_KW * Self::wind_factor(hour) * self.equipment_efficiency;
        let jittered = base + rng.random_range(-WIND_JITTER..=WIND_JITTER);
        round_to(jittered.max(0.0), VOLUME_DECIMALS)
    }

    /// Hourly readings starting at `start`, with fresh weather each hour
    pub fn generate<R: Rng + ?Sized>(
        &self,
        hours: usize,
        start: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<EnergyReading> {
        let readings: Vec<EnergyReading> = (0..hours)
            .map(|i| {
                let timestamp = start + Duration::hours(i as i64);
                let hour = timestamp.hour();
                let weather = Self::draw_weather(rng);
                let solar = self.solar_output(hour, weather, rng);
                let wind = self.wind_output(hour, rng);

                EnergyReading {
                    timestamp,
                    solar_generation: solar,
                    wind_generation: wind,
                    total_generation: round_to(solar + wind, VOLUME_DECIMALS),
                    location: self.location.clone(),
                }
            })
            .collect();

        debug!("Generated {} energy readings for {}", readings.len(), self.location);
        readings
    }
}
