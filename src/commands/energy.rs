//! Energy simulation command implementation

use anyhow::Result;
use chrono::Utc;
use energy_trade_advisor::delivery::{self, ApiClient, DeliveryOutcome};
use energy_trade_advisor::energy::{EnergyGenerator, EnergySummary};
use energy_trade_advisor::AdvisorConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

pub fn run(
    config_path: String,
    hours: usize,
    location: String,
    address: String,
    seed: Option<u64>,
    send: bool,
) -> Result<()> {
    let config = AdvisorConfig::load_or_default(&config_path)?;

    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!("Simulating {} hours of generation for {}", hours, location);
    let generator = EnergyGenerator::new(location);
    let readings = generator.generate(hours, Utc::now(), &mut rng);
    let summary = EnergySummary::from_readings(&readings);

    println!("\n{}", "=".repeat(60));
    println!("GENERATION SUMMARY ({})", generator.location);
    println!("{}", "=".repeat(60));
    println!("Hours:              {}", summary.hours);
    println!("Solar:              {:.2} kWh", summary.total_solar);
    println!("Wind:               {:.2} kWh", summary.total_wind);
    println!("Total:              {:.2} kWh", summary.total_generation);
    println!("Average:            {:.2} kW", summary.average_generation);
    if let Some(peak) = summary.peak_hour {
        println!(
            "Peak:               {:.2} kW at {}",
            summary.peak_generation,
            peak.format("%Y-%m-%d %H:00")
        );
    }
    println!("{}", "=".repeat(60));

    if config.output.save_results {
        let path = delivery::save_energy_data(&config.output.results_dir, &readings)?;
        println!("Data saved to {}", path.display());
    }

    if send {
        let client = ApiClient::new(&config.delivery)?;
        match client.send_energy_data(&address, &readings) {
            Ok(DeliveryOutcome::Delivered) => {
                println!("Sent {} data points to API", readings.len())
            }
            Ok(DeliveryOutcome::Rejected(status)) => println!("API request failed: {}", status),
            Err(e) => {
                warn!("Error connecting to API: {:#}", e);
                println!("Error connecting to API: {:#}", e);
            }
        }
    }

    Ok(())
}
