//! Generate command implementation

use anyhow::Result;
use energy_trade_advisor::{data, AdvisorConfig, TradeAdvisor};
use tracing::info;

pub fn run(
    config_path: String,
    days_override: Option<u32>,
    seed_override: Option<u64>,
    output: String,
) -> Result<()> {
    let mut config = AdvisorConfig::load_or_default(&config_path)?;
    if let Some(seed) = seed_override {
        config.seed = Some(seed);
    }
    let days = days_override.unwrap_or(config.generator.days);

    info!("Generating {} days of market data", days);
    let mut advisor = TradeAdvisor::new(&config)?;
    let samples = advisor.generate_market_data(days)?;

    data::save_csv(&output, &samples)?;
    println!("Wrote {} hourly samples to {}", samples.len(), output);

    Ok(())
}
