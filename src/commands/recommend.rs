//! Recommend command implementation

use anyhow::{Context, Result};
use energy_trade_advisor::delivery::{self, ApiClient, DeliveryOutcome};
use energy_trade_advisor::{data, AdvisorConfig, Recommendation, TradeAdvisor};
use tracing::{debug, info, warn};

pub struct RecommendArgs {
    pub config_path: String,
    pub user: String,
    pub days: Option<u32>,
    pub seed: Option<u64>,
    pub history: Option<String>,
    pub send: bool,
    pub save: bool,
}

pub fn run(args: RecommendArgs) -> Result<()> {
    info!("Starting AI trade suggestions");

    let mut config = AdvisorConfig::load_or_default(&args.config_path)?;
    info!("Loaded configuration from: {}", args.config_path);

    if let Some(days) = args.days {
        info!("Overriding history length to: {} days", days);
        config.generator.days = days;
    }
    if let Some(seed) = args.seed {
        info!("Overriding seed to: {}", seed);
        config.seed = Some(seed);
    }

    let mut advisor = TradeAdvisor::new(&config)?;

    let market_data = match &args.history {
        Some(path) => {
            info!("Loading market history from: {}", path);
            data::load_csv(path)?
        }
        None => {
            info!("Generating {} days of market data", config.generator.days);
            advisor.generate_market_data(config.generator.days)?
        }
    };
    debug!("Market series has {} samples", market_data.len());

    info!("Training price model");
    let accuracy = advisor.train(&market_data).context("Failed to train price model")?;
    info!("Model accuracy (in-sample R²): {:.3}", accuracy);

    info!("Generating suggestions for {}", args.user);
    let suggestions = advisor
        .generate_trade_suggestions(&args.user, &market_data)
        .context("Failed to generate trade suggestions")?;

    print_recommendation(&suggestions);

    if args.save && config.output.save_results {
        let path = delivery::save_recommendation(&config.output.results_dir, &suggestions)?;
        println!("Suggestions saved to {}", path.display());
    }

    if args.send {
        let client = ApiClient::new(&config.delivery)?;
        match client.send_recommendation(&suggestions) {
            Ok(DeliveryOutcome::Delivered) => println!("AI suggestions sent to API successfully"),
            Ok(DeliveryOutcome::Rejected(status)) => println!("API request failed: {}", status),
            Err(e) => {
                warn!("Error connecting to API: {:#}", e);
                println!("Error connecting to API: {:#}", e);
            }
        }
    }

    info!("AI analysis completed");
    Ok(())
}

fn print_recommendation(rec: &Recommendation) {
    println!("\n{}", "=".repeat(60));
    println!("AI TRADE RECOMMENDATION");
    println!("{}", "=".repeat(60));
    println!("Action:             {}", rec.recommended_action.to_string().to_uppercase());
    println!("Confidence:         {:.1}%", rec.confidence * 100.0);
    println!("Optimal Amount:     {} ET", rec.optimal_amount);
    println!("Current Price:      {} ETH", rec.current_price);
    println!("Predicted (24h):    {} ETH", rec.predicted_price_24h);
    println!("Expected Change:    {:+.2}%", rec.price_change_percent);
    println!("Risk Level:         {}", rec.risk_level.to_string().to_uppercase());
    println!("{}", "-".repeat(60));
    println!("Volatility:         {}", rec.market_analysis.price_volatility);
    println!("Trend Slope:        {}", rec.market_analysis.price_trend_slope);
    println!("24h Average:        {} ETH", rec.market_analysis.avg_price_24h);
    println!("{}", "-".repeat(60));
    println!("Reasoning:");
    for reason in &rec.reasoning {
        println!("  - {}", reason);
    }
    println!("Next hours:");
    for point in &rec.predictions {
        println!("  {:02}:00  {:.4} ETH", point.hour, point.predicted_price);
    }
    println!("{}", "=".repeat(60));
}
