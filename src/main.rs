//! Energy trade advisor - main entry point
//!
//! This binary provides three subcommands:
//! - recommend: Train on market history and print a trade recommendation
//! - generate: Write a synthetic market series to CSV
//! - energy: Run the solar/wind generation simulation

use anyhow::Result;
use clap::{Parser, Subcommand};
use energy_trade_advisor::logging::{self, LogSettings};
use tracing::debug;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "energy-trade-advisor")]
#[command(about = "Synthetic energy-token market forecasting and trade recommendations", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log to the console only
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train the price model and generate a recommendation
    Recommend {
        /// Path to configuration file (defaults are used if missing)
        #[arg(short, long, default_value = "configs/advisor.json")]
        config: String,

        /// Wallet address the recommendation is for
        #[arg(short, long, default_value = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6")]
        user: String,

        /// Days of synthetic history (overrides config file)
        #[arg(short, long)]
        days: Option<u32>,

        /// RNG seed for reproducible runs (overrides config and env)
        #[arg(long)]
        seed: Option<u64>,

        /// Load market history from CSV instead of generating it
        #[arg(long)]
        history: Option<String>,

        /// Post the recommendation to the backend API
        #[arg(long)]
        send: bool,

        /// Do not write the recommendation JSON file
        #[arg(long)]
        no_save: bool,
    },

    /// Generate a synthetic market series and write it to CSV
    Generate {
        /// Path to configuration file (defaults are used if missing)
        #[arg(short, long, default_value = "configs/advisor.json")]
        config: String,

        /// Days of hourly history
        #[arg(short, long)]
        days: Option<u32>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output CSV path
        #[arg(short, long, default_value = "data/market_history.csv")]
        output: String,
    },

    /// Simulate hourly solar and wind generation
    Energy {
        /// Path to configuration file (defaults are used if missing)
        #[arg(short, long, default_value = "configs/advisor.json")]
        config: String,

        /// Hours to simulate
        #[arg(long, default_value = "24")]
        hours: usize,

        /// Site location label
        #[arg(short, long, default_value = "Mumbai, India")]
        location: String,

        /// Wallet address reported with the readings
        #[arg(short, long, default_value = "0x742d35Cc6634C0532925a3b8D4C9db96C4b4d8b6")]
        address: String,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Post the readings to the backend API
        #[arg(long)]
        send: bool,
    },
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Recommend { .. } => "recommend",
        Commands::Generate { .. } => "generate",
        Commands::Energy { .. } => "energy",
    };

    let settings = LogSettings {
        file_enabled: !cli.no_log_file,
        ..LogSettings::from_env(cli.verbose)
    };
    let (log_path, _log_guard) = logging::init(&settings, command_name)?;
    if let Some(path) = log_path {
        debug!("Writing log to {}", path.display());
    }

    match cli.command {
        Commands::Recommend {
            config,
            user,
            days,
            seed,
            history,
            send,
            no_save,
        } => commands::recommend::run(commands::recommend::RecommendArgs {
            config_path: config,
            user,
            days,
            seed,
            history,
            send,
            save: !no_save,
        }),

        Commands::Generate {
            config,
            days,
            seed,
            output,
        } => commands::generate::run(config, days, seed, output),

        Commands::Energy {
            config,
            hours,
            location,
            address,
            seed,
            send,
        } => commands::energy::run(config, hours, location, address, seed, send),
    }
}
