mod brands;
mod find;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "remitfind")]
#[command(about = "Find the best nearby remittance channel for a transfer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rank channels for a transfer and pick the nearest location to use
    Find {
        /// Search origin longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Search origin latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Amount to send, in the source currency
        #[arg(long)]
        amount: f64,
        /// Source currency code (e.g., USD)
        #[arg(long = "from")]
        from_currency: String,
        /// Destination currency code (e.g., PHP)
        #[arg(long = "to")]
        to_currency: String,
        /// Places-provider JSON file with the candidate locations
        #[arg(long)]
        places: PathBuf,
        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the canonical key and resolved brand for each label
    Canonicalize {
        #[arg(required = true)]
        labels: Vec<String>,
    },
    /// Print the effective alias rule table
    Rules,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = remitfind_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(env = %config.env, "configuration loaded");

    match cli.command {
        Commands::Find {
            lon,
            lat,
            amount,
            from_currency,
            to_currency,
            places,
            json,
        } => {
            let args = find::FindArgs {
                lon,
                lat,
                amount,
                from_currency,
                to_currency,
                places,
            };
            let state = find::run_find(&config, &args).await?;
            if json {
                output::print_json(&state)?;
            } else {
                output::print_table(&state);
            }
        }
        Commands::Canonicalize { labels } => brands::run_canonicalize(&config, &labels)?,
        Commands::Rules => brands::run_rules(&config).await?,
    }

    Ok(())
}
