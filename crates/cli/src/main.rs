//! Fruit Price Predictor CLI
//!
//! A command-line tool for listing known fruits and requesting price
//! predictions from a running fruit price server.

mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{fruits, info, predict};

const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Fruit Price Predictor CLI
#[derive(Parser)]
#[command(name = "fpp")]
#[command(author, version, about = "CLI for the Fruit Price Predictor", long_about = None)]
pub struct Cli {
    /// API endpoint URL (can also be set via FPP_API_URL env var)
    #[arg(long, env = "FPP_API_URL")]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, short)]
    pub format: Option<output::OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show service status and the models it serves
    Info,

    /// List the fruits the models were trained on
    Fruits,

    /// Predict the retail price of a fruit
    Predict {
        /// Fruit name; close misspellings are matched
        fruit: String,

        /// Form the fruit is sold in
        #[arg(long, value_enum, default_value = "fresh")]
        form: predict::Form,

        /// Fraction of the purchased weight that is edible
        #[arg(long)]
        yield_factor: f64,

        /// Cup equivalent size
        #[arg(long)]
        cup_eq_size: f64,

        /// Price per cup equivalent
        #[arg(long)]
        cup_eq_price: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let file_config = config::Config::load()?;

    let api_url = cli
        .api_url
        .or(file_config.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let format = cli.format.unwrap_or_else(|| file_config.output_format());

    // Initialize client
    let client = client::ApiClient::new(&api_url)?;

    // Execute command
    match cli.command {
        Commands::Info => {
            info::show_info(&client, format).await?;
        }
        Commands::Fruits => {
            fruits::list_fruits(&client, format).await?;
        }
        Commands::Predict {
            fruit,
            form,
            yield_factor,
            cup_eq_size,
            cup_eq_price,
        } => {
            let request = predict::build_request(fruit, form, yield_factor, cup_eq_size, cup_eq_price);
            predict::predict_price(&client, &request, format).await?;
        }
    }

    Ok(())
}
