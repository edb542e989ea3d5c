use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::json;
use std::error::Error;

#[derive(Parser)]
#[command(name = "startup-predictor-cli")]
#[command(about = "Startup Profitability Predictor CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "STARTUP_PREDICTOR_ENDPOINT", default_value = "http://localhost:8501")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict profitability for one startup
    Predict {
        #[arg(short, long)]
        industry: String,

        #[arg(short, long)]
        region: String,

        /// Number of funding rounds
        #[arg(long, default_value = "1")]
        funding_rounds: u32,

        /// Funding amount (M USD)
        #[arg(long, default_value = "0.0")]
        funding_amount: f64,

        /// Valuation (M USD)
        #[arg(long, default_value = "0.0")]
        valuation: f64,

        /// Revenue (M USD)
        #[arg(long, default_value = "0.0")]
        revenue: f64,

        /// Number of employees
        #[arg(long, default_value = "1")]
        employees: u32,

        /// Market share (%)
        #[arg(long, default_value = "0.0")]
        market_share: f64,

        /// Year founded
        #[arg(long, default_value = "2020")]
        year_founded: i32,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// List known industries and regions
    Categories,

    /// Show the loaded model
    Model,

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Predict {
            industry,
            region,
            funding_rounds,
            funding_amount,
            valuation,
            revenue,
            employees,
            market_share,
            year_founded,
            json,
        } => {
            let response = client
                .post(format!("{}/v1/predictions", cli.endpoint))
                .json(&json!({
                    "industry": industry,
                    "region": region,
                    "funding_rounds": funding_rounds,
                    "funding_amount": funding_amount,
                    "valuation": valuation,
                    "revenue": revenue,
                    "employees": employees,
                    "market_share": market_share,
                    "year_founded": year_founded,
                }))
                .send()
                .await?;

            let status = response.status();
            let body: serde_json::Value = response.json().await?;

            if json || !status.is_success() {
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Prediction: {}", body["label"].as_str().unwrap_or("unknown"));
                println!(
                    "Probability of being profitable: {}",
                    body["probability_display"].as_str().unwrap_or("unknown")
                );
            }

            if !status.is_success() {
                std::process::exit(1);
            }
        }

        Commands::Categories => {
            let response = client
                .get(format!("{}/v1/categories", cli.endpoint))
                .send()
                .await?;
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Model => {
            let response = client
                .get(format!("{}/v1/model", cli.endpoint))
                .send()
                .await?;
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;
            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
