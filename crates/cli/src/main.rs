//! Proativa CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run production database migrations
//! proativa migrate
//!
//! # Seed orders and batches from a YAML file
//! proativa seed --file seeds/production.yaml
//!
//! # Check a seed file without writing anything
//! proativa seed --file seeds/production.yaml --dry-run
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proativa")]
#[command(author, version, about = "Proativa production CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed orders, items and batches from a YAML file
    Seed {
        /// Path to the YAML seed file
        #[arg(short, long)]
        file: String,

        /// Validate the file without connecting to the database
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::production().await?,
        Commands::Seed { file, dry_run } => {
            if dry_run {
                let content = tokio::fs::read_to_string(&file).await?;
                let parsed: commands::seed::SeedFile = serde_yaml::from_str(&content)?;
                commands::seed::validate(&parsed)?;
                tracing::info!(orders = parsed.orders.len(), "Seed file is valid");
            } else {
                commands::seed::production(&file).await?;
            }
        }
    }
    Ok(())
}
