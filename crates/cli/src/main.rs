//! Last Call CLI - Database migrations and catalog seeding.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! lastcall-cli migrate
//!
//! # Seed the stock ledger from the catalog file
//! lastcall-cli seed
//!
//! # Seed from a specific catalog file with a default stock count
//! lastcall-cli seed -f config/drinks.json --stock 24
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Upsert catalog entries into the stock ledger

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lastcall-cli")]
#[command(author, version, about = "Last Call CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the stock ledger from the drink catalog file
    Seed {
        /// Path to the catalog JSON file
        #[arg(short, long, default_value = "crates/server/config/drinks.json")]
        file: String,

        /// Initial stock count applied to newly created drinks
        #[arg(long, default_value_t = 0)]
        stock: i32,
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
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { file, stock } => commands::seed::drinks(&file, stock).await?,
    }
    Ok(())
}
