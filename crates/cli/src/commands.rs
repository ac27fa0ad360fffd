use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rocketshoes_client::ClientConfig;
use rocketshoes_core::ProductId;
use rocketshoes_observability::LogFormat;

#[derive(Debug, Parser)]
#[command(name = "rocketshoes")]
#[command(about = "Manage the RocketShoes shopping cart.")]
pub struct CommandLine {
    /// Catalog/stock API base URL (overrides ROCKETSHOES_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// SQLite file holding the cart (overrides ROCKETSHOES_DB_PATH)
    #[arg(long, global = true, conflicts_with = "ephemeral")]
    pub db: Option<PathBuf>,

    /// Keep the cart in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Log output format: pretty or json
    #[arg(long, global = true, default_value = "pretty")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the cart contents and totals
    #[command(alias = "ls")]
    List {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add one unit of a product
    #[command(alias = "a")]
    Add { product_id: ProductId },
    /// Remove a product from the cart
    #[command(alias = "rm")]
    Remove { product_id: ProductId },
    /// Set the quantity of a product already in the cart
    #[command(alias = "u")]
    Update { product_id: ProductId, amount: u32 },
    /// Empty the cart
    Clear,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of `base`.
    pub fn config(&self, base: ClientConfig) -> ClientConfig {
        ClientConfig {
            api_url: self.api_url.clone().unwrap_or(base.api_url),
            db_path: self.db.clone().or(base.db_path),
            ..base
        }
    }
}
