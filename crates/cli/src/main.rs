mod commands;
mod render;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use commands::{CommandLine, Commands};
use rocketshoes_client::{
    CartStorage, CartStore, ClientConfig, HttpCatalog, MemoryStorage, NotificationLog, Notifier,
    SqliteStorage, TracingNotifier, UpdateAmount,
};
use rocketshoes_observability::LogFormat;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = CommandLine::parse_args();
    rocketshoes_observability::init(cli.log_format);

    let config = cli.config(ClientConfig::from_env());
    tracing::debug!(api_url = %config.api_url, "configuration loaded");

    let storage: Arc<dyn CartStorage> = if cli.ephemeral {
        Arc::new(MemoryStorage::new())
    } else {
        match &config.db_path {
            Some(path) => Arc::new(SqliteStorage::new(path)),
            None => Arc::new(
                SqliteStorage::at_default_location()
                    .context("failed to locate cart storage; pass --db or --ephemeral")?,
            ),
        }
    };

    // With JSON logs, notifications become log records instead of stdout lines.
    let log = NotificationLog::new();
    let notifier: Arc<dyn Notifier> = match cli.log_format {
        LogFormat::Json => Arc::new(TracingNotifier),
        LogFormat::Pretty => Arc::new(log.clone()),
    };

    let catalog = Arc::new(HttpCatalog::from_config(&config));
    let mut store = CartStore::open(catalog, storage, notifier)
        .await
        .context("failed to restore cart")?;

    let outcome = match cli.command {
        Commands::List { json } => {
            let summary = store.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{}", render::summary_table(&summary));
            }
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Add { product_id } => store.add_product(product_id).await.map(|_| ()),
        Commands::Remove { product_id } => store.remove_product(product_id).await.map(|_| ()),
        Commands::Update { product_id, amount } => store
            .update_product_amount(UpdateAmount { product_id, amount })
            .await
            .map(|_| ()),
        Commands::Clear => store.clear().await.map(|_| ()),
    };

    let shown = log.drain();
    if !shown.is_empty() {
        println!("{}", render::notifications(&shown));
    }

    match outcome {
        Ok(()) => {
            println!("{}", render::summary_table(&store.summary()));
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            Ok(ExitCode::FAILURE)
        }
    }
}
