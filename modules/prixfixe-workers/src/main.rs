use std::sync::Arc;

use anyhow::Result;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use prixfixe_common::{Config, LogFormat};
use prixfixe_events::OutboxStore;
use prixfixe_workers::replay::{self, Households};
use prixfixe_workers::{
    HttpSearchIndexProvider, MemoryPublisher, MemorySearchIndexProvider, Publisher,
    SearchIndexes, Workers,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format)?;

    info!("Prixfixe replay starting...");
    config.log_redacted();

    let publisher: Arc<dyn Publisher> = match &config.database_url {
        Some(url) => {
            info!("Publishing to the Postgres outbox");
            Arc::new(OutboxStore::connect(url).await?)
        }
        None => {
            info!("No DATABASE_URL set, publishing in memory");
            Arc::new(MemoryPublisher::new())
        }
    };

    let indexes = match &config.search_url {
        Some(url) => {
            let provider = HttpSearchIndexProvider::new(reqwest::Client::new(), url.as_str());
            SearchIndexes::provision(&provider).await?
        }
        None => {
            info!("No SEARCH_URL set, indexing in memory");
            SearchIndexes::provision(&MemorySearchIndexProvider::new()).await?
        }
    };

    let households = match &config.households_file {
        Some(path) => replay::load_households(path).await?,
        None => {
            warn!("No HOUSEHOLDS_FILE set, votes will never finalize");
            Households::new()
        }
    };
    info!(households = households.len(), "Loaded household membership");

    let workers = Workers::new(
        Arc::new(replay::data_manager(households)),
        Some(publisher),
        indexes,
    );

    let summary = replay::replay(
        &workers,
        BufReader::new(tokio::io::stdin()),
        config.worker_concurrency,
        config.message_deadline,
    )
    .await?;

    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        unreadable = summary.unreadable,
        "Replay complete"
    );
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("prixfixe=info".parse()?);
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
    Ok(())
}
