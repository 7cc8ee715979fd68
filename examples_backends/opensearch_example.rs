use std::sync::Arc;

use log_archive_sink::{
    backend::{make_store_from_config, parse_dsn},
    env::{env_or, LOG_ARCHIVE_DSN_ENV},
    init::init_tracing,
    store::DocumentStore,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example DSN: opensearch://localhost:9200/app-logs
    let dsn = env_or(LOG_ARCHIVE_DSN_ENV, "opensearch://localhost:9200/app-logs");

    let backend_cfg = parse_dsn(&dsn)?;
    let store: Arc<dyn DocumentStore> = make_store_from_config(&backend_cfg)?;

    let drain = init_tracing(store)?;

    info!("opensearch backend example started");
    error!(index = "app-logs", attempt = 3u64, "simulated error archived in OpenSearch");

    drain.wait().await;
    Ok(())
}
