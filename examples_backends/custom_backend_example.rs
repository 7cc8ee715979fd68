use std::sync::Arc;

use async_trait::async_trait;
use log_archive_sink::{
    context::Context,
    document::Document,
    handler::BoxError,
    init::init_tracing,
    store::DocumentStore,
};
use tracing::{error, info};

/// Example of integrating a completely custom backend by implementing
/// the `DocumentStore` trait directly. Imagine this talks to some
/// proprietary document database for which this crate does not provide
/// a built-in store.
struct MyCustomDbStore;

#[async_trait]
impl DocumentStore for MyCustomDbStore {
    async fn insert_document(&self, _ctx: &Context, document: Document) -> Result<(), BoxError> {
        // Here you would call your own client library for the target DB.
        // For the sake of example we just print the document.
        println!("[my-custom-db] {}", serde_json::to_string(&document)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn DocumentStore> = Arc::new(MyCustomDbStore);

    let drain = init_tracing(store)?;

    info!("custom backend example started");
    error!(db = "my-custom-db", "simulated error sent via custom backend");

    drain.wait().await;
    Ok(())
}
