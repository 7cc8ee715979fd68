use std::time::Instant;

use log_archive_sink::archive::ArchiveHandler;
use log_archive_sink::context::Context;
use log_archive_sink::handler::Handler;
use log_archive_sink::json_handler::{HandlerOptions, JsonHandler};
use log_archive_sink::level::Level;
use log_archive_sink::memory_store::MemoryStore;
use log_archive_sink::record::Record;
use log_archive_sink::value::Attr;

/// Drives the handler chain directly, without `tracing`, to measure the
/// cost of formatting plus document building per record.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let store = MemoryStore::new();
    let handler = ArchiveHandler::new(
        std::sync::Arc::new(JsonHandler::new(std::io::sink(), HandlerOptions::default())),
        std::sync::Arc::new(store.clone()),
    )
    .with_attrs(vec![Attr::string("service", "load")])
    .with_group("req");

    let ctx = Context::background();
    let n: i64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        let record = Record::new(Some(chrono::Utc::now()), Level::ERROR, "custom load test error")
            .with_attrs([
                Attr::int64("iteration", i),
                Attr::group("user", [Attr::uint64("id", 42), Attr::bool("admin", false)]),
            ]);
        handler.handle(&ctx, &record).await?;
    }

    let elapsed = start.elapsed();
    println!("custom chain: handled {} records in {:?} (~{:.0} rec/s), {} archived",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64(),
        store.len().await
    );
    Ok(())
}
