use std::sync::Arc;
use std::time::Instant;
use tracing::error;

use log_archive_sink::init::{init_tracing_with_config, LayerConfig};
use log_archive_sink::noop_store::NoopStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(NoopStore::default());
    let drain = init_tracing_with_config(
        store,
        LayerConfig {
            enable_stdout: false,
            ..LayerConfig::default()
        },
    )?;

    let n: u64 = 100_000;
    let start = Instant::now();

    for i in 0..n {
        error!(iteration = i, "default load test error");
    }

    let elapsed = start.elapsed();
    println!("default config: dispatched {} events in {:?} (~{:.0} ev/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );

    drain.wait().await;
    println!("default config: all dispatched records handled after {:?}", start.elapsed());
    Ok(())
}
