use crate::archive::ArchiveHandler;
use crate::backend::{make_store_from_config, parse_dsn, BackendBuildError, DsnError};
use crate::env::{env_or, LOG_ARCHIVE_DSN_ENV, LOG_ARCHIVE_LEVEL_ENV, LOG_ARCHIVE_STDOUT_ENV};
use crate::handler::Handler;
use crate::json_handler::{HandlerOptions, JsonHandler};
use crate::layer::{Drain, HandlerLayer};
use crate::level::{Level, ParseLevelError};
use crate::store::DocumentStore;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Configuration of the installed logging pipeline.
///
/// **Fields**
/// - `level`: minimum level that is written and archived.
/// - `enable_stdout`: if `true`, records are written to stdout as JSON
///   lines before being archived; otherwise the primary output is
///   discarded and only the archive copy remains.
/// - `max_in_flight`: records handled concurrently before new ones are
///   dropped; `None` for no limit.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub level: Level,
    pub enable_stdout: bool,
    pub max_in_flight: Option<usize>,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            enable_stdout: true,
            max_in_flight: Some(DEFAULT_MAX_IN_FLIGHT),
        }
    }
}

pub const DEFAULT_MAX_IN_FLIGHT: usize = 10_000;

/// Errors raised while installing the global subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error(transparent)]
    Dsn(#[from] DsnError),

    #[error(transparent)]
    Backend(#[from] BackendBuildError),

    #[error(transparent)]
    Level(#[from] ParseLevelError),

    #[error("invalid value {0:?} for LOG_ARCHIVE_STDOUT, expected true or false")]
    Stdout(String),

    #[error(transparent)]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Build the handler chain for `config`: a [`JsonHandler`] as the primary
/// output wrapped in an [`ArchiveHandler`] writing to `store`.
pub fn build_handler(store: Arc<dyn DocumentStore>, config: &LayerConfig) -> Arc<dyn Handler> {
    let options = HandlerOptions {
        level: config.level,
    };
    let primary: Arc<dyn Handler> = if config.enable_stdout {
        Arc::new(JsonHandler::new(std::io::stdout(), options))
    } else {
        Arc::new(JsonHandler::new(std::io::sink(), options))
    };
    Arc::new(ArchiveHandler::new(primary, store))
}

/// Initialize the global `tracing` subscriber using the provided store and
/// [`LayerConfig`].
///
/// **Effects**
///
/// This installs a [`Registry`] combined with a [`HandlerLayer`] as the
/// global default subscriber, so all `tracing` events in the process are
/// written by the primary handler and archived into `store`.
///
/// The returned [`Drain`] waits for records still being handled; await
/// [`Drain::wait`] before the runtime shuts down.
pub fn init_tracing_with_config(
    store: Arc<dyn DocumentStore>,
    config: LayerConfig,
) -> Result<Drain, InitError> {
    let layer = build_layer(store, &config);
    let drain = layer.drain();
    let subscriber = Registry::default().with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(drain)
}

fn build_layer(store: Arc<dyn DocumentStore>, config: &LayerConfig) -> HandlerLayer {
    let layer = HandlerLayer::new(build_handler(store, config));
    match config.max_in_flight {
        Some(max) => layer.with_max_in_flight(max),
        None => layer,
    }
}

/// Initialize tracing with sensible defaults.
///
/// Equivalent to calling [`init_tracing_with_config`] with
/// [`LayerConfig::default`]. This is the recommended entrypoint for
/// typical microservices.
pub fn init_tracing(store: Arc<dyn DocumentStore>) -> Result<Drain, InitError> {
    init_tracing_with_config(store, LayerConfig::default())
}

/// Read [`LayerConfig`] from `LOG_ARCHIVE_LEVEL` and `LOG_ARCHIVE_STDOUT`,
/// falling back to the defaults.
pub fn config_from_env() -> Result<LayerConfig, InitError> {
    let level = env_or(LOG_ARCHIVE_LEVEL_ENV, "INFO").parse()?;
    let stdout = env_or(LOG_ARCHIVE_STDOUT_ENV, "true");
    let enable_stdout = match stdout.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => return Err(InitError::Stdout(stdout)),
    };
    Ok(LayerConfig {
        level,
        enable_stdout,
        ..LayerConfig::default()
    })
}

/// Initialize tracing entirely from the environment: the store from
/// `LOG_ARCHIVE_DSN` (default `noop://`) and the rest via
/// [`config_from_env`].
pub fn init_tracing_from_env() -> Result<Drain, InitError> {
    let backend = parse_dsn(&env_or(LOG_ARCHIVE_DSN_ENV, "noop://"))?;
    let store = make_store_from_config(&backend)?;
    init_tracing_with_config(store, config_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn built_chain_honors_configured_level() {
        let handler = build_handler(
            Arc::new(crate::noop_store::NoopStore),
            &LayerConfig {
                level: Level::WARN,
                enable_stdout: false,
                max_in_flight: None,
            },
        );
        let ctx = Context::background();
        assert!(!handler.enabled(&ctx, Level::INFO));
        assert!(handler.enabled(&ctx, Level::ERROR));
    }

    #[tokio::test]
    async fn built_layer_applies_in_flight_limit() {
        use tracing_subscriber::layer::SubscriberExt;

        let store = crate::memory_store::MemoryStore::new();
        let layer = build_layer(
            Arc::new(store.clone()),
            &LayerConfig {
                enable_stdout: false,
                max_in_flight: Some(1),
                ..LayerConfig::default()
            },
        );
        let failed = Arc::clone(&layer.failed_events);
        let drain = layer.drain();
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::error!(target: "app", "first");
            tracing::error!(target: "app", "second");
        });
        drain.wait().await;

        assert_eq!(store.len().await, 1);
        assert_eq!(failed.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn overflowing_level_offset_is_an_init_error() {
        let err = "ERROR+2147483647".parse::<Level>().map_err(InitError::from);
        assert!(matches!(err, Err(InitError::Level(_))));
    }
}
