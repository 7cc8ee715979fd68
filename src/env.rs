/// Environment variable names used by this crate for convenient
/// configuration from microservices.
///
/// These are purely helpers; the handler and store types remain decoupled
/// from environment access.

/// Store DSN, e.g. `opensearch://127.0.0.1:9200/app-logs`.
pub const LOG_ARCHIVE_DSN_ENV: &str = "LOG_ARCHIVE_DSN";

/// Minimum level that is logged and archived, e.g. `info` or `warn+2`.
pub const LOG_ARCHIVE_LEVEL_ENV: &str = "LOG_ARCHIVE_LEVEL";

/// Whether records are also written to stdout as JSON (`true`/`false`).
pub const LOG_ARCHIVE_STDOUT_ENV: &str = "LOG_ARCHIVE_STDOUT";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
