use std::sync::Arc;

use crate::noop_store::NoopStore;
use crate::store::DocumentStore;

/// Supported store kinds that can be selected via DSN or config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    OpenSearch,
    Noop,
}

/// High-level store configuration built from a DSN or explicit fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Selected store implementation.
    pub kind: BackendKind,
    /// Raw DSN that was used to construct this config.
    pub dsn: String,
}

impl BackendConfig {
    pub fn new(kind: BackendKind, dsn: impl Into<String>) -> Self {
        BackendConfig { kind, dsn: dsn.into() }
    }

    /// Split an `opensearch://host:port/index` DSN into the HTTP base URL
    /// and index name. Missing parts default to `localhost:9200` and `logs`.
    pub fn opensearch_target(&self) -> (String, String) {
        let without_scheme = strip_scheme(&self.dsn, "opensearch://");
        let (base, index) = match without_scheme.split_once('/') {
            Some((base, index)) => (base, index.trim_matches('/')),
            None => (without_scheme, ""),
        };
        let base = if base.is_empty() { "localhost:9200" } else { base };
        let index = if index.is_empty() { "logs" } else { index };

        (format!("http://{}", base), index.to_string())
    }
}

/// Remove `scheme` from the front of `dsn`, ignoring ASCII case.
fn strip_scheme<'a>(dsn: &'a str, scheme: &str) -> &'a str {
    match dsn.get(..scheme.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(scheme) => &dsn[scheme.len()..],
        _ => dsn,
    }
}

/// Parse a DSN string and infer the store kind from its scheme.
///
/// Examples:
/// - "opensearch://127.0.0.1:9200/app-logs"
/// - "noop://"
pub fn parse_dsn(dsn: &str) -> Result<BackendConfig, DsnError> {
    let lower = dsn.trim().to_ascii_lowercase();

    if lower.starts_with("opensearch://") {
        Ok(BackendConfig::new(BackendKind::OpenSearch, dsn.trim()))
    } else if lower.starts_with("noop://") {
        Ok(BackendConfig::new(BackendKind::Noop, dsn.trim()))
    } else {
        Err(DsnError::UnknownScheme(dsn.to_string()))
    }
}

/// Error type returned when parsing a DSN.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DsnError {
    #[error("unknown or unsupported DSN scheme in {0:?}")]
    UnknownScheme(String),
}

/// Error type returned when building a store from configuration.
#[derive(thiserror::Error, Debug)]
pub enum BackendBuildError {
    #[error("backend {0:?} requires a cargo feature that is not enabled")]
    FeatureDisabled(BackendKind),
}

/// Create a concrete [`DocumentStore`] from a [`BackendConfig`].
///
/// This is the main entry point for applications that want to select
/// a store using a single DSN string instead of constructing it manually.
pub fn make_store_from_config(
    cfg: &BackendConfig,
) -> Result<Arc<dyn DocumentStore>, BackendBuildError> {
    match cfg.kind {
        BackendKind::OpenSearch => {
            #[cfg(feature = "opensearch")]
            {
                use crate::opensearch::OpenSearchStore;

                let (base_url, index) = cfg.opensearch_target();
                Ok(Arc::new(OpenSearchStore::new(base_url, index)) as Arc<dyn DocumentStore>)
            }

            #[cfg(not(feature = "opensearch"))]
            {
                Err(BackendBuildError::FeatureDisabled(BackendKind::OpenSearch))
            }
        }
        BackendKind::Noop => Ok(Arc::new(NoopStore) as Arc<dyn DocumentStore>),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_kind_from_scheme() {
        assert_eq!(
            parse_dsn("OpenSearch://db:9200/app").unwrap().kind,
            BackendKind::OpenSearch
        );
        assert_eq!(parse_dsn(" noop:// ").unwrap().kind, BackendKind::Noop);
        assert_eq!(
            parse_dsn("mongodb://localhost"),
            Err(DsnError::UnknownScheme("mongodb://localhost".to_string()))
        );
    }

    #[test]
    fn opensearch_target_fills_defaults() {
        let cfg = parse_dsn("opensearch://db:9200/app-logs").unwrap();
        assert_eq!(
            cfg.opensearch_target(),
            ("http://db:9200".to_string(), "app-logs".to_string())
        );

        let cfg = parse_dsn("opensearch://").unwrap();
        assert_eq!(
            cfg.opensearch_target(),
            ("http://localhost:9200".to_string(), "logs".to_string())
        );
    }

    #[test]
    fn builds_noop_store() {
        let cfg = parse_dsn("noop://").unwrap();
        assert!(make_store_from_config(&cfg).is_ok());
    }
}
