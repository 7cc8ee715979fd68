use crate::context::Context;
use crate::document::Document;
use crate::handler::BoxError;
use async_trait::async_trait;

/// Destination for the [`Document`]s built by the archive handler.
///
/// Implementations wrap a concrete document database (OpenSearch, an
/// in-memory list, etc). They are shared between handlers and called from
/// many tasks at once, hence `Send + Sync`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document.
    ///
    /// **Parameters**
    /// - `ctx`: call context. Implementations should stop waiting once
    ///   `ctx` is cancelled; the archive handler hands in a context that is
    ///   never cancelled.
    /// - `document`: fully-built record document, owned by the store from
    ///   here on.
    ///
    /// **Returns**
    /// - `Ok(())` if the backend accepted the document.
    /// - `Err(..)` if the backend failed (network error, serialization
    ///   error, HTTP status, etc.). The error reaches the logging caller
    ///   unchanged; there is no retry.
    async fn insert_document(&self, ctx: &Context, document: Document) -> Result<(), BoxError>;
}
