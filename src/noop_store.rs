use crate::context::Context;
use crate::document::Document;
use crate::handler::BoxError;
use crate::store::DocumentStore;
use async_trait::async_trait;

/// A store that simply drops all documents.
///
/// Useful for measuring the overhead of building documents without any
/// external I/O, and for tests that don't care about persistence.
#[derive(Clone, Default)]
pub struct NoopStore;

#[async_trait]
impl DocumentStore for NoopStore {
    async fn insert_document(&self, _ctx: &Context, _document: Document) -> Result<(), BoxError> {
        Ok(())
    }
}
