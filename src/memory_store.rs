use crate::context::Context;
use crate::document::Document;
use crate::handler::BoxError;
use crate::store::DocumentStore;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store that keeps every inserted document in memory, in insertion order.
///
/// Clones share the same list, so a clone handed to a handler can be
/// inspected through the original.
#[derive(Clone, Default)]
pub struct MemoryStore {
    documents: Arc<Mutex<Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the documents inserted so far.
    pub async fn documents(&self) -> Vec<Document> {
        self.documents.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.documents.lock().await.len()
    }

    /// Remove and return all documents.
    pub async fn take(&self) -> Vec<Document> {
        std::mem::take(&mut *self.documents.lock().await)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, _ctx: &Context, document: Document) -> Result<(), BoxError> {
        self.documents.lock().await.push(document);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_documents() {
        let store = MemoryStore::new();
        let handle = store.clone();

        let mut doc = Document::new();
        doc.push("k", "v");
        handle.insert_document(&Context::background(), doc.clone()).await.unwrap();

        assert_eq!(store.documents().await, vec![doc.clone()]);
        assert_eq!(store.take().await, vec![doc]);
        assert_eq!(store.len().await, 0);
    }
}
