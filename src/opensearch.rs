use crate::context::Context;
use crate::document::Document;
use crate::handler::BoxError;
use crate::store::DocumentStore;
use async_trait::async_trait;
use reqwest::Client;

/// Failures reported by [`OpenSearchStore`].
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("OpenSearch index request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("context cancelled before OpenSearch answered")]
    Cancelled,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// OpenSearch store that indexes each document through the document API.
#[derive(Clone)]
pub struct OpenSearchStore {
    client: Client,
    /// Base URL of the OpenSearch cluster, e.g. "http://localhost:9200".
    base_url: String,
    /// Target index name.
    index: String,
}

impl OpenSearchStore {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, index)
    }

    /// Use a preconfigured client, e.g. one with timeouts or credentials.
    pub fn with_client(client: Client, base_url: impl Into<String>, index: impl Into<String>) -> Self {
        OpenSearchStore {
            client,
            base_url: base_url.into(),
            index: index.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/_doc",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.index)
        )
    }

    async fn index(&self, document: &Document) -> Result<(), StoreError> {
        let url = self.endpoint();
        tracing::debug!(%url, entries = document.len(), "indexing log document");

        let resp = self.client.post(&url).json(document).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            Err(StoreError::Status { status, body })
        }
    }
}

#[async_trait]
impl DocumentStore for OpenSearchStore {
    async fn insert_document(&self, ctx: &Context, document: Document) -> Result<(), BoxError> {
        tokio::select! {
            res = self.index(&document) => res.map_err(|e| Box::new(e) as BoxError),
            _ = ctx.cancelled() => Err(Box::new(StoreError::Cancelled) as BoxError),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn document() -> Document {
        let mut doc = Document::new();
        doc.push("level", "ERROR");
        doc.push("msg", "boom");
        doc
    }

    #[tokio::test]
    async fn posts_document_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs/_doc"))
            .and(body_json(serde_json::json!({ "level": "ERROR", "msg": "boom" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store = OpenSearchStore::new(format!("{}/", server.uri()), "logs");
        store
            .insert_document(&Context::background(), document())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
            .mount(&server)
            .await;

        let store = OpenSearchStore::new(server.uri(), "logs");
        let err = store
            .insert_document(&Context::background(), document())
            .await
            .unwrap_err();

        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Status { status, body }) => {
                assert_eq!(*status, 400);
                assert_eq!(body, "mapper_parsing_exception");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn cancelled_context_stops_waiting() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_delay(std::time::Duration::from_secs(30)))
            .mount(&server)
            .await;

        let token = CancellationToken::new();
        token.cancel();
        let ctx = Context::background().with_cancellation(token);

        let store = OpenSearchStore::new(server.uri(), "logs");
        let err = store.insert_document(&ctx, document()).await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Cancelled)));
    }
}
