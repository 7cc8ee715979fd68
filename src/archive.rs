use async_trait::async_trait;
use std::sync::Arc;

use crate::builder;
use crate::context::Context;
use crate::handler::{BoxError, Handler};
use crate::level::Level;
use crate::record::Record;
use crate::store::DocumentStore;
use crate::value::Attr;

/// [`Handler`] decorator that archives every record it handles.
///
/// Enablement, formatting and output are left to the wrapped handler. Once
/// the wrapped handler has accepted a record, it is converted into a
/// [`Document`](crate::document::Document) and inserted into the store,
/// one insert per record with no buffering or retry.
#[derive(Clone)]
pub struct ArchiveHandler {
    handler: Arc<dyn Handler>,
    store: Arc<dyn DocumentStore>,
}

impl ArchiveHandler {
    /// Wrap `handler`, archiving into `store`.
    pub fn new(handler: Arc<dyn Handler>, store: Arc<dyn DocumentStore>) -> Self {
        Self { handler, store }
    }
}

#[async_trait]
impl Handler for ArchiveHandler {
    fn enabled(&self, ctx: &Context, level: Level) -> bool {
        self.handler.enabled(ctx, level)
    }

    /// Runs the wrapped handler first; its error is returned unchanged and
    /// nothing is stored. Otherwise the record document is inserted with a
    /// context detached from `ctx`'s cancellation, so that a caller going
    /// away does not lose the archived copy. A store error is returned
    /// unchanged; the wrapped handler's output is not rolled back.
    async fn handle(&self, ctx: &Context, record: &Record) -> Result<(), BoxError> {
        self.handler.handle(ctx, record).await?;

        let doc = builder::record_document(record);
        self.store.insert_document(&ctx.without_cancel(), doc).await
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(ArchiveHandler {
            handler: self.handler.with_attrs(attrs),
            store: Arc::clone(&self.store),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(ArchiveHandler {
            handler: self.handler.with_group(name),
            store: Arc::clone(&self.store),
        })
    }
}
