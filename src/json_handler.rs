use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::builder;
use crate::context::Context;
use crate::handler::{BoxError, Handler};
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;

/// Options for [`JsonHandler`].
#[derive(Clone, Debug, Default)]
pub struct HandlerOptions {
    /// Minimum level that is handled. Defaults to [`Level::INFO`].
    pub level: Level,
}

/// Attributes bound through [`Handler::with_attrs`] while `depth` groups
/// were open.
#[derive(Clone, Debug)]
struct Bound {
    depth: usize,
    attrs: Vec<Attr>,
}

/// [`Handler`] that writes each record as one line of JSON.
///
/// The object starts with `time` (when set), `level` and `msg`, followed by
/// bound attributes and the record's own attributes, nested under the open
/// groups. Groups that end up without attributes are left out.
pub struct JsonHandler<W> {
    writer: Arc<Mutex<W>>,
    options: HandlerOptions,
    groups: Vec<String>,
    bound: Vec<Bound>,
}

impl<W> Clone for JsonHandler<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
            options: self.options.clone(),
            groups: self.groups.clone(),
            bound: self.bound.clone(),
        }
    }
}

impl<W: Write + Send + 'static> JsonHandler<W> {
    pub fn new(writer: W, options: HandlerOptions) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            options,
            groups: Vec::new(),
            bound: Vec::new(),
        }
    }

    /// Attributes for `record` at group `depth`: what was bound at that
    /// depth, then the next group, or the record's own attributes at the
    /// innermost level.
    fn nest(&self, depth: usize, record: &Record) -> Vec<Attr> {
        let mut attrs: Vec<Attr> = self
            .bound
            .iter()
            .filter(|b| b.depth == depth)
            .flat_map(|b| b.attrs.iter().cloned())
            .collect();

        match self.groups.get(depth) {
            Some(name) => attrs.push(Attr::group(name.clone(), self.nest(depth + 1, record))),
            None => attrs.extend(record.attrs().iter().cloned()),
        }
        attrs
    }
}

#[async_trait]
impl<W: Write + Send + 'static> Handler for JsonHandler<W> {
    fn enabled(&self, _ctx: &Context, level: Level) -> bool {
        level >= self.options.level
    }

    async fn handle(&self, _ctx: &Context, record: &Record) -> Result<(), BoxError> {
        let doc = builder::append_attrs(builder::record_header(record), &self.nest(0, record));
        let mut line = serde_json::to_vec(&doc)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line)?;
        Ok(())
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        let mut handler = self.clone();
        if !attrs.is_empty() {
            handler.bound.push(Bound {
                depth: self.groups.len(),
                attrs,
            });
        }
        Arc::new(handler)
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        let mut handler = self.clone();
        if !name.is_empty() {
            handler.groups.push(name.to_string());
        }
        Arc::new(handler)
    }
}
