use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

use crate::context::Context;
use crate::level::Level;
use crate::record::Record;
use crate::value::Attr;

/// Error type shared by handlers and stores. Errors are passed up the chain
/// as-is so callers see the original failure.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Processes log records.
///
/// Handlers are immutable: [`Handler::with_attrs`] and
/// [`Handler::with_group`] return a new handler and leave `self` untouched,
/// so they may be called concurrently on a shared parent.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Whether records at `level` would be handled. Callers use this to skip
    /// building records that would be discarded.
    fn enabled(&self, ctx: &Context, level: Level) -> bool;

    /// Handle a single record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was fully processed.
    /// - `Err(..)` if formatting or output failed.
    async fn handle(&self, ctx: &Context, record: &Record) -> Result<(), BoxError>;

    /// New handler whose records all carry `attrs`, nested under the groups
    /// opened so far.
    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler>;

    /// New handler that nests all later attributes under `name`.
    fn with_group(&self, name: &str) -> Arc<dyn Handler>;
}
