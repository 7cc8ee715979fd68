pub mod level;
pub mod value;
pub mod record;
pub mod document;
pub mod builder;
pub mod context;
pub mod handler;
pub mod archive;
pub mod json_handler;
pub mod store;

#[cfg(feature = "opensearch")]
pub mod opensearch;

pub mod backend;
pub mod env;
pub mod init;
pub mod layer;
pub mod memory_store;
pub mod noop_store;
