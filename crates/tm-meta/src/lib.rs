//! tm-meta - Metadata table protocol and schema adapters for Tidemark
//!
//! The metadata table is the system of record for applied migrations and the
//! engine's bookkeeping markers, and carries the mutual-exclusion protocol
//! that keeps concurrent runners from double-applying a script. The schema
//! adapters provide existence/emptiness checks and the destructive
//! erase/drop primitives per dialect.

pub mod error;
pub mod lock;
pub mod schema;
pub mod store;
pub mod table;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{MetaError, MetaResult};
pub use schema::{adapter_for, SchemaAdapter};
pub use store::MetadataStore;
pub use table::SqlMetadataTable;
