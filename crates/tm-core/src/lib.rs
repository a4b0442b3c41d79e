//! tm-core - Core library for Tidemark
//!
//! This crate provides the version model, the migration and metadata-row
//! models, checksum utilities, and the `MigrationOptions` configuration
//! shared across all Tidemark components.

pub mod checksum;
pub mod error;
pub mod migration;
pub mod options;
pub mod version;

pub use checksum::{compute_checksum, normalized_checksum};
pub use error::{CoreError, CoreResult};
pub use migration::{AppliedMigration, MigrationKind, MigrationScript};
pub use options::{MigrationOptions, TransactionMode};
pub use version::Version;
