//! tm-engine - Migration orchestrator for Tidemark
//!
//! [`Migrator`] drives the four commands (Migrate, Repair, Erase, Info)
//! over one open [`tm_db::Connection`]: it locks, writes first-contact
//! markers, validates the discovered scripts against the recorded history,
//! executes pending work under the configured transaction mode, and records
//! every attempt in the metadata table.

pub mod erase;
pub mod error;
pub mod migrate;
pub mod migrator;
pub mod repair;
pub mod summary;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{EngineError, EngineResult};
pub use migrator::Migrator;
pub use summary::{EraseSummary, MigrateSummary, RepairSummary};
