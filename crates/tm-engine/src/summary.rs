//! Command result summaries.

use serde::Serialize;

/// Outcome of one Migrate run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrateSummary {
    /// Names of the scripts applied this run, in execution order. Under
    /// `RollbackAll` these were executed and then rolled back.
    pub applied: Vec<String>,
    pub applied_count: usize,
    /// Scripts examined but not executed: below the version floor, above the
    /// target version, or repeatable scripts with an unchanged checksum.
    pub skipped_count: usize,
}

/// Outcome of one Repair run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairSummary {
    /// Metadata rows whose checksum was rewritten.
    pub repaired_count: usize,
}

/// Outcome of one Erase run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EraseSummary {
    /// Managed schemas that were dropped or had their contents erased.
    /// Schemas without an ownership marker are never listed.
    pub schemas_erased: Vec<String>,
}
