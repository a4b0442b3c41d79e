//! Migration engine configuration.
//!
//! [`MigrationOptions`] is a plain serde struct; loading it from a file (or
//! building it from CLI flags) is the embedding application's job.

use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Policy governing how many scripts share a single commit/rollback unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionMode {
    /// One transaction per script, committed on success (default). A failure
    /// rolls back that script only and halts the batch.
    #[default]
    CommitEach,
    /// One transaction spanning the whole pending batch; any failure rolls
    /// back everything applied in this run.
    CommitAll,
    /// Like `CommitAll` but always rolled back. Dry-run mode.
    RollbackAll,
}

/// Configuration for one engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Schemas (or keyspaces/databases) managed by the engine. The first is
    /// also where the metadata table lives unless `metadata_table_schema`
    /// overrides it.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Schema holding the metadata table.
    #[serde(default)]
    pub metadata_table_schema: Option<String>,

    /// Name of the metadata table.
    #[serde(default = "default_metadata_table_name")]
    pub metadata_table_name: String,

    /// Value recorded in the metadata `installed_by` column.
    #[serde(default = "default_installed_by")]
    pub installed_by: String,

    /// Placeholder key -> value substitutions applied to scripts.
    #[serde(default)]
    pub placeholders: HashMap<String, String>,

    /// Placeholder token prefix.
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,

    /// Placeholder token suffix.
    #[serde(default = "default_placeholder_suffix")]
    pub placeholder_suffix: String,

    /// File-name prefix for versioned migrations.
    #[serde(default = "default_sql_migration_prefix")]
    pub sql_migration_prefix: String,

    /// File-name prefix for repeatable migrations.
    #[serde(default = "default_sql_repeatable_prefix")]
    pub sql_repeatable_prefix: String,

    /// Separator between version (or repeatable prefix) and description.
    #[serde(default = "default_sql_migration_separator")]
    pub sql_migration_separator: String,

    /// File-name suffix for migrations.
    #[serde(default = "default_sql_migration_suffix")]
    pub sql_migration_suffix: String,

    /// Highest version to apply; pending migrations above it are ignored.
    #[serde(default)]
    pub target_version: Option<Version>,

    /// Versions at or below this are treated as already applied. May only
    /// move the floor forward over migrations never yet applied.
    #[serde(default)]
    pub start_version: Option<Version>,

    /// Allow applying a pending migration whose version is lower than the
    /// highest already-applied version.
    #[serde(default)]
    pub out_of_order: bool,

    /// Refuse the Erase command entirely.
    #[serde(default)]
    pub erase_disabled: bool,

    /// On checksum validation failure, erase the managed schemas and retry
    /// the whole run once instead of failing.
    #[serde(default)]
    pub erase_on_validation_error: bool,

    /// Commit/rollback policy for the run.
    #[serde(default)]
    pub transaction_mode: TransactionMode,

    /// Per-statement timeout enforced by the embedder's driver, in seconds.
    /// A timeout surfaces as a SQL execution error; the engine never retries.
    #[serde(default)]
    pub command_timeout_secs: Option<u64>,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            schemas: Vec::new(),
            metadata_table_schema: None,
            metadata_table_name: default_metadata_table_name(),
            installed_by: default_installed_by(),
            placeholders: HashMap::new(),
            placeholder_prefix: default_placeholder_prefix(),
            placeholder_suffix: default_placeholder_suffix(),
            sql_migration_prefix: default_sql_migration_prefix(),
            sql_repeatable_prefix: default_sql_repeatable_prefix(),
            sql_migration_separator: default_sql_migration_separator(),
            sql_migration_suffix: default_sql_migration_suffix(),
            target_version: None,
            start_version: None,
            out_of_order: false,
            erase_disabled: false,
            erase_on_validation_error: false,
            transaction_mode: TransactionMode::default(),
            command_timeout_secs: None,
        }
    }
}

fn default_metadata_table_name() -> String {
    "changelog".to_string()
}

fn default_installed_by() -> String {
    "tidemark".to_string()
}

fn default_placeholder_prefix() -> String {
    "${".to_string()
}

fn default_placeholder_suffix() -> String {
    "}".to_string()
}

fn default_sql_migration_prefix() -> String {
    "V".to_string()
}

fn default_sql_repeatable_prefix() -> String {
    "R".to_string()
}

fn default_sql_migration_separator() -> String {
    "__".to_string()
}

fn default_sql_migration_suffix() -> String {
    ".sql".to_string()
}

#[cfg(test)]
#[path = "options_test.rs"]
mod tests;
