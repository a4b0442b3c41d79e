//! Metadata store contract.

use crate::error::MetaResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tm_core::{AppliedMigration, MigrationKind, MigrationScript, Version};

/// The persisted ledger of applied migrations and bookkeeping markers.
///
/// [`SqlMetadataTable`](crate::table::SqlMetadataTable) is the production
/// implementation; the derived queries have default implementations over
/// [`all_metadata`](Self::all_metadata) so alternative stores (and test
/// fakes) only supply the primitives.
///
/// Lock acquisition failure is non-fatal here (`false`); the orchestrator
/// escalates it to a fatal error rather than proceeding unprotected.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create the table if absent. Returns true when this call created it.
    async fn create_if_not_exists(&self) -> MetaResult<bool>;

    /// Dialect-specific mutual exclusion over the metadata table. Any driver
    /// error degrades to `false`.
    async fn try_lock(&self) -> bool;

    /// Release the table lock. Failures degrade to `false`; the caller logs
    /// but never raises.
    async fn release_lock(&self) -> bool;

    /// Record one apply attempt, successful or not.
    async fn save(&self, script: &MigrationScript, success: bool) -> MetaResult<()>;

    /// Record a marker row (NewSchema / EmptySchema / StartVersion).
    async fn save_marker(
        &self,
        kind: MigrationKind,
        version: Option<&Version>,
        description: &str,
        name: &str,
    ) -> MetaResult<()>;

    /// Repair path: overwrite the checksum stored on row `id`.
    async fn update_checksum(&self, id: i64, checksum: &str) -> MetaResult<()>;

    /// Every metadata row, ordered by id.
    async fn all_metadata(&self) -> MetaResult<Vec<AppliedMigration>>;

    /// Successfully applied versioned migrations, ordered by version.
    async fn applied_versioned(&self) -> MetaResult<Vec<AppliedMigration>> {
        let mut rows: Vec<AppliedMigration> = self
            .all_metadata()
            .await?
            .into_iter()
            .filter(|r| r.kind == MigrationKind::Versioned && r.success)
            .collect();
        rows.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(rows)
    }

    /// Latest successful row per repeatable migration name, ordered by name.
    async fn applied_repeatable(&self) -> MetaResult<Vec<AppliedMigration>> {
        let mut latest: HashMap<String, AppliedMigration> = HashMap::new();
        for row in self.all_metadata().await? {
            if row.kind != MigrationKind::Repeatable || !row.success {
                continue;
            }
            match latest.get(&row.name) {
                Some(existing) if existing.id >= row.id => {}
                _ => {
                    latest.insert(row.name.clone(), row);
                }
            }
        }
        let mut rows: Vec<AppliedMigration> = latest.into_values().collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Highest successfully applied version, if any.
    async fn last_applied_version(&self) -> MetaResult<Option<Version>> {
        Ok(self
            .applied_versioned()
            .await?
            .into_iter()
            .filter_map(|r| r.version)
            .max())
    }

    /// Highest StartVersion marker, if any.
    async fn start_version(&self) -> MetaResult<Option<Version>> {
        Ok(self
            .all_metadata()
            .await?
            .into_iter()
            .filter(|r| r.kind == MigrationKind::StartVersion)
            .filter_map(|r| r.version)
            .max())
    }

    /// True when the engine created `schema` itself (a NewSchema marker
    /// exists), so Erase may drop the whole schema.
    async fn can_drop(&self, schema: &str) -> MetaResult<bool> {
        Ok(self
            .all_metadata()
            .await?
            .iter()
            .any(|r| r.kind == MigrationKind::NewSchema && r.name == schema))
    }

    /// True when the engine first found `schema` empty (an EmptySchema marker
    /// exists), so Erase may clear its contents.
    async fn can_erase(&self, schema: &str) -> MetaResult<bool> {
        Ok(self
            .all_metadata()
            .await?
            .iter()
            .any(|r| r.kind == MigrationKind::EmptySchema && r.name == schema))
    }
}
