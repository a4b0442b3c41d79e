//! The Repair pipeline: realign recorded checksums with the on-disk
//! scripts. Never re-executes SQL.

use crate::error::EngineResult;
use crate::migrator::Migrator;
use crate::summary::RepairSummary;
use std::collections::HashMap;
use tm_core::{normalized_checksum, MigrationScript};

impl Migrator<'_> {
    pub async fn repair(&self) -> EngineResult<RepairSummary> {
        self.acquire_locks().await?;
        let outcome = self.repair_locked().await;
        self.release_locks().await;
        outcome
    }

    async fn repair_locked(&self) -> EngineResult<RepairSummary> {
        self.store.create_if_not_exists().await?;
        let by_name: HashMap<&str, &MigrationScript> =
            self.scripts.iter().map(|s| (s.name(), s)).collect();

        let mut repaired = 0usize;
        for row in self.store.all_metadata().await? {
            if row.kind.is_marker() {
                continue;
            }
            let Some(script) = by_name.get(row.name.as_str()) else {
                // No on-disk counterpart; leave the record as history.
                continue;
            };
            let recorded = row.checksum.as_deref().unwrap_or_default();
            if recorded == script.checksum() {
                continue;
            }
            if recorded == normalized_checksum(script.content()) {
                // Only line endings differ; validation already tolerates
                // this, so rewriting the row would churn for nothing.
                continue;
            }
            log::info!("repairing checksum of metadata row {} ({})", row.id, row.name);
            self.store.update_checksum(row.id, script.checksum()).await?;
            repaired += 1;
        }
        Ok(RepairSummary {
            repaired_count: repaired,
        })
    }
}

#[cfg(test)]
#[path = "repair_test.rs"]
mod tests;
