//! The Migrate pipeline.

use crate::error::{EngineError, EngineResult};
use crate::migrator::Migrator;
use crate::summary::MigrateSummary;
use std::collections::{HashMap, HashSet};
use tm_core::{
    normalized_checksum, AppliedMigration, CoreError, MigrationKind, MigrationScript,
    TransactionMode, Version,
};
use tm_db::Connection;
use tm_sql::{builder_for, Placeholders, SqlStatement};

impl Migrator<'_> {
    /// Run the full Migrate pipeline: lock, first-contact markers, script
    /// validation, checksum validation, pending selection, execution under
    /// the configured transaction mode, unlock.
    pub async fn migrate(&self) -> EngineResult<MigrateSummary> {
        self.acquire_locks().await?;
        let outcome = self.migrate_locked().await;
        self.release_locks().await;
        outcome
    }

    async fn migrate_locked(&self) -> EngineResult<MigrateSummary> {
        match self.migrate_pass().await {
            Err(e @ EngineError::Validation { .. })
                if self.options.erase_on_validation_error && !self.options.erase_disabled =>
            {
                // Single non-recursive restart: erase, then one more pass.
                log::warn!("{e}; erasing managed schemas and retrying once");
                self.erase_schemas().await?;
                self.migrate_pass().await
            }
            outcome => outcome,
        }
    }

    async fn migrate_pass(&self) -> EngineResult<MigrateSummary> {
        self.prepare_schemas().await?;
        let (versioned, repeatable) = self.partition_scripts()?;

        let applied_rows = self.store.applied_versioned().await?;
        let last_applied = applied_rows.iter().filter_map(|r| r.version.clone()).max();
        let floor = self.version_floor(last_applied.as_ref()).await?;
        validate_checksums(&applied_rows, &versioned)?;

        let applied_versions: HashSet<&Version> = applied_rows
            .iter()
            .filter_map(|r| r.version.as_ref())
            .collect();
        let mut skipped = 0usize;
        let mut pending: Vec<&MigrationScript> = Vec::new();
        for &script in &versioned {
            let Some(v) = script.version() else { continue };
            if applied_versions.contains(v) {
                continue;
            }
            if floor.as_ref().is_some_and(|f| v <= f) {
                skipped += 1;
                continue;
            }
            if self.options.target_version.as_ref().is_some_and(|t| v > t) {
                skipped += 1;
                continue;
            }
            pending.push(script);
        }

        if !self.options.out_of_order {
            if let Some(last) = &last_applied {
                if let Some(stale) = pending
                    .iter()
                    .find(|s| s.version().is_some_and(|v| v < last))
                {
                    return Err(EngineError::Configuration(format!(
                        "migration '{}' is out of order: its version is below the last \
                         applied version {last} (set out_of_order to apply it anyway)",
                        stale.name()
                    )));
                }
            }
        }

        // A repeatable migration re-applies whenever its checksum differs
        // from the last recorded successful one.
        let recorded: HashMap<String, Option<String>> = self
            .store
            .applied_repeatable()
            .await?
            .into_iter()
            .map(|r| (r.name, r.checksum))
            .collect();
        for &script in &repeatable {
            match recorded.get(script.name()) {
                Some(checksum) if checksum.as_deref() == Some(script.checksum()) => skipped += 1,
                _ => pending.push(script),
            }
        }

        self.execute(&pending, skipped).await
    }

    /// Versioned scripts sorted by version and repeatable scripts sorted by
    /// name, with duplicate versions and names rejected.
    fn partition_scripts(&self) -> EngineResult<(Vec<&MigrationScript>, Vec<&MigrationScript>)> {
        let mut versioned: Vec<&MigrationScript> = Vec::new();
        let mut repeatable: Vec<&MigrationScript> = Vec::new();
        for script in &self.scripts {
            match script.kind() {
                MigrationKind::Versioned => versioned.push(script),
                _ => repeatable.push(script),
            }
        }
        versioned.sort();
        repeatable.sort();

        for pair in versioned.windows(2) {
            if pair[0].version() == pair[1].version() {
                let version = pair[0].version().map(ToString::to_string).unwrap_or_default();
                return Err(CoreError::DuplicateVersion {
                    version,
                    first: pair[0].name().to_string(),
                    second: pair[1].name().to_string(),
                }
                .into());
            }
        }
        let mut names: HashSet<&str> = HashSet::new();
        for script in versioned.iter().chain(repeatable.iter()) {
            if !names.insert(script.name()) {
                return Err(CoreError::DuplicateName {
                    name: script.name().to_string(),
                }
                .into());
            }
        }
        Ok((versioned, repeatable))
    }

    /// Versions at or below the floor are treated as already applied. The
    /// floor is the highest of the StartVersion marker and the configured
    /// start version; a configured start below the last applied version is
    /// rejected, and one above the recorded marker is persisted as a new
    /// marker.
    async fn version_floor(&self, last_applied: Option<&Version>) -> EngineResult<Option<Version>> {
        let marker = self.store.start_version().await?;
        if let Some(configured) = &self.options.start_version {
            if last_applied.is_some_and(|last| configured < last) {
                return Err(EngineError::Configuration(format!(
                    "start version {configured} is below the last applied version \
                     {}; a start version can only skip migrations never yet applied",
                    last_applied.map(ToString::to_string).unwrap_or_default()
                )));
            }
            if marker.as_ref().map_or(true, |m| configured > m) {
                self.store
                    .save_marker(
                        MigrationKind::StartVersion,
                        Some(configured),
                        "start version",
                        "start_version",
                    )
                    .await?;
            }
        }
        Ok(match (marker, self.options.start_version.clone()) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        })
    }

    async fn execute(
        &self,
        pending: &[&MigrationScript],
        skipped: usize,
    ) -> EngineResult<MigrateSummary> {
        let mode = self.options.transaction_mode;
        let builder = builder_for(self.conn.kind());
        let placeholders = Placeholders::new(
            self.options.placeholder_prefix.clone(),
            self.options.placeholder_suffix.clone(),
            self.options.placeholders.clone(),
        );
        let mut runner = ScriptRunner::new(self.conn);
        let mut applied: Vec<String> = Vec::new();

        for script in pending {
            log::info!("applying migration {}", script.name());
            let statements = builder.build(script.content(), &placeholders);
            let mut failure: Option<EngineError> = None;
            for stmt in &statements {
                log::debug!("executing statement at line {}", stmt.line);
                if let Err(e) = runner.run(stmt).await {
                    log::error!(
                        "migration {} failed at line {}: {e}",
                        script.name(),
                        stmt.line
                    );
                    failure = Some(e);
                    break;
                }
            }

            if let Some(e) = failure {
                // Roll back the active transaction (script-scoped under
                // CommitEach, batch-scoped otherwise), then record the
                // failed attempt. The batch halts here.
                runner.rollback().await;
                self.store.save(script, false).await?;
                return Err(e);
            }

            // The success row joins the active transaction, so its fate is
            // tied to the script's under every mode.
            if let Err(e) = self.store.save(script, true).await {
                runner.rollback().await;
                return Err(e.into());
            }
            if mode == TransactionMode::CommitEach {
                runner.commit().await?;
            }
            applied.push(script.name().to_string());
        }

        match mode {
            TransactionMode::CommitEach => {}
            TransactionMode::CommitAll => runner.commit().await?,
            TransactionMode::RollbackAll => {
                log::info!("rolling back the batch (rollback_all mode)");
                runner.rollback().await;
            }
        }
        Ok(MigrateSummary {
            applied_count: applied.len(),
            applied,
            skipped_count: skipped,
        })
    }
}

fn validate_checksums(
    applied: &[AppliedMigration],
    versioned: &[&MigrationScript],
) -> EngineResult<()> {
    let by_version: HashMap<&Version, &MigrationScript> = versioned
        .iter()
        .filter_map(|s| s.version().map(|v| (v, *s)))
        .collect();
    for row in applied {
        let Some(script) = row.version.as_ref().and_then(|v| by_version.get(v)) else {
            // The script is gone from disk; nothing to compare.
            continue;
        };
        let recorded = row.checksum.as_deref().unwrap_or_default();
        if recorded != script.checksum()
            && recorded != normalized_checksum(script.content())
        {
            return Err(EngineError::Validation {
                name: script.name().to_string(),
                expected: recorded.to_string(),
                actual: script.checksum().to_string(),
            });
        }
    }
    Ok(())
}

/// Tracks the open transaction across statements of a run.
///
/// Transactions begin lazily before the first transactable statement; a
/// statement flagged non-transactable commits whatever is open and runs on
/// the bare connection. Dialects without transactions (Cassandra) never
/// begin one.
struct ScriptRunner<'a> {
    conn: &'a dyn Connection,
    transactional: bool,
    in_tx: bool,
}

impl<'a> ScriptRunner<'a> {
    fn new(conn: &'a dyn Connection) -> Self {
        Self {
            conn,
            transactional: conn.kind().supports_transactions(),
            in_tx: false,
        }
    }

    async fn run(&mut self, stmt: &SqlStatement) -> EngineResult<()> {
        if stmt.transactable && self.transactional {
            if !self.in_tx {
                self.conn.begin().await?;
                self.in_tx = true;
            }
        } else if self.in_tx {
            self.conn.commit().await?;
            self.in_tx = false;
        }
        self.conn.execute(&stmt.sql, &[]).await?;
        Ok(())
    }

    async fn commit(&mut self) -> EngineResult<()> {
        if self.in_tx {
            self.in_tx = false;
            self.conn.commit().await?;
        }
        Ok(())
    }

    async fn rollback(&mut self) {
        if self.in_tx {
            self.in_tx = false;
            if let Err(e) = self.conn.rollback().await {
                log::warn!("rollback failed: {e}");
            }
        }
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
