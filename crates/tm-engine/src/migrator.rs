//! The migration orchestrator.
//!
//! One [`Migrator`] drives one command invocation (Migrate, Repair, Erase,
//! or Info) over one open connection. There is no persistent state across
//! invocations other than what the metadata table records.

use crate::error::{EngineError, EngineResult};
use tm_core::{AppliedMigration, MigrationKind, MigrationOptions, MigrationScript};
use tm_db::Connection;
use tm_meta::schema::adapter_for;
use tm_meta::{lock, MetadataStore, SqlMetadataTable};

pub struct Migrator<'a> {
    pub(crate) conn: &'a dyn Connection,
    pub(crate) options: MigrationOptions,
    pub(crate) scripts: Vec<MigrationScript>,
    pub(crate) store: Box<dyn MetadataStore + 'a>,
}

impl<'a> Migrator<'a> {
    /// Build an orchestrator over the standard SQL metadata table. `scripts`
    /// is the discovered migration list, versioned and repeatable mixed.
    pub fn new(
        conn: &'a dyn Connection,
        options: MigrationOptions,
        scripts: Vec<MigrationScript>,
    ) -> Self {
        let schema = options
            .metadata_table_schema
            .clone()
            .or_else(|| options.schemas.first().cloned());
        let store = Box::new(SqlMetadataTable::new(
            conn,
            schema,
            options.metadata_table_name.clone(),
            options.installed_by.clone(),
        ));
        Self::with_store(conn, options, scripts, store)
    }

    /// Build an orchestrator over a custom metadata store.
    pub fn with_store(
        conn: &'a dyn Connection,
        options: MigrationOptions,
        scripts: Vec<MigrationScript>,
        store: Box<dyn MetadataStore + 'a>,
    ) -> Self {
        Self {
            conn,
            options,
            scripts,
            store,
        }
    }

    /// Read-only dump of the metadata table, creating it if absent.
    pub async fn info(&self) -> EngineResult<Vec<AppliedMigration>> {
        self.store.create_if_not_exists().await?;
        Ok(self.store.all_metadata().await?)
    }

    /// Take the application lock (where the dialect has one), then the
    /// metadata-table lock. Either failure is fatal.
    pub(crate) async fn acquire_locks(&self) -> EngineResult<()> {
        let table = &self.options.metadata_table_name;
        let kind = self.conn.kind();
        if lock::has_application_lock(kind)
            && !lock::try_acquire_application_lock(self.conn, table).await
        {
            return Err(EngineError::Lock(format!(
                "another run holds the application lock for '{table}'"
            )));
        }
        if !self.store.try_lock().await {
            if lock::has_application_lock(kind)
                && !lock::release_application_lock(self.conn, table).await
            {
                log::warn!("failed to release the application lock for '{table}'");
            }
            return Err(EngineError::Lock(format!(
                "could not lock the metadata table '{table}'"
            )));
        }
        Ok(())
    }

    /// Release locks in reverse acquisition order. Release failures are
    /// logged, never raised.
    pub(crate) async fn release_locks(&self) {
        let table = &self.options.metadata_table_name;
        if !self.store.release_lock().await {
            log::warn!("failed to release the lock on metadata table '{table}'");
        }
        if lock::has_application_lock(self.conn.kind())
            && !lock::release_application_lock(self.conn, table).await
        {
            log::warn!("failed to release the application lock for '{table}'");
        }
    }

    /// First-contact bookkeeping for the managed schemas: create absent
    /// schemas, ensure the metadata table, then write the one-time
    /// NewSchema/EmptySchema markers. This is the only point markers are
    /// written; a schema found non-empty on first contact gets no marker and
    /// Erase will never touch it.
    pub(crate) async fn prepare_schemas(&self) -> EngineResult<()> {
        let mut created: Vec<&String> = Vec::new();
        let mut empty: Vec<&String> = Vec::new();
        for schema in &self.options.schemas {
            let adapter = adapter_for(self.conn, schema);
            if !adapter.exists().await? {
                if adapter.create().await? {
                    log::info!("created schema {schema}");
                    created.push(schema);
                }
            } else if adapter.is_empty().await? {
                empty.push(schema);
            }
        }

        // The metadata table may live in a schema created just above, so the
        // table (and the marker rows) can only come after the schema pass.
        self.store.create_if_not_exists().await?;

        for schema in created {
            if !self.store.can_drop(schema).await? {
                self.store
                    .save_marker(
                        MigrationKind::NewSchema,
                        None,
                        &format!("created schema \"{schema}\""),
                        schema,
                    )
                    .await?;
            }
        }
        for schema in empty {
            // The emptiness observed above predates our own table creation.
            if !self.store.can_erase(schema).await? && !self.store.can_drop(schema).await? {
                self.store
                    .save_marker(
                        MigrationKind::EmptySchema,
                        None,
                        &format!("schema \"{schema}\" is empty"),
                        schema,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
