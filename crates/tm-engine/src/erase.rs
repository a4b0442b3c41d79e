//! The Erase pipeline.
//!
//! The engine only destroys what it established ownership of on first
//! contact: a schema with a NewSchema marker is dropped outright, one with
//! an EmptySchema marker has its contents erased, and a schema with neither
//! marker is left untouched.

use crate::error::{EngineError, EngineResult};
use crate::migrator::Migrator;
use crate::summary::EraseSummary;
use tm_meta::schema::adapter_for;

impl Migrator<'_> {
    pub async fn erase(&self) -> EngineResult<EraseSummary> {
        if self.options.erase_disabled {
            return Err(EngineError::Configuration(
                "erase is disabled by configuration".to_string(),
            ));
        }
        self.acquire_locks().await?;
        let outcome = self.erase_locked().await;
        self.release_locks().await;
        outcome
    }

    async fn erase_locked(&self) -> EngineResult<EraseSummary> {
        self.store.create_if_not_exists().await?;
        let schemas_erased = self.erase_schemas().await?;
        Ok(EraseSummary { schemas_erased })
    }

    /// Shared with the erase-on-validation-error restart inside Migrate,
    /// which runs it under Migrate's own locks.
    pub(crate) async fn erase_schemas(&self) -> EngineResult<Vec<String>> {
        let mut erased = Vec::new();
        for schema in &self.options.schemas {
            let adapter = adapter_for(self.conn, schema);
            if self.store.can_drop(schema).await? {
                log::info!("dropping schema {schema}");
                adapter.drop_schema().await?;
                erased.push(schema.clone());
            } else if self.store.can_erase(schema).await? {
                log::info!("erasing contents of schema {schema}");
                adapter.erase().await?;
                erased.push(schema.clone());
            } else {
                log::info!("schema {schema} has no ownership marker, leaving it untouched");
            }
        }
        Ok(erased)
    }
}

#[cfg(test)]
#[path = "erase_test.rs"]
mod tests;
