//! Migration records and the persisted metadata-row mirror.

use crate::checksum::compute_checksum;
use crate::error::{CoreError, CoreResult};
use crate::options::MigrationOptions;
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// What a metadata row is about.
///
/// `NewSchema`, `EmptySchema`, and `StartVersion` are marker kinds: audit
/// facts the engine writes about itself, never scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationKind {
    Versioned,
    Repeatable,
    NewSchema,
    EmptySchema,
    StartVersion,
}

impl MigrationKind {
    /// Stable small-integer tag stored in the metadata `type` column.
    pub fn tag(self) -> i64 {
        match self {
            MigrationKind::Versioned => 1,
            MigrationKind::Repeatable => 2,
            MigrationKind::NewSchema => 3,
            MigrationKind::EmptySchema => 4,
            MigrationKind::StartVersion => 5,
        }
    }

    /// Inverse of [`tag`](Self::tag). Unknown tags yield `None`.
    pub fn from_tag(tag: i64) -> Option<Self> {
        match tag {
            1 => Some(MigrationKind::Versioned),
            2 => Some(MigrationKind::Repeatable),
            3 => Some(MigrationKind::NewSchema),
            4 => Some(MigrationKind::EmptySchema),
            5 => Some(MigrationKind::StartVersion),
            _ => None,
        }
    }

    /// True for the bookkeeping kinds that never correspond to a script.
    pub fn is_marker(self) -> bool {
        matches!(
            self,
            MigrationKind::NewSchema | MigrationKind::EmptySchema | MigrationKind::StartVersion
        )
    }
}

/// An immutable migration script handed to the engine by the discovery
/// collaborator.
///
/// Versioned scripts order by [`Version`]; repeatable scripts have no version
/// and order by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationScript {
    version: Option<Version>,
    description: String,
    name: String,
    content: String,
    checksum: String,
    kind: MigrationKind,
}

impl MigrationScript {
    /// Build a versioned migration. The checksum is computed here, over the
    /// raw content.
    pub fn versioned(
        version: Version,
        description: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let checksum = compute_checksum(&content);
        Self {
            version: Some(version),
            description: description.into(),
            name: name.into(),
            content,
            checksum,
            kind: MigrationKind::Versioned,
        }
    }

    /// Build a repeatable migration (no version).
    pub fn repeatable(
        description: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let checksum = compute_checksum(&content);
        Self {
            version: None,
            description: description.into(),
            name: name.into(),
            content,
            checksum,
            kind: MigrationKind::Repeatable,
        }
    }

    /// Build a migration from a file name per the naming contract:
    /// `<prefix><version><separator><description><suffix>` for versioned
    /// scripts, `<repeatable_prefix><separator><description><suffix>` for
    /// repeatable ones. Underscores in the description render as spaces.
    ///
    /// Malformed names are configuration errors, never silently skipped.
    pub fn from_name(
        name: &str,
        content: impl Into<String>,
        options: &MigrationOptions,
    ) -> CoreResult<Self> {
        let stem = name
            .strip_suffix(options.sql_migration_suffix.as_str())
            .ok_or_else(|| CoreError::InvalidName {
                name: name.to_string(),
                reason: format!("missing suffix '{}'", options.sql_migration_suffix),
            })?;

        let repeatable_start = format!(
            "{}{}",
            options.sql_repeatable_prefix, options.sql_migration_separator
        );
        if let Some(description) = stem.strip_prefix(repeatable_start.as_str()) {
            if description.is_empty() {
                return Err(CoreError::InvalidName {
                    name: name.to_string(),
                    reason: "empty description".to_string(),
                });
            }
            return Ok(Self::repeatable(
                description.replace('_', " "),
                name,
                content,
            ));
        }

        let rest = stem
            .strip_prefix(options.sql_migration_prefix.as_str())
            .ok_or_else(|| CoreError::InvalidName {
                name: name.to_string(),
                reason: format!(
                    "expected prefix '{}' or '{}'",
                    options.sql_migration_prefix, repeatable_start
                ),
            })?;
        let (label, description) = rest
            .split_once(options.sql_migration_separator.as_str())
            .ok_or_else(|| CoreError::InvalidName {
                name: name.to_string(),
                reason: format!(
                    "missing separator '{}'",
                    options.sql_migration_separator
                ),
            })?;
        if description.is_empty() {
            return Err(CoreError::InvalidName {
                name: name.to_string(),
                reason: "empty description".to_string(),
            });
        }

        let version = Version::parse(label)?;
        Ok(Self::versioned(
            version,
            description.replace('_', " "),
            name,
            content,
        ))
    }

    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn kind(&self) -> MigrationKind {
        self.kind
    }
}

impl PartialOrd for MigrationScript {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MigrationScript {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.version, &other.version) {
            (Some(a), Some(b)) => a.cmp(b),
            // Repeatable migrations order by name, after versioned ones.
            (None, None) => self.name.cmp(&other.name),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
        }
    }
}

/// A persisted metadata row: one applied (or attempted) migration, or one
/// marker the engine wrote about its environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppliedMigration {
    /// Monotonic id assigned by storage.
    pub id: i64,
    pub kind: MigrationKind,
    /// None for repeatable migrations and for markers without a version.
    pub version: Option<Version>,
    pub description: String,
    pub name: String,
    pub checksum: Option<String>,
    pub installed_by: String,
    pub installed_on: DateTime<Utc>,
    pub success: bool,
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
