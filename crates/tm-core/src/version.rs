//! Migration version labels.
//!
//! A [`Version`] is the ordered list of non-negative integers parsed from a
//! migration file name, e.g. `1_2_3` or `2026.08.1`. The original label text
//! is kept for display but plays no part in equality or ordering.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An ordered, comparable migration version.
///
/// Ordering is lexicographic over the integer parts with prefix-is-lesser:
/// `1.1 < 1.1.0 < 2`. Equality requires identical parts *and* identical
/// part count, so `Version::parse("1")? != Version::parse("1.0")?` even
/// though neither orders before the other by value alone.
#[derive(Debug, Clone)]
pub struct Version {
    label: String,
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version label by splitting on `.` or `_`.
    ///
    /// Empty parts, leading/trailing separators, and non-numeric parts are
    /// rejected as configuration errors.
    pub fn parse(label: &str) -> CoreResult<Self> {
        if label.is_empty() {
            return Err(CoreError::InvalidVersion {
                label: label.to_string(),
                reason: "empty label".to_string(),
            });
        }

        let mut parts = Vec::new();
        for part in label.split(['.', '_']) {
            if part.is_empty() {
                return Err(CoreError::InvalidVersion {
                    label: label.to_string(),
                    reason: "empty part (leading, trailing, or doubled separator)".to_string(),
                });
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::InvalidVersion {
                    label: label.to_string(),
                    reason: format!("non-numeric part '{part}'"),
                });
            }
            let n = part.parse::<u64>().map_err(|e| CoreError::InvalidVersion {
                label: label.to_string(),
                reason: e.to_string(),
            })?;
            parts.push(n);
        }

        Ok(Self {
            label: label.to_string(),
            parts,
        })
    }

    /// The minimum sentinel version, ordering before every parseable label.
    ///
    /// Used as the floor where "no version applied yet" needs a value.
    pub fn min() -> Self {
        Self {
            label: "0".to_string(),
            parts: vec![0],
        }
    }

    /// The original label text.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The parsed integer parts.
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Vec<u64> already compares element-wise with prefix-is-lesser.
        self.parts.cmp(&other.parts)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Version::parse(&label).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
