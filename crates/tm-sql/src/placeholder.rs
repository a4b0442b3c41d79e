//! Placeholder substitution.

use std::collections::HashMap;

/// A configured placeholder map: token = `prefix + key + suffix`, replaced by
/// literal substring substitution before statement splitting.
#[derive(Debug, Clone, Default)]
pub struct Placeholders {
    prefix: String,
    suffix: String,
    map: HashMap<String, String>,
}

impl Placeholders {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        map: HashMap<String, String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            map,
        }
    }

    /// An empty map; `apply` is then the identity.
    pub fn none() -> Self {
        Self::default()
    }

    /// Replace every configured token in `raw`. Unknown tokens are left
    /// untouched; there is no escaping syntax.
    pub fn apply(&self, raw: &str) -> String {
        let mut out = raw.to_string();
        for (key, value) in &self.map {
            let token = format!("{}{}{}", self.prefix, key, self.suffix);
            out = out.replace(&token, value);
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
#[path = "placeholder_test.rs"]
mod tests;
