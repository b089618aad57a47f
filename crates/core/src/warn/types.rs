use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Persisted warning counts: guild id -> user id -> count.
///
/// Counts are only ever incremented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarnLedger(BTreeMap<String, BTreeMap<String, u64>>);

impl WarnLedger {
    pub fn count(&self, guild_id: &str, user_id: &str) -> u64 {
        self.0
            .get(guild_id)
            .and_then(|users| users.get(user_id))
            .copied()
            .unwrap_or(0)
    }

    /// Increments the counter and returns the new value.
    pub fn increment(&mut self, guild_id: &str, user_id: &str) -> u64 {
        let count = self
            .0
            .entry(guild_id.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_insert(0);
        *count += 1;
        *count
    }

    pub fn guild(&self, guild_id: &str) -> Option<&BTreeMap<String, u64>> {
        self.0.get(guild_id)
    }
}

/// A structured notice posted by another bot, reduced to what the counter
/// needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningNotice {
    pub author_name: Option<String>,
    pub fields: Vec<NoticeField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
}

impl WarningNotice {
    pub fn new(author_name: impl Into<String>) -> Self {
        Self {
            author_name: Some(author_name.into()),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}
