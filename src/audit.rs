//! Field-level change tracking for application edits.
//!
//! Records are compared as flat JSON objects. Only keys whose values actually
//! differ are reported.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Added,
    Modified,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub change_type: ChangeType,
}

/// Compare two versions of a record. Output is ordered by field name.
pub fn diff_fields(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<FieldChange> {
    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();

    keys.into_iter()
        .filter_map(|field| {
            let old_value = old.get(field);
            let new_value = new.get(field);

            let change_type = match (old_value, new_value) {
                (None, Some(_)) => ChangeType::Added,
                (Some(_), None) => ChangeType::Removed,
                (Some(a), Some(b)) if a != b => ChangeType::Modified,
                _ => return None,
            };

            Some(FieldChange {
                field: field.clone(),
                old_value: old_value.cloned(),
                new_value: new_value.cloned(),
                change_type,
            })
        })
        .collect()
}

/// One audit log row: who changed which record, and how.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub record_id: Uuid,
    pub user_id: Uuid,
    pub changed_at: DateTime<Utc>,
    pub changes: Vec<FieldChange>,
}

impl AuditEntry {
    /// Returns `None` when the update touched nothing.
    pub fn from_update(
        record_id: Uuid,
        user_id: Uuid,
        old: &Map<String, Value>,
        new: &Map<String, Value>,
        changed_at: DateTime<Utc>,
    ) -> Option<Self> {
        let changes = diff_fields(old, new);
        if changes.is_empty() {
            return None;
        }

        tracing::debug!("Record {} changed {} fields", record_id, changes.len());
        Some(Self {
            record_id,
            user_id,
            changed_at,
            changes,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.iter().map(|c| c.field.as_str())
    }
}
