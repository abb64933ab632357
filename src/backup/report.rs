//! Restore report: what was actually inserted, what was skipped, and why.

use serde::Serialize;
use std::fmt;

use crate::constants::UNKNOWN_TIMESTAMP;

/// Per-entity-type row counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub settings: u64,
    pub groups: u64,
    pub branches: u64,
    pub categories: u64,
    pub suppliers: u64,
    pub users: u64,
    pub sales: u64,
}

/// Non-fatal conditions hit during restore. These never abort the
/// transaction; they explain why a record is absent or was altered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RestoreWarning {
    /// A dependent record named a parent that does not exist among the
    /// freshly restored entities; the record (or list entry) was skipped.
    UnresolvedReference {
        entity: String,
        record: String,
        reference: String,
    },
    /// The archived password failed the minimum-length sanity check and
    /// was replaced with the fallback hash.
    WeakOrMissingPassword { username: String },
    /// A later record in the batch reused a name (case-insensitive);
    /// the first occurrence won.
    DuplicateName { entity: String, name: String },
    /// The record had no usable name and was skipped.
    MissingName { entity: String },
    /// A permission string outside the known set was dropped.
    UnknownPermission { group: String, permission: String },
    /// An entity type absent from the archive was still cleared because
    /// a type it references was replaced.
    DependentCleared { entity: String },
}

impl fmt::Display for RestoreWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreWarning::UnresolvedReference { entity, record, reference } => {
                write!(f, "{entity} '{record}': reference '{reference}' not found, skipping")
            }
            RestoreWarning::WeakOrMissingPassword { username } => {
                write!(f, "user '{username}': archived password is not a valid hash, fallback password assigned")
            }
            RestoreWarning::DuplicateName { entity, name } => {
                write!(f, "{entity} '{name}': duplicate name in archive, keeping the first occurrence")
            }
            RestoreWarning::MissingName { entity } => {
                write!(f, "{entity} record without a name, skipping")
            }
            RestoreWarning::UnknownPermission { group, permission } => {
                write!(f, "group '{group}': unknown permission '{permission}' dropped")
            }
            RestoreWarning::DependentCleared { entity } => {
                write!(f, "{entity} cleared because a referenced entity type was replaced, but the archive has no {entity} to restore")
            }
        }
    }
}

/// Summary returned to the operator after a successful restore.
///
/// Counts reflect rows actually inserted, not archive sizes; skipped
/// records appear in `skipped` and are explained by `warnings`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub success: bool,
    pub message: String,
    pub restored: EntityCounts,
    pub skipped: EntityCounts,
    pub warnings: Vec<RestoreWarning>,
    pub timestamp: String,
}

impl RestoreReport {
    pub(crate) fn new(timestamp: Option<&str>) -> Self {
        Self {
            success: true,
            message: "Data restored successfully".to_string(),
            restored: EntityCounts::default(),
            skipped: EntityCounts::default(),
            warnings: Vec::new(),
            timestamp: timestamp.unwrap_or(UNKNOWN_TIMESTAMP).to_string(),
        }
    }

    /// Record a warning and log it.
    pub(crate) fn warn(&mut self, warning: RestoreWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}
