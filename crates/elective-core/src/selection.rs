//! Selection records: the versioned, append-only unit of the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── StudentSelection ────────────────────────────────────────────────────────

/// One version of a student's choice for one slot meta.
///
/// Records are never updated or deleted. `is_active`, `is_deprecated` and
/// `updated_at` are computed when the record is read, from the deprecation
/// ledger kept beside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSelection {
  pub id:            Uuid,
  pub student_id:    Uuid,
  pub session_id:    Uuid,
  pub meta_id:       Uuid,
  pub subject_id:    Uuid,
  /// Starts at 1 and increases by one per version within a lineage.
  pub version:       u32,
  /// The lineage's version-1 record; `None` on that record itself.
  pub parent_id:     Option<Uuid>,
  /// The version this record replaced, if any.
  pub previous_id:   Option<Uuid>,
  pub is_active:     bool,
  pub is_deprecated: bool,
  pub created_by:    Uuid,
  pub change_reason: Option<String>,
  pub created_at:    DateTime<Utc>,
  /// When the record was deprecated, or `created_at` while it is active.
  pub updated_at:    DateTime<Utc>,
}

impl StudentSelection {
  /// The id of the lineage root this record belongs to.
  pub fn root_id(&self) -> Uuid { self.parent_id.unwrap_or(self.id) }

  pub fn is_root(&self) -> bool { self.parent_id.is_none() }

  pub fn proposal(&self) -> ProposedSelection {
    ProposedSelection { meta_id: self.meta_id, subject_id: self.subject_id }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// A requested `(meta, subject)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposedSelection {
  pub meta_id:    Uuid,
  pub subject_id: Uuid,
}

/// The role of the caller creating a selection set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
  #[default]
  Student,
  Admin,
}

// ─── ValidationError ─────────────────────────────────────────────────────────

/// A non-fatal rule violation, reported against a form field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidationError {
  pub field:   String,
  pub message: String,
}

impl ValidationError {
  pub const GENERAL: &'static str = "general";

  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }

  pub fn general(message: impl Into<String>) -> Self {
    Self::new(Self::GENERAL, message)
  }
}
