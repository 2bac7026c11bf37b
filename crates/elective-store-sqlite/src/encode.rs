//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 with fixed microsecond precision and a `Z`
//! suffix, so lexical order in SQL matches chronological order. UUIDs are
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use elective_core::selection::StudentSelection;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns selected by every selection query, in `RawSelection` order.
pub const SELECTION_COLUMNS: &str = "
  s.selection_id, s.student_id, s.session_id, s.meta_id, s.subject_id,
  s.version, s.parent_id, s.previous_id, s.created_by, s.change_reason,
  s.created_at, d.recorded_at AS deprecated_at";

/// Raw strings read from a `selections` row joined with `deprecations`.
pub struct RawSelection {
  pub selection_id:  String,
  pub student_id:    String,
  pub session_id:    String,
  pub meta_id:       String,
  pub subject_id:    String,
  pub version:       i64,
  pub parent_id:     Option<String>,
  pub previous_id:   Option<String>,
  pub created_by:    String,
  pub change_reason: Option<String>,
  pub created_at:    String,
  // deprecations join
  pub deprecated_at: Option<String>,
}

impl RawSelection {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      selection_id:  row.get(0)?,
      student_id:    row.get(1)?,
      session_id:    row.get(2)?,
      meta_id:       row.get(3)?,
      subject_id:    row.get(4)?,
      version:       row.get(5)?,
      parent_id:     row.get(6)?,
      previous_id:   row.get(7)?,
      created_by:    row.get(8)?,
      change_reason: row.get(9)?,
      created_at:    row.get(10)?,
      deprecated_at: row.get(11)?,
    })
  }

  pub fn into_selection(self) -> Result<StudentSelection> {
    let version = u32::try_from(self.version)
      .map_err(|_| Error::Decode(format!("version {} out of range", self.version)))?;
    let created_at = decode_dt(&self.created_at)?;
    let deprecated_at = self.deprecated_at.as_deref().map(decode_dt).transpose()?;

    Ok(StudentSelection {
      id: decode_uuid(&self.selection_id)?,
      student_id: decode_uuid(&self.student_id)?,
      session_id: decode_uuid(&self.session_id)?,
      meta_id: decode_uuid(&self.meta_id)?,
      subject_id: decode_uuid(&self.subject_id)?,
      version,
      parent_id: self.parent_id.as_deref().map(decode_uuid).transpose()?,
      previous_id: self.previous_id.as_deref().map(decode_uuid).transpose()?,
      is_active: deprecated_at.is_none(),
      is_deprecated: deprecated_at.is_some(),
      created_by: decode_uuid(&self.created_by)?,
      change_reason: self.change_reason,
      created_at,
      updated_at: deprecated_at.unwrap_or(created_at),
    })
  }
}
