//! Version planning for the append-only selection ledger.
//!
//! Lineages form a star: every non-root record's `parent_id` is the
//! version-1 record, while `previous_id` points at the version it replaced.
//! The planner turns diff output into a [`VersionBatch`] that a
//! [`SelectionStore`](crate::store::SelectionStore) commits atomically.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  diff::SlotChange,
  selection::{ProposedSelection, StudentSelection},
};

// ─── Batch ───────────────────────────────────────────────────────────────────

/// Marks an active record as no longer current.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deprecation {
  pub selection_id:  Uuid,
  /// The record that replaces it; `None` when the slot was dropped.
  pub superseded_by: Option<Uuid>,
  pub reason:        Option<String>,
}

/// Everything one request writes. Committed all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBatch {
  pub student_id:  Uuid,
  pub session_id:  Uuid,
  pub recorded_at: DateTime<Utc>,
  pub append:      Vec<StudentSelection>,
  pub deprecate:   Vec<Deprecation>,
}

impl VersionBatch {
  pub fn is_empty(&self) -> bool { self.append.is_empty() && self.deprecate.is_empty() }
}

/// Who is writing, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorship {
  pub user_id: Uuid,
  pub reason:  Option<String>,
}

// ─── Lineages ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Lineage<'a> {
  root:   &'a StudentSelection,
  latest: &'a StudentSelection,
}

/// Group `history` by meta. The root is the version-1 record, falling back
/// to the earliest record if the ledger has no version 1.
fn lineages(history: &[StudentSelection]) -> HashMap<Uuid, Lineage<'_>> {
  let mut out: HashMap<Uuid, Lineage<'_>> = HashMap::new();
  for record in history {
    out
      .entry(record.meta_id)
      .and_modify(|l| {
        let root_key = (l.root.version != 1, l.root.created_at, l.root.version);
        if (record.version != 1, record.created_at, record.version) < root_key {
          l.root = record;
        }
        if record.version > l.latest.version {
          l.latest = record;
        }
      })
      .or_insert(Lineage { root: record, latest: record });
  }
  out
}

// ─── Planner ─────────────────────────────────────────────────────────────────

/// Builds new ledger records for one `(student, session)`.
pub struct VersionPlanner<'h> {
  student_id: Uuid,
  session_id: Uuid,
  history:    &'h [StudentSelection],
  lineages:   HashMap<Uuid, Lineage<'h>>,
  now:        DateTime<Utc>,
}

impl<'h> VersionPlanner<'h> {
  /// `history` is every record of the session, deprecated ones included.
  pub fn new(
    student_id: Uuid,
    session_id: Uuid,
    history: &'h [StudentSelection],
    now: DateTime<Utc>,
  ) -> Self {
    Self { student_id, session_id, history, lineages: lineages(history), now }
  }

  fn next_record(&self, p: ProposedSelection, author: &Authorship) -> StudentSelection {
    let (version, parent_id, previous_id) = match self.lineages.get(&p.meta_id) {
      Some(l) => (l.latest.version + 1, Some(l.root.root_id()), Some(l.latest.id)),
      None => (1, None, None),
    };
    StudentSelection {
      id: Uuid::new_v4(),
      student_id: self.student_id,
      session_id: self.session_id,
      meta_id: p.meta_id,
      subject_id: p.subject_id,
      version,
      parent_id,
      previous_id,
      is_active: true,
      is_deprecated: false,
      created_by: author.user_id,
      change_reason: author.reason.clone(),
      created_at: self.now,
      updated_at: self.now,
    }
  }

  fn empty_batch(&self) -> VersionBatch {
    VersionBatch {
      student_id:  self.student_id,
      session_id:  self.session_id,
      recorded_at: self.now,
      append:      Vec::new(),
      deprecate:   Vec::new(),
    }
  }

  /// Append a new version for every changed slot and deprecate the record
  /// it replaces. Unchanged slots are never touched.
  pub fn plan_update(&self, changes: &[SlotChange], author: &Authorship) -> VersionBatch {
    let mut batch = self.empty_batch();
    for change in changes {
      let record = self.next_record(change.proposed, author);
      if let Some(current) = change.current {
        batch.deprecate.push(Deprecation {
          selection_id:  current,
          superseded_by: Some(record.id),
          reason:        author.reason.clone(),
        });
      }
      batch.append.push(record);
    }
    batch
  }

  /// Deprecate every active record of the session and write `proposed` as
  /// the new set. Metas with history continue their lineage; unseen metas
  /// start at version 1.
  pub fn plan_replacement(&self, proposed: &[ProposedSelection], author: &Authorship) -> VersionBatch {
    let mut batch = self.empty_batch();
    let mut replacements: HashMap<Uuid, Uuid> = HashMap::new();
    for p in proposed {
      let record = self.next_record(*p, author);
      replacements.insert(p.meta_id, record.id);
      batch.append.push(record);
    }
    for active in self.history.iter().filter(|s| s.is_active) {
      batch.deprecate.push(Deprecation {
        selection_id:  active.id,
        superseded_by: replacements.get(&active.meta_id).copied(),
        reason:        author.reason.clone(),
      });
    }
    batch
  }
}

// ─── Audit ───────────────────────────────────────────────────────────────────

/// A broken ledger invariant found by [`audit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineageViolation {
  MultipleActive { meta_id: Uuid, count: usize },
  VersionGap { meta_id: Uuid, expected: u32, found: u32 },
  WrongParent { selection_id: Uuid, expected: Option<Uuid>, found: Option<Uuid> },
}

/// Check the ledger invariants for the records of one `(student, session)`:
/// at most one active record per meta, versions `1..=n` without gaps, and
/// every non-root record parented on the version-1 record.
pub fn audit(history: &[StudentSelection]) -> Vec<LineageViolation> {
  let mut by_meta: BTreeMap<Uuid, Vec<&StudentSelection>> = BTreeMap::new();
  for record in history {
    by_meta.entry(record.meta_id).or_default().push(record);
  }

  let mut violations = Vec::new();
  for (meta_id, mut records) in by_meta {
    records.sort_by_key(|r| r.version);

    let count = records.iter().filter(|r| r.is_active).count();
    if count > 1 {
      violations.push(LineageViolation::MultipleActive { meta_id, count });
    }

    for (expected, record) in (1u32..).zip(&records) {
      if record.version != expected {
        violations.push(LineageViolation::VersionGap { meta_id, expected, found: record.version });
        break;
      }
    }

    let root = records.iter().find(|r| r.version == 1).map(|r| r.id);
    for record in &records {
      let expected = if record.version == 1 { None } else { root };
      if record.parent_id != expected {
        violations.push(LineageViolation::WrongParent {
          selection_id: record.id,
          expected,
          found: record.parent_id,
        });
      }
    }
  }
  violations
}
