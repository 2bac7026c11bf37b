//! Diff engine: proposed selections → changed / unchanged slots.
//!
//! Only changed slots reach the version planner, so resubmitting an
//! identical set produces no new versions and no audit noise.

use std::collections::HashMap;

use uuid::Uuid;

use crate::selection::{ProposedSelection, StudentSelection};

/// A slot whose subject differs from the active record, or that has no
/// active record yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotChange {
  pub proposed: ProposedSelection,
  /// The active record being replaced, if any.
  pub current:  Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionDiff {
  pub changed:   Vec<SlotChange>,
  pub unchanged: Vec<ProposedSelection>,
}

impl SelectionDiff {
  pub fn is_noop(&self) -> bool { self.changed.is_empty() }
}

/// Partition `proposed` against the `current` records.
///
/// Only active records in `current` are considered, so full histories may be
/// passed as-is.
pub fn diff(current: &[StudentSelection], proposed: &[ProposedSelection]) -> SelectionDiff {
  let active: HashMap<Uuid, &StudentSelection> = current
    .iter()
    .filter(|s| s.is_active)
    .map(|s| (s.meta_id, s))
    .collect();

  let mut result = SelectionDiff::default();
  for p in proposed {
    match active.get(&p.meta_id) {
      Some(existing) if existing.subject_id == p.subject_id => result.unchanged.push(*p),
      Some(existing) => result.changed.push(SlotChange { proposed: *p, current: Some(existing.id) }),
      None => result.changed.push(SlotChange { proposed: *p, current: None }),
    }
  }
  result
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn active(meta_id: Uuid, subject_id: Uuid) -> StudentSelection {
    let now = Utc::now();
    StudentSelection {
      id: Uuid::new_v4(),
      student_id: Uuid::nil(),
      session_id: Uuid::nil(),
      meta_id,
      subject_id,
      version: 1,
      parent_id: None,
      previous_id: None,
      is_active: true,
      is_deprecated: false,
      created_by: Uuid::nil(),
      change_reason: None,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn identical_proposal_is_a_noop() {
    let current = vec![active(Uuid::new_v4(), Uuid::new_v4()), active(Uuid::new_v4(), Uuid::new_v4())];
    let proposed: Vec<ProposedSelection> = current.iter().map(StudentSelection::proposal).collect();
    let d = diff(&current, &proposed);
    assert!(d.is_noop());
    assert_eq!(d.unchanged, proposed);
  }

  #[test]
  fn changed_and_new_slots_are_separated() {
    let kept = active(Uuid::new_v4(), Uuid::new_v4());
    let swapped = active(Uuid::new_v4(), Uuid::new_v4());
    let new_meta = Uuid::new_v4();

    let proposed = [
      kept.proposal(),
      ProposedSelection { meta_id: swapped.meta_id, subject_id: Uuid::new_v4() },
      ProposedSelection { meta_id: new_meta, subject_id: Uuid::new_v4() },
    ];
    let d = diff(&[kept.clone(), swapped.clone()], &proposed);

    assert_eq!(d.unchanged, vec![kept.proposal()]);
    assert_eq!(d.changed.len(), 2);
    assert_eq!(d.changed[0].current, Some(swapped.id));
    assert_eq!(d.changed[1].current, None);
    assert_eq!(d.changed[1].proposed.meta_id, new_meta);
  }

  #[test]
  fn deprecated_records_are_not_current() {
    let mut old = active(Uuid::new_v4(), Uuid::new_v4());
    old.is_active = false;
    old.is_deprecated = true;
    let d = diff(&[old.clone()], &[old.proposal()]);
    assert_eq!(d.changed, vec![SlotChange { proposed: old.proposal(), current: None }]);
  }
}
