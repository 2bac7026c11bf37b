//! Eligibility deriver: which catalog subjects a student may pick, per
//! category.
//!
//! A paper is offered when the student's prior results qualify them for its
//! subject. Qualification is looked up through the related-subject
//! equivalence table first, then by matching prior subjects directly. Exempt
//! categories (AEC and IDC by default) introduce new skill areas and are
//! never gated on prior results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
  category::{Category, Semester},
  classify::classify_semesters,
  config::EngineConfig,
  fuzzy::SubjectMatcher,
  reference::{AcademicSubject, Paper, RelatedSubjectGroup},
  slot::Slot,
};

// ─── Output ──────────────────────────────────────────────────────────────────

/// One subject a student may pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectOption {
  pub subject_id:     Uuid,
  pub paper_id:       Uuid,
  pub name:           String,
  pub code:           String,
  pub semester:       Semester,
  pub is_mandatory:   bool,
  pub is_auto_assign: bool,
}

impl SubjectOption {
  /// Blank placeholder entries do not count as a real option.
  pub fn is_real(&self) -> bool { !self.name.trim().is_empty() }
}

/// The options of one category. Never persisted; `id` is derived from the
/// category code so it is stable between calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOptions {
  pub id:       Uuid,
  pub category: Category,
  pub options:  Vec<SubjectOption>,
}

/// Eligible options for one student, keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Eligibility {
  pub categories: BTreeMap<Category, CategoryOptions>,
}

impl Eligibility {
  pub fn options(&self, category: Category) -> &[SubjectOption] {
    self
      .categories
      .get(&category)
      .map(|c| c.options.as_slice())
      .unwrap_or_default()
  }

  /// Options that belong in `slot`: same category, covered semester.
  pub fn options_for(&self, slot: Slot) -> impl Iterator<Item = &SubjectOption> {
    self
      .options(slot.category())
      .iter()
      .filter(move |o| slot.covers(o.semester))
  }

  pub fn has_real_options(&self, slot: Slot) -> bool {
    self.options_for(slot).any(SubjectOption::is_real)
  }

  fn push(&mut self, category: Category, option: SubjectOption) {
    let entry = self.categories.entry(category).or_insert_with(|| CategoryOptions {
      id: category.synthetic_id(),
      category,
      options: Vec::new(),
    });
    let duplicate = entry
      .options
      .iter()
      .any(|o| o.subject_id == option.subject_id && o.semester == option.semester);
    if !duplicate {
      entry.options.push(option);
    }
  }
}

// ─── Deriver ─────────────────────────────────────────────────────────────────

/// The raw inputs for one student, as fetched from the reference source.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityInputs<'a> {
  pub papers:  &'a [Paper],
  pub history: &'a [AcademicSubject],
  pub groups:  &'a [RelatedSubjectGroup],
}

#[derive(Debug, Clone)]
pub struct EligibilityDeriver {
  matcher: SubjectMatcher,
  config:  EngineConfig,
}

impl EligibilityDeriver {
  pub fn new(config: &EngineConfig) -> Self {
    Self {
      matcher: config.matcher(),
      config:  config.clone(),
    }
  }

  pub fn derive(&self, inputs: EligibilityInputs<'_>) -> Eligibility {
    let mut eligibility = Eligibility::default();

    for paper in inputs.papers.iter().filter(|p| p.is_active) {
      let semesters = classify_semesters(&paper.class_name);
      if semesters.is_empty() {
        debug!(
          paper_id = %paper.id,
          class_name = %paper.class_name,
          "skipping paper: class name names no semester"
        );
        continue;
      }

      let exempt = self.config.is_exempt(paper.category);
      let offered = match self.find_group(paper, inputs.groups) {
        Some(group) => self.qualifies_through_group(group, inputs.history, exempt),
        None => self.qualifies_directly(paper, inputs.history, exempt),
      };
      if !offered {
        debug!(paper_id = %paper.id, subject = %paper.subject_name, "paper not offered");
        continue;
      }

      for semester in semesters {
        eligibility.push(paper.category, SubjectOption {
          subject_id: paper.subject_id,
          paper_id: paper.id,
          name: paper.subject_name.clone(),
          code: paper.subject_code.clone(),
          semester,
          is_mandatory: !paper.is_optional,
          is_auto_assign: paper.is_auto_assign,
        });
      }
    }

    eligibility
  }

  fn find_group<'g>(
    &self,
    paper: &Paper,
    groups: &'g [RelatedSubjectGroup],
  ) -> Option<&'g RelatedSubjectGroup> {
    groups.iter().find(|g| {
      g.category == paper.category
        && self.matcher.matches(&g.board_subject_name, &paper.subject_name)
    })
  }

  /// The latest result for a prior subject matching `name` decides:
  /// a later FAIL withdraws an earlier PASS and vice versa.
  fn last_result(&self, name: &str, history: &[AcademicSubject]) -> Option<bool> {
    history
      .iter()
      .filter(|h| self.matcher.matches(&h.board_subject_name, name))
      .fold(None, |_, h| Some(h.passed()))
  }

  fn qualifies_through_group(
    &self,
    group: &RelatedSubjectGroup,
    history: &[AcademicSubject],
    exempt: bool,
  ) -> bool {
    if exempt {
      return true;
    }
    if let Some(passed) = self.last_result(&group.board_subject_name, history) {
      return passed;
    }
    group.related_subject_subs.iter().any(|sub| {
      history
        .iter()
        .any(|h| h.passed() && self.matcher.matches(&h.board_subject_name, sub))
    })
  }

  fn qualifies_directly(
    &self,
    paper: &Paper,
    history: &[AcademicSubject],
    exempt: bool,
  ) -> bool {
    if exempt {
      return true;
    }
    // No prior subject of the same name: nothing to gate on.
    self
      .last_result(&paper.subject_name, history)
      .unwrap_or(true)
  }
}
