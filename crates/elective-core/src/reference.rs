//! Reference data owned by external collaborators: students, subjects, slot
//! metas, the paper catalog, prior academic results, subject equivalence
//! tables and restricted groupings.
//!
//! The core only reads these records. [`ReferenceSource`] is the seam;
//! [`ReferenceData`] is an in-memory implementation loaded from JSON.

use std::{collections::BTreeSet, future::Future};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::category::{Category, Semester};

// ─── Records ─────────────────────────────────────────────────────────────────

/// The academic placement of a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentProfile {
  pub student_id:        Uuid,
  pub name:              String,
  pub program_course_id: Uuid,
  pub academic_year_id:  Uuid,
  /// Link to the student's prior (board) academic results, if any.
  pub academic_info_id:  Option<Uuid>,
  pub stream_id:         Uuid,
  pub class_id:          Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
  pub id:   Uuid,
  pub name: String,
  #[serde(default)]
  pub code: String,
}

/// Administrator-defined description of one selection slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionMeta {
  pub id:                 Uuid,
  /// Free text, e.g. `"Minor 2 (Semester III & IV)"`.
  pub label:              String,
  pub category:           Category,
  pub academic_year_id:   Uuid,
  /// Empty means the meta applies to every stream.
  #[serde(default)]
  pub applicable_streams: BTreeSet<Uuid>,
  /// Empty means the meta applies to every class.
  #[serde(default)]
  pub applicable_classes: BTreeSet<Uuid>,
}

impl SelectionMeta {
  pub fn applies_to(&self, student: &StudentProfile) -> bool {
    (self.applicable_streams.is_empty()
      || self.applicable_streams.contains(&student.stream_id))
      && (self.applicable_classes.is_empty()
        || self.applicable_classes.contains(&student.class_id))
  }
}

/// One optional paper of a program course's catalog, with its subject and
/// class already resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
  pub id:                Uuid,
  pub program_course_id: Uuid,
  pub academic_year_id:  Uuid,
  pub subject_id:        Uuid,
  pub subject_name:      String,
  #[serde(default)]
  pub subject_code:      String,
  pub category:          Category,
  pub class_id:          Uuid,
  /// e.g. `"Semester I"`; classified to find the paper's semester.
  pub class_name:        String,
  #[serde(default = "yes")]
  pub is_active:         bool,
  #[serde(default = "yes")]
  pub is_optional:       bool,
  #[serde(default)]
  pub is_auto_assign:    bool,
}

fn yes() -> bool { true }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
  Pass,
  Fail,
}

/// A subject from the student's prior (board) examination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicSubject {
  pub board_subject_name: String,
  pub result_status:      ResultStatus,
}

impl AcademicSubject {
  pub fn passed(&self) -> bool { self.result_status == ResultStatus::Pass }
}

/// All prior results recorded under one academic-info record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicRecord {
  pub academic_info_id: Uuid,
  pub subjects:         Vec<AcademicSubject>,
}

/// A board subject and the catalog subjects it qualifies a student for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedSubjectGroup {
  pub academic_year_id:     Uuid,
  pub program_course_id:    Uuid,
  /// The primary board subject name.
  pub board_subject_name:   String,
  /// The category this equivalence applies to.
  pub category:             Category,
  /// Alternate board subjects that also qualify.
  #[serde(default)]
  pub related_subject_subs: Vec<String>,
}

/// "`target` cannot be chosen together with any of `cannot_combine_with`"
/// within a category and a set of semesters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictedGroupingRule {
  pub academic_year_id:     Uuid,
  pub target_subject_id:    Uuid,
  pub category:             Category,
  /// Empty means the rule applies in every semester.
  #[serde(default)]
  pub applicable_semesters: BTreeSet<Semester>,
  pub cannot_combine_with:  BTreeSet<Uuid>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Read-only access to reference data.
///
/// All methods return `Send` futures so implementations can sit behind an
/// HTTP client or a database pool.
pub trait ReferenceSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  fn student(
    &self,
    student_id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentProfile>, Self::Error>> + Send + '_;

  fn subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Option<SubjectRef>, Self::Error>> + Send + '_;

  fn selection_meta(
    &self,
    meta_id: Uuid,
  ) -> impl Future<Output = Result<Option<SelectionMeta>, Self::Error>> + Send + '_;

  fn selection_metas(
    &self,
    academic_year_id: Uuid,
  ) -> impl Future<Output = Result<Vec<SelectionMeta>, Self::Error>> + Send + '_;

  /// Optional papers offered by a program course in an academic year.
  fn optional_papers(
    &self,
    program_course_id: Uuid,
    academic_year_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Paper>, Self::Error>> + Send + '_;

  fn academic_subjects(
    &self,
    academic_info_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AcademicSubject>, Self::Error>> + Send + '_;

  fn related_subjects(
    &self,
    academic_year_id: Uuid,
    program_course_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RelatedSubjectGroup>, Self::Error>> + Send + '_;

  fn restricted_groupings(
    &self,
    academic_year_id: Uuid,
  ) -> impl Future<Output = Result<Vec<RestrictedGroupingRule>, Self::Error>> + Send + '_;
}

// ─── In-memory source ────────────────────────────────────────────────────────

/// A complete reference snapshot held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceData {
  pub students:              Vec<StudentProfile>,
  pub subjects:              Vec<SubjectRef>,
  pub metas:                 Vec<SelectionMeta>,
  pub papers:                Vec<Paper>,
  pub academic_records:      Vec<AcademicRecord>,
  pub related_subjects:      Vec<RelatedSubjectGroup>,
  pub restricted_groupings:  Vec<RestrictedGroupingRule>,
}

impl ReferenceData {
  pub fn from_json(json: &str) -> crate::Result<Self> {
    Ok(serde_json::from_str(json)?)
  }
}

impl ReferenceSource for ReferenceData {
  type Error = crate::Error;

  async fn student(&self, student_id: Uuid) -> crate::Result<Option<StudentProfile>> {
    Ok(self.students.iter().find(|s| s.student_id == student_id).cloned())
  }

  async fn subject(&self, subject_id: Uuid) -> crate::Result<Option<SubjectRef>> {
    Ok(self.subjects.iter().find(|s| s.id == subject_id).cloned())
  }

  async fn selection_meta(&self, meta_id: Uuid) -> crate::Result<Option<SelectionMeta>> {
    Ok(self.metas.iter().find(|m| m.id == meta_id).cloned())
  }

  async fn selection_metas(&self, academic_year_id: Uuid) -> crate::Result<Vec<SelectionMeta>> {
    Ok(
      self
        .metas
        .iter()
        .filter(|m| m.academic_year_id == academic_year_id)
        .cloned()
        .collect(),
    )
  }

  async fn optional_papers(
    &self,
    program_course_id: Uuid,
    academic_year_id: Uuid,
  ) -> crate::Result<Vec<Paper>> {
    Ok(
      self
        .papers
        .iter()
        .filter(|p| {
          p.program_course_id == program_course_id
            && p.academic_year_id == academic_year_id
        })
        .cloned()
        .collect(),
    )
  }

  async fn academic_subjects(&self, academic_info_id: Uuid) -> crate::Result<Vec<AcademicSubject>> {
    Ok(
      self
        .academic_records
        .iter()
        .filter(|r| r.academic_info_id == academic_info_id)
        .flat_map(|r| r.subjects.iter().cloned())
        .collect(),
    )
  }

  async fn related_subjects(
    &self,
    academic_year_id: Uuid,
    program_course_id: Uuid,
  ) -> crate::Result<Vec<RelatedSubjectGroup>> {
    Ok(
      self
        .related_subjects
        .iter()
        .filter(|g| {
          g.academic_year_id == academic_year_id
            && g.program_course_id == program_course_id
        })
        .cloned()
        .collect(),
    )
  }

  async fn restricted_groupings(
    &self,
    academic_year_id: Uuid,
  ) -> crate::Result<Vec<RestrictedGroupingRule>> {
    Ok(
      self
        .restricted_groupings
        .iter()
        .filter(|r| r.academic_year_id == academic_year_id)
        .cloned()
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reference_json_fills_defaults() {
    let json = r#"{
      "subjects": [{ "id": "00000000-0000-0000-0000-000000000001", "name": "Physics" }],
      "papers": [{
        "id": "00000000-0000-0000-0000-0000000000a1",
        "program_course_id": "00000000-0000-0000-0000-0000000000c1",
        "academic_year_id": "00000000-0000-0000-0000-0000000000d1",
        "subject_id": "00000000-0000-0000-0000-000000000001",
        "subject_name": "Physics",
        "category": "MINOR",
        "class_id": "00000000-0000-0000-0000-0000000000e1",
        "class_name": "Semester I"
      }]
    }"#;
    let data = ReferenceData::from_json(json).unwrap();
    assert_eq!(data.subjects[0].code, "");
    let paper = &data.papers[0];
    assert!(paper.is_active && paper.is_optional && !paper.is_auto_assign);
    assert_eq!(paper.category, Category::Minor);
    assert!(data.metas.is_empty());
  }

  #[test]
  fn meta_applicability_treats_empty_sets_as_everyone() {
    let student = StudentProfile {
      student_id:        Uuid::new_v4(),
      name:              "A".into(),
      program_course_id: Uuid::new_v4(),
      academic_year_id:  Uuid::new_v4(),
      academic_info_id:  None,
      stream_id:         Uuid::new_v4(),
      class_id:          Uuid::new_v4(),
    };
    let mut meta = SelectionMeta {
      id:                 Uuid::new_v4(),
      label:              "Minor 1".into(),
      category:           Category::Minor,
      academic_year_id:   student.academic_year_id,
      applicable_streams: BTreeSet::new(),
      applicable_classes: BTreeSet::new(),
    };
    assert!(meta.applies_to(&student));

    meta.applicable_streams.insert(Uuid::new_v4());
    assert!(!meta.applies_to(&student));

    meta.applicable_streams.insert(student.stream_id);
    assert!(meta.applies_to(&student));
  }
}
