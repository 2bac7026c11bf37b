//! `SelectionService`: the orchestration layer.
//!
//! Fetches reference data, runs the eligibility deriver and the validator,
//! and turns accepted proposals into version batches for the store. Every
//! write path validates first; a rejected request never touches the ledger.

use std::{
  collections::{BTreeSet, HashSet},
  sync::Arc,
};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  category::Semester,
  classify::{SlotTag, classify},
  config::EngineConfig,
  diff::diff,
  eligibility::{Eligibility, EligibilityDeriver, EligibilityInputs},
  error::{Error, Result},
  reference::{ReferenceSource, SelectionMeta, StudentProfile, SubjectRef},
  selection::{ProposedSelection, Role, StudentSelection, ValidationError},
  slot::Slot,
  store::SelectionStore,
  validate::{RestrictionMap, SlotChoice, validate},
  version::{Authorship, VersionPlanner, audit},
};

/// A label run through the classifier, with the slot it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLabel {
  #[serde(flatten)]
  pub tag:  SlotTag,
  pub slot: Option<Slot>,
}

/// A selection meta annotated with its classified semesters and slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedMeta {
  #[serde(flatten)]
  pub meta:      SelectionMeta,
  pub semesters: BTreeSet<Semester>,
  pub slot:      Option<Slot>,
}

impl ClassifiedMeta {
  fn new(meta: SelectionMeta) -> Self {
    let tag = classify(&meta.label);
    let slot = Slot::resolve(meta.category, &tag);
    Self { meta, semesters: tag.semesters, slot }
  }
}

pub struct SelectionService<S, R> {
  store:   Arc<S>,
  refs:    Arc<R>,
  deriver: EligibilityDeriver,
}

impl<S, R> SelectionService<S, R>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  pub fn new(store: Arc<S>, refs: Arc<R>, config: &EngineConfig) -> Self {
    Self { store, refs, deriver: EligibilityDeriver::new(config) }
  }

  // ─── Reference lookups ───────────────────────────────────────────────────

  async fn student(&self, student_id: Uuid) -> Result<StudentProfile> {
    self
      .refs
      .student(student_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::StudentNotFound(student_id))
  }

  async fn meta(&self, meta_id: Uuid) -> Result<SelectionMeta> {
    self
      .refs
      .selection_meta(meta_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::MetaNotFound(meta_id))
  }

  async fn subject(&self, subject_id: Uuid) -> Result<SubjectRef> {
    self
      .refs
      .subject(subject_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::SubjectNotFound(subject_id))
  }

  // ─── Eligibility ─────────────────────────────────────────────────────────

  /// The subjects a student may pick, grouped by category.
  pub async fn eligibility(&self, student_id: Uuid) -> Result<Eligibility> {
    let student = self.student(student_id).await?;
    self.eligibility_for(&student).await
  }

  async fn eligibility_for(&self, student: &StudentProfile) -> Result<Eligibility> {
    let papers = self
      .refs
      .optional_papers(student.program_course_id, student.academic_year_id)
      .await
      .map_err(Into::<Error>::into)?;

    // No academic record means no history to filter on.
    let history = match student.academic_info_id {
      Some(id) => self.refs.academic_subjects(id).await.map_err(Into::<Error>::into)?,
      None => Vec::new(),
    };

    let groups = self
      .refs
      .related_subjects(student.academic_year_id, student.program_course_id)
      .await
      .map_err(Into::<Error>::into)?;

    let eligibility = self.deriver.derive(EligibilityInputs {
      papers:  &papers,
      history: &history,
      groups:  &groups,
    });
    debug!(
      student_id = %student.student_id,
      papers = papers.len(),
      categories = eligibility.categories.len(),
      "derived eligibility"
    );
    Ok(eligibility)
  }

  // ─── Validation ──────────────────────────────────────────────────────────

  /// Validate a proposal without writing anything.
  ///
  /// Unknown metas or subjects are errors (not validation failures); every
  /// other problem is reported in the returned list, which is empty when the
  /// proposal would be accepted.
  pub async fn validate_selections(
    &self,
    student_id: Uuid,
    proposal: &[ProposedSelection],
  ) -> Result<Vec<ValidationError>> {
    let student = self.student(student_id).await?;
    self.check(&student, proposal).await
  }

  async fn check(
    &self,
    student: &StudentProfile,
    proposal: &[ProposedSelection],
  ) -> Result<Vec<ValidationError>> {
    let mut general = Vec::new();
    let mut seen = HashSet::new();
    let mut choices: Vec<SlotChoice> = Vec::new();

    for p in proposal {
      let meta = self.meta(p.meta_id).await?;
      let subject = self.subject(p.subject_id).await?;

      if !seen.insert(p.meta_id) {
        general.push(ValidationError::general(format!(
          "{} is selected more than once",
          meta.label
        )));
        continue;
      }
      if !meta.applies_to(student) {
        general.push(ValidationError::general(format!(
          "{} is not open to this student's stream or class",
          meta.label
        )));
      }

      match Slot::resolve(meta.category, &classify(&meta.label)) {
        // The first meta placed in a slot fills it.
        Some(slot) if !choices.iter().any(|c| c.slot == slot) => {
          choices.push(SlotChoice { slot, subject });
        }
        Some(_) => {}
        None => debug!(meta_id = %meta.id, label = %meta.label, "meta resolves to no slot"),
      }
    }

    let eligibility = self.eligibility_for(student).await?;
    let rules = self
      .refs
      .restricted_groupings(student.academic_year_id)
      .await
      .map_err(Into::<Error>::into)?;
    let restrictions = RestrictionMap::from_rules(&rules);

    let mut errors = validate(&choices, &eligibility, &restrictions);
    errors.extend(general);
    Ok(errors)
  }

  // ─── Writes ──────────────────────────────────────────────────────────────

  /// Record a student's first selection set for a session.
  ///
  /// A student may not call this twice for the same session. An admin may:
  /// the existing active set is deprecated and replaced by `proposal`.
  pub async fn create_selections(
    &self,
    student_id: Uuid,
    session_id: Uuid,
    proposal: &[ProposedSelection],
    created_by: Uuid,
    role: Role,
  ) -> Result<Vec<StudentSelection>> {
    let student = self.student(student_id).await?;
    let history = self
      .store
      .history(student_id, Some(session_id))
      .await
      .map_err(Into::<Error>::into)?;

    let has_active = history.iter().any(|s| s.is_active);
    if has_active && role == Role::Student {
      warn!(%student_id, %session_id, "rejecting create: active selections exist");
      return Err(Error::ActiveSelectionsExist { student_id, session_id });
    }

    let errors = self.check(&student, proposal).await?;
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    let author = Authorship { user_id: created_by, reason: None };
    let planner = VersionPlanner::new(student_id, session_id, &history, Utc::now());
    let batch = if has_active {
      planner.plan_replacement(proposal, &author)
    } else {
      planner.plan_update(&diff(&history, proposal).changed, &author)
    };

    info!(
      %student_id,
      %session_id,
      ?role,
      appended = batch.append.len(),
      deprecated = batch.deprecate.len(),
      "creating selections"
    );
    self.store.commit(batch).await.map_err(Into::<Error>::into)?;
    self.active_selections(student_id, session_id).await
  }

  /// Change some slots of an existing selection set.
  ///
  /// Slots absent from `proposal` keep their active record. The merged set
  /// is validated as a whole; slots whose subject did not change produce no
  /// new version.
  pub async fn update_selections(
    &self,
    student_id: Uuid,
    session_id: Uuid,
    proposal: &[ProposedSelection],
    updated_by: Uuid,
    change_reason: Option<String>,
  ) -> Result<Vec<StudentSelection>> {
    let student = self.student(student_id).await?;
    let history = self
      .store
      .history(student_id, Some(session_id))
      .await
      .map_err(Into::<Error>::into)?;

    let proposed_metas: HashSet<Uuid> = proposal.iter().map(|p| p.meta_id).collect();
    let merged: Vec<ProposedSelection> = history
      .iter()
      .filter(|s| s.is_active && !proposed_metas.contains(&s.meta_id))
      .map(StudentSelection::proposal)
      .chain(proposal.iter().copied())
      .collect();

    let errors = self.check(&student, &merged).await?;
    if !errors.is_empty() {
      return Err(Error::Validation(errors));
    }

    let changes = diff(&history, proposal);
    if changes.is_noop() {
      debug!(%student_id, %session_id, "update is a no-op");
      return Ok(history.into_iter().filter(|s| s.is_active).collect());
    }

    let author = Authorship { user_id: updated_by, reason: change_reason };
    let batch = VersionPlanner::new(student_id, session_id, &history, Utc::now())
      .plan_update(&changes.changed, &author);

    info!(
      %student_id,
      %session_id,
      changed = changes.changed.len(),
      unchanged = changes.unchanged.len(),
      "updating selections"
    );
    self.store.commit(batch).await.map_err(Into::<Error>::into)?;
    self.active_selections(student_id, session_id).await
  }

  // ─── Reads ───────────────────────────────────────────────────────────────

  pub async fn active_selections(
    &self,
    student_id: Uuid,
    session_id: Uuid,
  ) -> Result<Vec<StudentSelection>> {
    self
      .store
      .active_selections(student_id, session_id)
      .await
      .map_err(Into::into)
  }

  /// Every record of a student, newest version first.
  ///
  /// Lineage problems are logged, not returned: history is still served.
  pub async fn version_history(
    &self,
    student_id: Uuid,
    session_id: Option<Uuid>,
  ) -> Result<Vec<StudentSelection>> {
    let history = self
      .store
      .history(student_id, session_id)
      .await
      .map_err(Into::<Error>::into)?;

    let sessions: HashSet<Uuid> = history.iter().map(|s| s.session_id).collect();
    for session in sessions {
      let records: Vec<StudentSelection> =
        history.iter().filter(|s| s.session_id == session).cloned().collect();
      for violation in audit(&records) {
        warn!(%student_id, session_id = %session, ?violation, "lineage violation");
      }
    }
    Ok(history)
  }

  pub async fn selection(&self, selection_id: Uuid) -> Result<StudentSelection> {
    self
      .store
      .get_selection(selection_id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or(Error::SelectionNotFound(selection_id))
  }

  /// The version-1 record of the lineage `selection_id` belongs to.
  pub async fn original_of(&self, selection_id: Uuid) -> Result<StudentSelection> {
    let record = self.selection(selection_id).await?;
    match record.parent_id {
      Some(root) => self.selection(root).await,
      None => Ok(record),
    }
  }

  // ─── Labels ──────────────────────────────────────────────────────────────

  pub fn classify_label(&self, label: &str) -> ClassifiedLabel {
    let tag = classify(label);
    let slot = tag.category.and_then(|c| Slot::resolve(c, &tag));
    ClassifiedLabel { tag, slot }
  }

  /// The selection metas of an academic year, with their resolved slots.
  pub async fn selection_metas(&self, academic_year_id: Uuid) -> Result<Vec<ClassifiedMeta>> {
    let metas = self
      .refs
      .selection_metas(academic_year_id)
      .await
      .map_err(Into::<Error>::into)?;
    Ok(metas.into_iter().map(ClassifiedMeta::new).collect())
  }
}
