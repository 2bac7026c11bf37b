//! Error types for `elective-core`.

use thiserror::Error;
use uuid::Uuid;

use crate::selection::ValidationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("selection meta not found: {0}")]
  MetaNotFound(Uuid),

  #[error("subject not found: {0}")]
  SubjectNotFound(Uuid),

  #[error("selection not found: {0}")]
  SelectionNotFound(Uuid),

  #[error(
    "active selections already exist for student {student_id} in session \
     {session_id}"
  )]
  ActiveSelectionsExist { student_id: Uuid, session_id: Uuid },

  /// Another writer changed the same lineage between our read and our commit.
  #[error(
    "selections for student {student_id} in session {session_id} were \
     modified concurrently"
  )]
  ConcurrentUpdate { student_id: Uuid, session_id: Uuid },

  #[error("selection failed validation with {} error(s)", .0.len())]
  Validation(Vec<ValidationError>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// True for the reference-not-found family: an id in the request does not
  /// resolve to anything.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::StudentNotFound(_)
        | Self::MetaNotFound(_)
        | Self::SubjectNotFound(_)
        | Self::SelectionNotFound(_)
    )
  }

  /// True for failures caused by the state of the ledger rather than by the
  /// request itself.
  pub fn is_conflict(&self) -> bool {
    matches!(
      self,
      Self::ActiveSelectionsExist { .. } | Self::ConcurrentUpdate { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
