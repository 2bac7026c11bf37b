//! Error type for `elective-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A column held a value that does not decode to its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  /// A commit hit a uniqueness constraint: another writer appended the same
  /// version or deprecated the same record first.
  #[error(
    "selections for student {student_id} in session {session_id} were \
     modified concurrently"
  )]
  ConcurrentUpdate { student_id: Uuid, session_id: Uuid },
}

impl Error {
  pub(crate) fn is_constraint_violation(err: &tokio_rusqlite::Error) -> bool {
    matches!(
      err,
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
        if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
  }
}

impl From<Error> for elective_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::ConcurrentUpdate { student_id, session_id } => {
        Self::ConcurrentUpdate { student_id, session_id }
      }
      other => Self::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
