//! The `SelectionStore` trait.
//!
//! Implemented by storage backends (e.g. `elective-store-sqlite`). The
//! service layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{selection::StudentSelection, version::VersionBatch};

/// Abstraction over the append-only selection ledger.
///
/// Records are never updated or deleted. A record stops being active when a
/// deprecation is recorded for it; `is_active`, `is_deprecated` and
/// `updated_at` on returned records reflect that.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait SelectionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Retrieve a single record by id. Returns `None` if not found.
  fn get_selection(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentSelection>, Self::Error>> + Send + '_;

  /// The active records of one `(student, session)`.
  fn active_selections(
    &self,
    student_id: Uuid,
    session_id: Uuid,
  ) -> impl Future<Output = Result<Vec<StudentSelection>, Self::Error>> + Send + '_;

  /// Every record of a student, deprecated ones included, optionally
  /// restricted to one session. Ordered by `version` descending, then
  /// `created_at` descending.
  fn history(
    &self,
    student_id: Uuid,
    session_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<StudentSelection>, Self::Error>> + Send + '_;

  /// Write a batch atomically: either every record is appended and every
  /// deprecation recorded, or nothing is.
  ///
  /// Must fail with [`crate::Error::ConcurrentUpdate`] (after conversion)
  /// when a record in `batch.deprecate` is already deprecated or when an
  /// appended version already exists in its lineage. Both mean another
  /// writer committed between our read and this write.
  fn commit(
    &self,
    batch: VersionBatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
