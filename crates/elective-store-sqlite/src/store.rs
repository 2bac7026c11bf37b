//! [`SqliteStore`]: the SQLite implementation of [`SelectionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::{debug, warn};
use uuid::Uuid;

use elective_core::{
  selection::StudentSelection,
  store::SelectionStore,
  version::VersionBatch,
};

use crate::{
  encode::{RawSelection, SELECTION_COLUMNS, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A selection ledger backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a selection query whose `WHERE`/`ORDER BY` tail is `tail`.
  async fn query_selections(
    &self,
    tail: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<StudentSelection>> {
    let raws: Vec<RawSelection> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SELECTION_COLUMNS}
           FROM selections s
           LEFT JOIN deprecations d ON d.selection_id = s.selection_id
           {tail}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawSelection::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSelection::into_selection).collect()
  }
}

// ─── SelectionStore impl ─────────────────────────────────────────────────────

impl SelectionStore for SqliteStore {
  type Error = Error;

  async fn get_selection(&self, id: Uuid) -> Result<Option<StudentSelection>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSelection> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {SELECTION_COLUMNS}
           FROM selections s
           LEFT JOIN deprecations d ON d.selection_id = s.selection_id
           WHERE s.selection_id = ?1"
        );
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSelection::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSelection::into_selection).transpose()
  }

  async fn active_selections(
    &self,
    student_id: Uuid,
    session_id: Uuid,
  ) -> Result<Vec<StudentSelection>> {
    self
      .query_selections(
        "WHERE s.student_id = ?1 AND s.session_id = ?2 AND d.selection_id IS NULL
         ORDER BY s.created_at, s.meta_id",
        vec![encode_uuid(student_id), encode_uuid(session_id)],
      )
      .await
  }

  async fn history(
    &self,
    student_id: Uuid,
    session_id: Option<Uuid>,
  ) -> Result<Vec<StudentSelection>> {
    match session_id {
      Some(session_id) => {
        self
          .query_selections(
            "WHERE s.student_id = ?1 AND s.session_id = ?2
             ORDER BY s.version DESC, s.created_at DESC",
            vec![encode_uuid(student_id), encode_uuid(session_id)],
          )
          .await
      }
      None => {
        self
          .query_selections(
            "WHERE s.student_id = ?1
             ORDER BY s.version DESC, s.created_at DESC",
            vec![encode_uuid(student_id)],
          )
          .await
      }
    }
  }

  // ── Append-only writes ────────────────────────────────────────────────────

  async fn commit(&self, batch: VersionBatch) -> Result<()> {
    if batch.is_empty() {
      return Ok(());
    }

    let student_id = batch.student_id;
    let session_id = batch.session_id;
    let appended = batch.append.len();
    let deprecated = batch.deprecate.len();

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut insert = tx.prepare(
            "INSERT INTO selections (
               selection_id, student_id, session_id, meta_id, subject_id,
               version, parent_id, previous_id, created_by, change_reason,
               created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
          )?;
          for s in &batch.append {
            insert.execute(rusqlite::params![
              encode_uuid(s.id),
              encode_uuid(s.student_id),
              encode_uuid(s.session_id),
              encode_uuid(s.meta_id),
              encode_uuid(s.subject_id),
              s.version,
              s.parent_id.map(encode_uuid),
              s.previous_id.map(encode_uuid),
              encode_uuid(s.created_by),
              s.change_reason,
              encode_dt(s.created_at),
            ])?;
          }

          let mut deprecate = tx.prepare(
            "INSERT INTO deprecations (
               deprecation_id, selection_id, superseded_by, reason, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          let recorded_at = encode_dt(batch.recorded_at);
          for d in &batch.deprecate {
            deprecate.execute(rusqlite::params![
              encode_uuid(Uuid::new_v4()),
              encode_uuid(d.selection_id),
              d.superseded_by.map(encode_uuid),
              d.reason,
              recorded_at,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await;

    match result {
      Ok(()) => {
        debug!(%student_id, %session_id, appended, deprecated, "committed version batch");
        Ok(())
      }
      Err(e) if Error::is_constraint_violation(&e) => {
        warn!(%student_id, %session_id, error = %e, "version batch lost a race");
        Err(Error::ConcurrentUpdate { student_id, session_id })
      }
      Err(e) => Err(e.into()),
    }
  }
}
