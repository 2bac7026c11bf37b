//! Handlers for `/students/...` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/students/:student_id/eligibility` | Options per category |
//! | `POST` | `/students/:student_id/selections/validate` | Body: [`ValidateBody`]; never writes |
//! | `GET`  | `/students/:student_id/sessions/:session_id/selections` | Active set |
//! | `POST` | `/students/:student_id/sessions/:session_id/selections` | Body: [`CreateBody`]; returns 201 |
//! | `PUT`  | `/students/:student_id/sessions/:session_id/selections` | Body: [`UpdateBody`] |
//! | `GET`  | `/students/:student_id/history` | Optional `?session_id` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use elective_core::{
  eligibility::Eligibility,
  reference::ReferenceSource,
  selection::{ProposedSelection, Role, StudentSelection, ValidationError},
  service::SelectionService,
  store::SelectionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  envelope::{Envelope, ok},
  error::ApiError,
};

type Service<S, R> = State<Arc<SelectionService<S, R>>>;

// ─── Eligibility ──────────────────────────────────────────────────────────────

/// `GET /students/:student_id/eligibility`
pub async fn eligibility<S, R>(
  State(svc): Service<S, R>,
  Path(student_id): Path<Uuid>,
) -> Result<Json<Envelope<Eligibility>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.eligibility(student_id).await?))
}

// ─── Validate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
  pub selections: Vec<ProposedSelection>,
}

/// `POST /students/:student_id/selections/validate`
///
/// Always 200 when every id resolves; `data` is the (possibly empty) error
/// list.
pub async fn validate<S, R>(
  State(svc): Service<S, R>,
  Path(student_id): Path<Uuid>,
  Json(body): Json<ValidateBody>,
) -> Result<Json<Envelope<Vec<ValidationError>>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.validate_selections(student_id, &body.selections).await?))
}

// ─── Active set ───────────────────────────────────────────────────────────────

/// `GET /students/:student_id/sessions/:session_id/selections`
pub async fn active<S, R>(
  State(svc): Service<S, R>,
  Path((student_id, session_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Envelope<Vec<StudentSelection>>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.active_selections(student_id, session_id).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub selections: Vec<ProposedSelection>,
  pub created_by: Uuid,
  #[serde(default)]
  pub role:       Role,
}

/// `POST /students/:student_id/sessions/:session_id/selections`: returns 201
/// and the new active set.
pub async fn create<S, R>(
  State(svc): Service<S, R>,
  Path((student_id, session_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  let active = svc
    .create_selections(student_id, session_id, &body.selections, body.created_by, body.role)
    .await?;
  Ok((StatusCode::CREATED, ok(active)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  pub selections:    Vec<ProposedSelection>,
  pub updated_by:    Uuid,
  pub change_reason: Option<String>,
}

/// `PUT /students/:student_id/sessions/:session_id/selections`
pub async fn update<S, R>(
  State(svc): Service<S, R>,
  Path((student_id, session_id)): Path<(Uuid, Uuid)>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Envelope<Vec<StudentSelection>>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  let active = svc
    .update_selections(
      student_id,
      session_id,
      &body.selections,
      body.updated_by,
      body.change_reason,
    )
    .await?;
  Ok(ok(active))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub session_id: Option<Uuid>,
}

/// `GET /students/:student_id/history[?session_id=<id>]`
pub async fn history<S, R>(
  State(svc): Service<S, R>,
  Path(student_id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<Envelope<Vec<StudentSelection>>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.version_history(student_id, params.session_id).await?))
}
