//! Handlers for `/selections/:id` endpoints.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use elective_core::{
  reference::ReferenceSource,
  selection::StudentSelection,
  service::SelectionService,
  store::SelectionStore,
};
use uuid::Uuid;

use crate::{
  envelope::{Envelope, ok},
  error::ApiError,
};

/// `GET /selections/:id`
pub async fn get_one<S, R>(
  State(svc): State<Arc<SelectionService<S, R>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Envelope<StudentSelection>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.selection(id).await?))
}

/// `GET /selections/:id/original`: the version-1 record of the lineage.
pub async fn original<S, R>(
  State(svc): State<Arc<SelectionService<S, R>>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Envelope<StudentSelection>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.original_of(id).await?))
}
