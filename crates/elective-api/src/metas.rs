//! Handlers for `/metas` and `/classify`.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use elective_core::{
  reference::ReferenceSource,
  service::{ClassifiedLabel, ClassifiedMeta, SelectionService},
  store::SelectionStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  envelope::{Envelope, ok},
  error::ApiError,
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub academic_year_id: Uuid,
}

/// `GET /metas?academic_year_id=<id>`
pub async fn list<S, R>(
  State(svc): State<Arc<SelectionService<S, R>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Envelope<Vec<ClassifiedMeta>>>, ApiError>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  Ok(ok(svc.selection_metas(params.academic_year_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ClassifyParams {
  pub label: String,
}

/// `GET /classify?label=<text>`
pub async fn classify<S, R>(
  State(svc): State<Arc<SelectionService<S, R>>>,
  Query(params): Query<ClassifyParams>,
) -> Json<Envelope<ClassifiedLabel>>
where
  S: SelectionStore,
  R: ReferenceSource,
{
  ok(svc.classify_label(&params.label))
}
