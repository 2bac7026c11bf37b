//! JSON REST API for elective selection.
//!
//! Exposes an axum [`Router`] backed by a [`SelectionService`] over any
//! [`SelectionStore`] and [`ReferenceSource`]. Auth, TLS, and transport
//! concerns are the caller's responsibility; the acting user and role arrive
//! in request bodies.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", elective_api::api_router(service.clone()))
//! ```

pub mod envelope;
pub mod error;
pub mod metas;
pub mod selections;
pub mod students;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use elective_core::{
  reference::ReferenceSource,
  service::SelectionService,
  store::SelectionStore,
};

pub use envelope::Envelope;
pub use error::ApiError;

/// Build a fully-materialised API router for `service`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, R>(service: Arc<SelectionService<S, R>>) -> Router<()>
where
  S: SelectionStore + 'static,
  R: ReferenceSource + 'static,
{
  Router::new()
    // Students
    .route(
      "/students/{student_id}/eligibility",
      get(students::eligibility::<S, R>),
    )
    .route(
      "/students/{student_id}/selections/validate",
      post(students::validate::<S, R>),
    )
    .route(
      "/students/{student_id}/sessions/{session_id}/selections",
      get(students::active::<S, R>)
        .post(students::create::<S, R>)
        .put(students::update::<S, R>),
    )
    .route("/students/{student_id}/history", get(students::history::<S, R>))
    // Selections
    .route("/selections/{id}", get(selections::get_one::<S, R>))
    .route("/selections/{id}/original", get(selections::original::<S, R>))
    // Metas and labels
    .route("/metas", get(metas::list::<S, R>))
    .route("/classify", get(metas::classify::<S, R>))
    .with_state(service)
}

#[cfg(test)]
mod tests;
