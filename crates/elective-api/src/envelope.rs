//! The `{"success": true, "data": ...}` wrapper every handler returns.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data:    T,
}

/// Wrap `data` in a successful envelope.
pub fn ok<T: Serialize>(data: T) -> Json<Envelope<T>> {
  Json(Envelope { success: true, data })
}
