//! HTTP server wiring for elective selection: configuration, reference
//! loading and the top-level router.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use elective_core::{
  config::EngineConfig,
  reference::ReferenceData,
  service::SelectionService,
};
use elective_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ELECTIVE_*` environment variables.
#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  /// SQLite file holding the selection ledger.
  pub store_path:     PathBuf,
  /// JSON snapshot of students, subjects, metas and the paper catalog.
  pub reference_path: PathBuf,
  #[serde(default)]
  pub engine:         EngineConfig,
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Read and parse the reference snapshot at `path`.
pub fn load_reference(path: &Path) -> anyhow::Result<ReferenceData> {
  let json = std::fs::read_to_string(path)
    .with_context(|| format!("failed to read reference data at {path:?}"))?;
  ReferenceData::from_json(&json)
    .with_context(|| format!("failed to parse reference data at {path:?}"))
}

/// Build the full application router: the API under `/api`, wrapped in
/// request tracing.
pub fn app(service: Arc<SelectionService<SqliteStore, ReferenceData>>) -> Router {
  Router::new()
    .nest("/api", elective_api::api_router(service))
    .layer(TraceLayer::new_for_http())
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
