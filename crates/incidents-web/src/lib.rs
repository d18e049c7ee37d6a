//! HTTP layer for the incident log.
//!
//! Exposes an axum [`Router`] serving JSON views of incidents, the multipart
//! edit form, file downloads and the spreadsheet export, backed by any
//! [`IncidentStore`].

pub mod error;
pub mod form;
pub mod handlers;
pub mod seed;
pub mod views;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  response::Redirect,
  routing::get,
};
use incidents_core::{incident::DEFAULT_MIN_SLOTS, store::IncidentStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use handlers::{export, files, incidents, lookups};

/// Largest accepted request body; statements are often scanned documents.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `INCIDENTS_*` environment variables. Missing keys take their defaults.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// Root URL the application is reached at; exported identifiers link
  /// below it.
  pub base_url:        String,
  pub store_path:      PathBuf,
  pub export_dir:      PathBuf,
  pub min_pupil_slots: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            5010,
      base_url:        "http://localhost:5010".to_string(),
      store_path:      PathBuf::from("incidents.db"),
      export_dir:      PathBuf::from("exports"),
      min_pupil_slots: DEFAULT_MIN_SLOTS,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: IncidentStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the incident log.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: IncidentStore + Clone + 'static,
{
  Router::new()
    .route("/", get(|| async { Redirect::to("/incidents") }))
    .route(
      "/incidents",
      get(incidents::list::<S>).post(incidents::create::<S>),
    )
    .route(
      "/incidents/{id}",
      get(incidents::get_one::<S>)
        .post(incidents::update::<S>)
        .delete(incidents::delete::<S>),
    )
    .route(
      "/incidents/{id}/pupils/{pupil_id}/statement",
      get(files::statement::<S>),
    )
    .route(
      "/incidents/{id}/attachments",
      get(files::list_attachments::<S>).post(files::upload_attachment::<S>),
    )
    .route("/attachments/{id}", get(files::attachment::<S>))
    .route(
      "/pupils",
      get(lookups::pupils::<S>).post(lookups::add_pupil::<S>),
    )
    .route("/statuses", get(lookups::statuses::<S>))
    .route("/export", get(export::handler::<S>))
    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
