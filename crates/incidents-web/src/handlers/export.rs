//! `GET /export`: all incidents as an `.xlsx` download.

use axum::{extract::State, response::Response};
use chrono::Local;
use incidents_core::store::IncidentStore;

use super::download;
use crate::{AppState, error::Error};

pub async fn handler<S>(State(state): State<AppState<S>>) -> Result<Response, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let incidents = state.store.list_incidents().await.map_err(Error::store)?;
  let config = state.config.clone();
  let filename = format!("incidents-{}.xlsx", Local::now().format("%Y-%m-%d"));

  let path = config.export_dir.join(&filename);
  let data = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, Error> {
    std::fs::create_dir_all(&config.export_dir)?;
    let written =
      incidents_xlsx::export_incidents(&incidents, &path, &config.base_url)?;
    Ok(std::fs::read(written)?)
  })
  .await??;

  Ok(download(&filename, data))
}
