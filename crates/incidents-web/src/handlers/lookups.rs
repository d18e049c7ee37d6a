//! Pupils and the status lookup.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use incidents_core::{
  incident::IncidentStatus,
  pupil::Pupil,
  store::IncidentStore,
};
use serde::Deserialize;

use crate::{AppState, error::Error};

/// `GET /pupils`: surname first.
pub async fn pupils<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Pupil>>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  Ok(Json(state.store.list_pupils().await.map_err(Error::store)?))
}

#[derive(Debug, Deserialize)]
pub struct NewPupil {
  pub name: String,
}

/// `POST /pupils`: body: `{"name":"Pedro Virgili"}`. Registering a known
/// name returns the existing pupil.
pub async fn add_pupil<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewPupil>,
) -> Result<impl IntoResponse, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let pupil = state.store.add_pupil(body.name).await.map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(pupil)))
}

/// `GET /statuses`: in workflow order.
pub async fn statuses<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<IncidentStatus>>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  Ok(Json(state.store.list_statuses().await.map_err(Error::store)?))
}
