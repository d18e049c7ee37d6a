//! Handlers for `/incidents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/incidents` | Summaries in id order |
//! | `POST`   | `/incidents` | Optional JSON body of editable fields; 201 |
//! | `GET`    | `/incidents/{id}` | 404 if not found |
//! | `POST`   | `/incidents/{id}` | Multipart edit form; see [`crate::form`] |
//! | `DELETE` | `/incidents/{id}` | 204 |

use axum::{
  Json,
  body::Bytes,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use incidents_core::{incident::Incident, store::IncidentStore};

use crate::{
  AppState,
  error::Error,
  form::IncidentForm,
  views::{IncidentDetail, IncidentSummary},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /incidents`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<IncidentSummary>>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let incidents = state.store.list_incidents().await.map_err(Error::store)?;
  let summaries = incidents
    .iter()
    .map(IncidentSummary::from_incident)
    .collect::<Result<Vec<_>, _>>()?;
  Ok(Json(summaries))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /incidents`: an empty body creates a blank incident logged today.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Bytes,
) -> Result<impl IntoResponse, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let mut draft = if body.is_empty() {
    Incident::new()
  } else {
    serde_json::from_slice::<Incident>(&body)
      .map_err(|e| Error::BadRequest(e.to_string()))?
  };
  draft.incident_id = None;
  draft.pupils.clear();

  let created = state.store.create_incident(draft).await.map_err(Error::store)?;
  let detail =
    IncidentDetail::new(created, Vec::new(), state.config.min_pupil_slots)?;
  Ok((StatusCode::CREATED, Json(detail)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /incidents/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<IncidentDetail>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  Ok(Json(detail(&state, id).await?))
}

async fn detail<S>(state: &AppState<S>, id: i64) -> Result<IncidentDetail, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let incident = state
    .store
    .get_incident(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("incident {id} not found")))?;
  let attachments = state.store.list_attachments(id).await.map_err(Error::store)?;
  Ok(IncidentDetail::new(
    incident,
    attachments,
    state.config.min_pupil_slots,
  )?)
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `POST /incidents/{id}`: the edit form. Fields and pupils are written in
/// one transaction; a rejected pupil name leaves the incident untouched.
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  mut multipart: Multipart,
) -> Result<Json<IncidentDetail>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let mut incident = state
    .store
    .get_incident(id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("incident {id} not found")))?;

  let form = IncidentForm::read(&mut multipart).await?;
  form.apply(&mut incident)?;
  state
    .store
    .update_incident(incident, form.into_slots())
    .await
    .map_err(Error::store)?;

  Ok(Json(detail(&state, id).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /incidents/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, Error>
where
  S: IncidentStore + Clone + 'static,
{
  state.store.delete_incident(id).await.map_err(Error::store)?;
  Ok(StatusCode::NO_CONTENT)
}
