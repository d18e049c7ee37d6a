//! Statement and attachment downloads, and incident-level uploads.

use axum::{
  Json,
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use incidents_core::{
  attachment::{AttachmentInfo, Upload},
  store::IncidentStore,
};

use super::download;
use crate::{AppState, error::Error};

/// Multipart field carrying an incident-level attachment.
const FILE_FIELD: &str = "file";

/// `GET /incidents/{id}/pupils/{pupil_id}/statement`
pub async fn statement<S>(
  State(state): State<AppState<S>>,
  Path((incident_id, pupil_id)): Path<(i64, i64)>,
) -> Result<Response, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let file = state
    .store
    .get_statement(incident_id, pupil_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| {
      Error::NotFound(format!(
        "no statement from pupil {pupil_id} for incident {incident_id}"
      ))
    })?;
  Ok(download(&file.filename, file.data))
}

/// `GET /attachments/{id}`
pub async fn attachment<S>(
  State(state): State<AppState<S>>,
  Path(attachment_id): Path<i64>,
) -> Result<Response, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let (info, attachment) = state
    .store
    .get_attachment(attachment_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::NotFound(format!("attachment {attachment_id} not found")))?;
  Ok(download(&info.filename, attachment.data))
}

/// `GET /incidents/{id}/attachments`
pub async fn list_attachments<S>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
) -> Result<Json<Vec<AttachmentInfo>>, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let attachments = state
    .store
    .list_attachments(incident_id)
    .await
    .map_err(Error::store)?;
  Ok(Json(attachments))
}

/// `POST /incidents/{id}/attachments`: multipart with one `file` field.
pub async fn upload_attachment<S>(
  State(state): State<AppState<S>>,
  Path(incident_id): Path<i64>,
  mut multipart: Multipart,
) -> Result<impl IntoResponse, Error>
where
  S: IncidentStore + Clone + 'static,
{
  let mut upload = None;
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| Error::BadRequest(e.to_string()))?
  {
    if field.name() != Some(FILE_FIELD) {
      continue;
    }
    let filename = field.file_name().unwrap_or_default().to_owned();
    let data = field
      .bytes()
      .await
      .map_err(|e| Error::BadRequest(e.to_string()))?;
    upload = Some(Upload::new(filename, data.to_vec()));
  }

  let upload = upload
    .filter(|u| !u.is_empty() && !u.filename.is_empty())
    .ok_or_else(|| Error::BadRequest("no file uploaded".into()))?;
  let info = state
    .store
    .add_attachment(incident_id, upload.into())
    .await
    .map_err(Error::store)?;
  Ok((StatusCode::CREATED, Json(info)))
}
