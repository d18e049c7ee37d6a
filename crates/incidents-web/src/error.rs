//! Error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use incidents_core::error::{Error as CoreError, RejectedSlot};
use serde_json::json;
use thiserror::Error;

/// An error returned by a handler.
#[derive(Debug, Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("{} pupil slot(s) rejected", .0.len())]
  Rejected(Vec<RejectedSlot>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("export error: {0}")]
  Export(#[from] incidents_xlsx::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),

  #[error("background task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl Error {
  /// Classify a store error by the domain error somewhere in its source
  /// chain; anything else is an internal failure.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    let classified = core_error(&e).and_then(|core| match core {
      CoreError::IncidentNotFound(id) => {
        Some(Self::NotFound(format!("incident {id} not found")))
      }
      CoreError::PupilNotFound(id) => {
        Some(Self::NotFound(format!("pupil {id} not found")))
      }
      CoreError::RejectedSlots(slots) => Some(Self::Rejected(slots.clone())),
      CoreError::InvalidName(_) | CoreError::UnknownStatus(_) => {
        Some(Self::BadRequest(core.to_string()))
      }
      CoreError::Unsaved => None,
    });
    classified.unwrap_or_else(|| Self::Store(Box::new(e)))
  }
}

impl From<CoreError> for Error {
  fn from(e: CoreError) -> Self { Self::store(e) }
}

fn core_error<'a>(
  e: &'a (dyn std::error::Error + 'static),
) -> Option<&'a CoreError> {
  std::iter::successors(Some(e), |e| e.source())
    .find_map(|e| e.downcast_ref::<CoreError>())
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::NotFound(_) => StatusCode::NOT_FOUND,
      Error::BadRequest(_) | Error::Rejected(_) => StatusCode::BAD_REQUEST,
      Error::Store(_) | Error::Export(_) | Error::Io(_) | Error::Task(_) => {
        tracing::error!(error = %self, "request failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
    };
    let body = match &self {
      Error::Rejected(slots) => {
        json!({ "error": self.to_string(), "rejected": slots })
      }
      _ => json!({ "error": self.to_string() }),
    };
    (status, Json(body)).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  enum Wrapper {
    #[error("wrapped: {0}")]
    Core(#[from] CoreError),
    #[error("disk on fire")]
    Other,
  }

  #[test]
  fn classifies_through_source_chain() {
    let e = Error::store(Wrapper::from(CoreError::IncidentNotFound(3)));
    assert!(matches!(e, Error::NotFound(_)));

    let e = Error::store(Wrapper::from(CoreError::RejectedSlots(vec![
      RejectedSlot { slot: 2, name: "Cher".into() },
    ])));
    assert!(matches!(e, Error::Rejected(ref r) if r.len() == 1));

    assert!(matches!(Error::store(Wrapper::Other), Error::Store(_)));
  }

  #[test]
  fn status_codes() {
    assert_eq!(
      Error::NotFound("x".into()).into_response().status(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      Error::Rejected(vec![]).into_response().status(),
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      Error::store(Wrapper::Other).into_response().status(),
      StatusCode::INTERNAL_SERVER_ERROR
    );
  }
}
