//! Error types for `incidents-core`.

use serde::Serialize;
use thiserror::Error;

/// A submitted pupil slot whose name could not be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedSlot {
  /// 1-based slot number as submitted by the form.
  pub slot: usize,
  pub name: String,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("pupil name {0:?} has no surname")]
  InvalidName(String),

  #[error("{} pupil slot(s) rejected", .0.len())]
  RejectedSlots(Vec<RejectedSlot>),

  #[error("incident not found: {0}")]
  IncidentNotFound(i64),

  #[error("pupil not found: {0}")]
  PupilNotFound(i64),

  #[error("incident has not been saved yet")]
  Unsaved,

  #[error("unknown incident status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
