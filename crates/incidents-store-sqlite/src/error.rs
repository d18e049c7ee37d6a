//! Error type for `incidents-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] incidents_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date parse error: {0}")]
  DateParse(String),
}

impl Error {
  /// True for lookups of an incident or pupil that does not exist.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      Self::Core(
        incidents_core::Error::IncidentNotFound(_)
          | incidents_core::Error::PupilNotFound(_)
      )
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
