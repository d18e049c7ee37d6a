//! The `IncidentStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `incidents-store-sqlite`). Higher layers (`incidents-web`) depend on this
//! abstraction, not on any concrete backend. A store value is the storage
//! context: callers hold one and pass it to each operation.

use std::future::Future;

use crate::{
  attachment::{Attachment, AttachmentInfo, StatementFile},
  incident::{Incident, IncidentStatus},
  pupil::Pupil,
  reconcile::SubmittedSlot,
};

/// Abstraction over an incident store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait IncidentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Incidents ─────────────────────────────────────────────────────────

  /// Persist the editable fields of `draft` and return it with its assigned
  /// id. Associations on the draft are ignored; pupils are attached through
  /// [`IncidentStore::reconcile_incident_pupils`].
  fn create_incident(
    &self,
    draft: Incident,
  ) -> impl Future<Output = Result<Incident, Self::Error>> + Send + '_;

  /// Retrieve an incident with its associations. Returns `None` if not found.
  fn get_incident(
    &self,
    incident_id: i64,
  ) -> impl Future<Output = Result<Option<Incident>, Self::Error>> + Send + '_;

  /// All incidents in id order, associations loaded.
  fn list_incidents(
    &self,
  ) -> impl Future<Output = Result<Vec<Incident>, Self::Error>> + Send + '_;

  /// Overwrite the editable fields of `incident` and reconcile its pupils
  /// against `slots`, atomically. Returns the incident id.
  fn update_incident(
    &self,
    incident: Incident,
    slots: Vec<SubmittedSlot>,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Make the incident's pupil associations match `slots`, atomically.
  /// Returns the incident id.
  fn reconcile_incident_pupils(
    &self,
    incident_id: i64,
    slots: Vec<SubmittedSlot>,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Delete an incident together with its associations and attachments.
  /// Pupils are kept.
  fn delete_incident(
    &self,
    incident_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Pupils and statements ─────────────────────────────────────────────

  /// Register a pupil by exact name, returning the existing one if the name
  /// is already known. Fails with [`crate::Error::InvalidName`] for a name
  /// without a surname.
  fn add_pupil(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Pupil, Self::Error>> + Send + '_;

  /// All pupils, surname first.
  fn list_pupils(
    &self,
  ) -> impl Future<Output = Result<Vec<Pupil>, Self::Error>> + Send + '_;

  /// The statement one pupil gave for one incident. `None` if the pupil is
  /// not associated with the incident or gave no statement; an unknown
  /// incident or pupil is [`crate::Error::IncidentNotFound`] /
  /// [`crate::Error::PupilNotFound`].
  fn get_statement(
    &self,
    incident_id: i64,
    pupil_id: i64,
  ) -> impl Future<Output = Result<Option<StatementFile>, Self::Error>> + Send + '_;

  // ── Incident-level attachments ────────────────────────────────────────

  fn add_attachment(
    &self,
    incident_id: i64,
    attachment: Attachment,
  ) -> impl Future<Output = Result<AttachmentInfo, Self::Error>> + Send + '_;

  fn list_attachments(
    &self,
    incident_id: i64,
  ) -> impl Future<Output = Result<Vec<AttachmentInfo>, Self::Error>> + Send + '_;

  fn get_attachment(
    &self,
    attachment_id: i64,
  ) -> impl Future<Output = Result<Option<(AttachmentInfo, Attachment)>, Self::Error>>
  + Send
  + '_;

  // ── Lookups ───────────────────────────────────────────────────────────

  /// The status lookup table in `sequence` order.
  fn list_statuses(
    &self,
  ) -> impl Future<Output = Result<Vec<IncidentStatus>, Self::Error>> + Send + '_;
}
