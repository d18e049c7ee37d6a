//! Decoding the multipart incident edit form.
//!
//! Text fields replace the stored values (a missing field clears it).
//! Checkboxes follow HTML semantics: a flag is set only when its field is
//! present. `logged_on` and `status` keep their stored values when absent or
//! blank. Pupil rows arrive as `pupil_<n>` / `statement_<n>` pairs; the slot
//! numbers may be sparse and may exceed the displayed minimum.

use std::collections::{BTreeMap, HashMap};

use axum::extract::Multipart;
use chrono::NaiveDate;
use incidents_core::{
  attachment::Upload,
  incident::{Incident, IncidentStatus},
  reconcile::SubmittedSlot,
};

use crate::error::Error;

const PUPIL_PREFIX: &str = "pupil_";
const STATEMENT_PREFIX: &str = "statement_";
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Default)]
pub struct IncidentForm {
  fields: HashMap<String, String>,
  slots:  BTreeMap<usize, SubmittedSlot>,
}

impl IncidentForm {
  /// Drain every field of `multipart`.
  pub async fn read(multipart: &mut Multipart) -> Result<Self, Error> {
    let mut form = Self::default();

    while let Some(field) = multipart
      .next_field()
      .await
      .map_err(|e| Error::BadRequest(e.to_string()))?
    {
      let name = field.name().unwrap_or_default().to_owned();

      if let Some(n) = name.strip_prefix(STATEMENT_PREFIX) {
        let slot = slot_number(n)?;
        let filename = field.file_name().unwrap_or_default().to_owned();
        let data = field
          .bytes()
          .await
          .map_err(|e| Error::BadRequest(e.to_string()))?;
        form.slot(slot).statement = Some(Upload::new(filename, data.to_vec()));
        continue;
      }

      let value = field
        .text()
        .await
        .map_err(|e| Error::BadRequest(e.to_string()))?;
      if let Some(n) = name.strip_prefix(PUPIL_PREFIX) {
        form.slot(slot_number(n)?).pupil_name = value;
      } else {
        form.fields.insert(name, value);
      }
    }

    Ok(form)
  }

  fn slot(&mut self, number: usize) -> &mut SubmittedSlot {
    self
      .slots
      .entry(number)
      .or_insert_with(|| SubmittedSlot::new(number, ""))
  }

  fn text(&self, name: &str) -> String {
    self.fields.get(name).cloned().unwrap_or_default()
  }

  fn flag(&self, name: &str) -> bool {
    self.fields.get(name).is_some_and(|v| {
      !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "off" | "false")
    })
  }

  fn non_blank(&self, name: &str) -> Option<&str> {
    self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
  }

  /// Overwrite the editable fields of `incident` with the submitted values.
  pub fn apply(&self, incident: &mut Incident) -> Result<(), Error> {
    incident.one_liner = self.text("one_liner");
    incident.description = self.text("description");
    incident.is_incident = self.flag("is_incident");
    incident.is_racial = self.flag("is_racial");
    incident.is_bullying = self.flag("is_bullying");
    incident.is_concern = self.flag("is_concern");
    incident.other_type = self.text("other_type");
    incident.action_taken = self.text("action_taken");

    if let Some(date) = self.non_blank("logged_on") {
      incident.logged_on = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|e| Error::BadRequest(format!("logged_on {date:?}: {e}")))?;
    }
    if let Some(status) = self.non_blank("status") {
      incident.status = status.parse::<IncidentStatus>()?;
    }
    Ok(())
  }

  /// Pupil slots in slot-number order.
  pub fn into_slots(self) -> Vec<SubmittedSlot> { self.slots.into_values().collect() }
}

fn slot_number(s: &str) -> Result<usize, Error> {
  s.parse()
    .map_err(|_| Error::BadRequest(format!("bad pupil slot number {s:?}")))
}
