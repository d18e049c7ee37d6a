//! JSON shapes returned by the handlers.

use chrono::NaiveDate;
use incidents_core::{
  Result,
  attachment::AttachmentInfo,
  incident::{Incident, IncidentStatus},
};
use serde::Serialize;

/// One line of the incident list.
#[derive(Debug, Serialize)]
pub struct IncidentSummary {
  pub incident_id: i64,
  pub identifier:  String,
  pub logged_on:   NaiveDate,
  pub status:      IncidentStatus,
  pub one_liner:   String,
  pub types:       Vec<String>,
  pub pupils:      Vec<String>,
}

impl IncidentSummary {
  pub fn from_incident(incident: &Incident) -> Result<Self> {
    Ok(Self {
      incident_id: incident.incident_id.ok_or(incidents_core::Error::Unsaved)?,
      identifier:  incident.identifier()?,
      logged_on:   incident.logged_on,
      status:      incident.status,
      one_liner:   incident.one_liner.clone(),
      types:       incident.types().map(str::to_owned).collect(),
      pupils:      incident.pupil_names().map(str::to_owned).collect(),
    })
  }
}

/// One row of the edit form's pupil section.
#[derive(Debug, Serialize)]
pub struct PupilSlot {
  pub number:        usize,
  /// Empty for padding slots.
  pub name:          String,
  pub pupil_id:      Option<i64>,
  pub has_statement: bool,
  /// Download path of the statement, if there is one.
  pub statement_url: Option<String>,
}

/// A single incident with everything the detail and edit views need.
#[derive(Debug, Serialize)]
pub struct IncidentDetail {
  pub identifier:      String,
  #[serde(flatten)]
  pub incident:        Incident,
  pub types:           Vec<String>,
  pub numbered_pupils: Vec<PupilSlot>,
  pub attachments:     Vec<AttachmentInfo>,
}

impl IncidentDetail {
  pub fn new(
    incident: Incident,
    attachments: Vec<AttachmentInfo>,
    min_slots: usize,
  ) -> Result<Self> {
    let identifier = incident.identifier()?;
    let incident_id = incident.incident_id.ok_or(incidents_core::Error::Unsaved)?;

    let pupil_ids = incident
      .pupils
      .iter()
      .map(|ip| Some(ip.pupil.pupil_id))
      .chain(std::iter::repeat(None));
    let numbered_pupils = incident
      .numbered_pupils(min_slots)
      .zip(pupil_ids)
      .map(|(slot, pupil_id)| PupilSlot {
        number: slot.number,
        name: slot.name.to_owned(),
        pupil_id,
        has_statement: slot.has_statement,
        statement_url: pupil_id.filter(|_| slot.has_statement).map(|pupil_id| {
          format!("/incidents/{incident_id}/pupils/{pupil_id}/statement")
        }),
      })
      .collect();

    Ok(Self {
      identifier,
      types: incident.types().map(str::to_owned).collect(),
      numbered_pupils,
      attachments,
      incident,
    })
  }
}
