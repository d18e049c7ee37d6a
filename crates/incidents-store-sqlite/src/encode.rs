//! Encoding and decoding helpers between domain types and the values stored
//! in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text, statuses by lookup name, flags as
//! 0/1 integers.

use chrono::NaiveDate;
use incidents_core::{
  incident::{Incident, IncidentPupil, IncidentStatus},
  pupil::Pupil,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── IncidentStatus ──────────────────────────────────────────────────────────

pub fn encode_status(s: IncidentStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<IncidentStatus> { Ok(s.parse()?) }

// ─── Incident columns ────────────────────────────────────────────────────────

/// The editable columns of an `incidents` row, owned so they can be moved
/// onto the database thread.
pub struct IncidentColumns {
  pub one_liner:    String,
  pub description:  String,
  pub is_incident:  bool,
  pub is_racial:    bool,
  pub is_bullying:  bool,
  pub is_concern:   bool,
  pub other_type:   String,
  pub logged_on:    String,
  pub status:       &'static str,
  pub action_taken: String,
}

impl IncidentColumns {
  pub fn from_incident(i: &Incident) -> Self {
    Self {
      one_liner:    i.one_liner.clone(),
      description:  i.description.clone(),
      is_incident:  i.is_incident,
      is_racial:    i.is_racial,
      is_bullying:  i.is_bullying,
      is_concern:   i.is_concern,
      other_type:   i.other_type.clone(),
      logged_on:    encode_date(i.logged_on),
      status:       encode_status(i.status),
      action_taken: i.action_taken.clone(),
    }
  }

  /// Positional parameters `?1..?10`, in [`INCIDENT_COLUMNS`] order.
  pub fn bind(&self) -> [&dyn rusqlite::ToSql; 10] {
    [
      &self.one_liner,
      &self.description,
      &self.is_incident,
      &self.is_racial,
      &self.is_bullying,
      &self.is_concern,
      &self.other_type,
      &self.logged_on,
      &self.status,
      &self.action_taken,
    ]
  }
}

/// Column list matching [`IncidentColumns::bind`].
pub const INCIDENT_COLUMNS: &str = "one_liner, description, is_incident, \
  is_racial, is_bullying, is_concern, other_type, logged_on, status, \
  action_taken";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `incidents` row.
pub struct RawIncident {
  pub incident_id:  i64,
  pub one_liner:    String,
  pub description:  String,
  pub is_incident:  bool,
  pub is_racial:    bool,
  pub is_bullying:  bool,
  pub is_concern:   bool,
  pub other_type:   String,
  pub logged_on:    String,
  pub status:       String,
  pub action_taken: String,
}

/// `SELECT` list producing a [`RawIncident`] via [`RawIncident::from_row`].
pub const SELECT_INCIDENT: &str = "SELECT incident_id, one_liner, description, \
  is_incident, is_racial, is_bullying, is_concern, other_type, logged_on, \
  status, action_taken FROM incidents";

impl RawIncident {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      incident_id:  row.get(0)?,
      one_liner:    row.get(1)?,
      description:  row.get(2)?,
      is_incident:  row.get(3)?,
      is_racial:    row.get(4)?,
      is_bullying:  row.get(5)?,
      is_concern:   row.get(6)?,
      other_type:   row.get(7)?,
      logged_on:    row.get(8)?,
      status:       row.get(9)?,
      action_taken: row.get(10)?,
    })
  }

  pub fn into_incident(self, pupils: Vec<IncidentPupil>) -> Result<Incident> {
    Ok(Incident {
      incident_id: Some(self.incident_id),
      one_liner: self.one_liner,
      description: self.description,
      is_incident: self.is_incident,
      is_racial: self.is_racial,
      is_bullying: self.is_bullying,
      is_concern: self.is_concern,
      other_type: self.other_type,
      logged_on: decode_date(&self.logged_on)?,
      status: decode_status(&self.status)?,
      action_taken: self.action_taken,
      pupils,
    })
  }
}

/// Raw values from `incident_pupils` joined with `pupils`.
pub struct RawAssociation {
  pub association_id:      i64,
  pub incident_id:         i64,
  pub pupil_id:            i64,
  pub name:                String,
  pub statement_extension: Option<String>,
}

/// `SELECT` prefix producing a [`RawAssociation`]; callers append `WHERE` and
/// must keep `ORDER BY ip.association_id`.
pub const SELECT_ASSOCIATION: &str = "SELECT ip.association_id, ip.incident_id, \
  p.pupil_id, p.name, ip.statement_extension \
  FROM incident_pupils ip JOIN pupils p ON p.pupil_id = ip.pupil_id";

impl RawAssociation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      association_id:      row.get(0)?,
      incident_id:         row.get(1)?,
      pupil_id:            row.get(2)?,
      name:                row.get(3)?,
      statement_extension: row.get(4)?,
    })
  }

  pub fn into_incident_pupil(self) -> IncidentPupil {
    IncidentPupil {
      association_id:      self.association_id,
      pupil:               Pupil { pupil_id: self.pupil_id, name: self.name },
      statement_extension: self.statement_extension,
    }
  }
}
