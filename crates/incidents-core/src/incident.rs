//! The incident record and its status lookup.

use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, pupil::Pupil};

/// Prefix of the human-facing incident identifier (`INC-0001`).
pub const IDENTIFIER_PREFIX: &str = "INC-";

/// Number of pupil slots an edit form shows when an incident has fewer
/// associations.
pub const DEFAULT_MIN_SLOTS: usize = 4;

/// Format a numeric incident id as `INC-%04d`.
pub fn format_identifier(incident_id: i64) -> String {
  format!("{IDENTIFIER_PREFIX}{incident_id:04}")
}

/// Parse an `INC-nnnn` identifier back into its numeric id.
pub fn parse_identifier(s: &str) -> Option<i64> {
  let digits = s.strip_prefix(IDENTIFIER_PREFIX)?;
  if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  digits.parse().ok()
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Workflow status, backed by the `incident_status` lookup table.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
pub enum IncidentStatus {
  #[default]
  Open,
  Pending,
  Closed,
}

impl IncidentStatus {
  pub const ALL: [IncidentStatus; 3] = [Self::Open, Self::Pending, Self::Closed];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Open => "Open",
      Self::Pending => "Pending",
      Self::Closed => "Closed",
    }
  }

  /// Position in the lookup table; used for sorting instead of the name.
  pub fn sequence(self) -> u8 {
    match self {
      Self::Open => 1,
      Self::Pending => 2,
      Self::Closed => 3,
    }
  }
}

impl fmt::Display for IncidentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for IncidentStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|st| st.as_str() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

// ─── Associations ────────────────────────────────────────────────────────────

/// The link between an incident and one pupil.
///
/// The statement payload itself is only loaded on download; the record
/// carries its extension so views can tell whether one exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentPupil {
  pub association_id:      i64,
  pub pupil:               Pupil,
  pub statement_extension: Option<String>,
}

impl IncidentPupil {
  pub fn has_statement(&self) -> bool { self.statement_extension.is_some() }
}

/// One row of the fixed-size pupil section of an edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NumberedPupil<'a> {
  /// 1-based.
  pub number:        usize,
  /// Empty for padding slots.
  pub name:          &'a str,
  pub has_statement: bool,
}

// ─── Incident ────────────────────────────────────────────────────────────────

/// A logged incident.
///
/// Text fields are never absent: they default to the empty string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Incident {
  /// `None` until the incident has been stored.
  pub incident_id:  Option<i64>,
  pub one_liner:    String,
  pub description:  String,
  pub is_incident:  bool,
  pub is_racial:    bool,
  pub is_bullying:  bool,
  pub is_concern:   bool,
  pub other_type:   String,
  pub logged_on:    NaiveDate,
  pub status:       IncidentStatus,
  pub action_taken: String,
  /// Associations in creation order.
  pub pupils:       Vec<IncidentPupil>,
}

impl Default for Incident {
  fn default() -> Self { Self::new() }
}

impl Incident {
  /// An unsaved incident logged today, status `Open`, everything else empty.
  pub fn new() -> Self { Self::new_on(Local::now().date_naive()) }

  /// As [`Incident::new`] with an explicit logged date.
  pub fn new_on(logged_on: NaiveDate) -> Self {
    Self {
      incident_id: None,
      one_liner: String::new(),
      description: String::new(),
      is_incident: false,
      is_racial: false,
      is_bullying: false,
      is_concern: false,
      other_type: String::new(),
      logged_on,
      status: IncidentStatus::Open,
      action_taken: String::new(),
      pupils: Vec::new(),
    }
  }

  /// `INC-%04d`; fails for an incident that has not been stored.
  pub fn identifier(&self) -> Result<String> {
    self.incident_id.map(format_identifier).ok_or(Error::Unsaved)
  }

  /// Labels for each set classification flag, in the fixed order Incident,
  /// Racial, Bullying, Concern, followed by `other_type` if non-empty.
  ///
  /// The iterator is `Clone`, so it can be walked more than once.
  pub fn types(&self) -> impl Iterator<Item = &str> + Clone + '_ {
    [
      (self.is_incident, "Incident"),
      (self.is_racial, "Racial"),
      (self.is_bullying, "Bullying"),
      (self.is_concern, "Concern"),
    ]
    .into_iter()
    .filter_map(|(set, label)| set.then_some(label))
    .chain((!self.other_type.is_empty()).then_some(self.other_type.as_str()))
  }

  /// One entry per association followed by blank entries, so that at least
  /// `min_slots` entries are produced.
  pub fn numbered_pupils(
    &self,
    min_slots: usize,
  ) -> impl Iterator<Item = NumberedPupil<'_>> + Clone + '_ {
    let padding = min_slots.saturating_sub(self.pupils.len());
    self
      .pupils
      .iter()
      .map(|ip| (ip.pupil.name.as_str(), ip.has_statement()))
      .chain(std::iter::repeat_n(("", false), padding))
      .enumerate()
      .map(|(i, (name, has_statement))| NumberedPupil {
        number: i + 1,
        name,
        has_statement,
      })
  }

  /// Names of associated pupils in association order.
  pub fn pupil_names(&self) -> impl Iterator<Item = &str> + '_ {
    self.pupils.iter().map(|ip| ip.pupil.name.as_str())
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn association(id: i64, name: &str, ext: Option<&str>) -> IncidentPupil {
    IncidentPupil {
      association_id:      id,
      pupil:               Pupil { pupil_id: id, name: name.into() },
      statement_extension: ext.map(str::to_owned),
    }
  }

  #[test]
  fn new_incident_defaults() {
    let i = Incident::new();
    assert_eq!(i.incident_id, None);
    assert_eq!(i.one_liner, "");
    assert_eq!(i.description, "");
    assert_eq!(i.other_type, "");
    assert_eq!(i.action_taken, "");
    assert!(!i.is_incident && !i.is_racial && !i.is_bullying && !i.is_concern);
    assert_eq!(i.status, IncidentStatus::Open);
    assert_eq!(i.logged_on, Local::now().date_naive());
    assert!(i.pupils.is_empty());
  }

  #[test]
  fn identifier_is_zero_padded() {
    let mut i = Incident::new();
    i.incident_id = Some(7);
    assert_eq!(i.identifier().unwrap(), "INC-0007");
    i.incident_id = Some(12345);
    assert_eq!(i.identifier().unwrap(), "INC-12345");
  }

  #[test]
  fn identifier_of_unsaved_incident_fails() {
    assert!(matches!(Incident::new().identifier(), Err(Error::Unsaved)));
  }

  #[test]
  fn parse_identifier_accepts_only_prefixed_digits() {
    assert_eq!(parse_identifier("INC-0001"), Some(1));
    assert_eq!(parse_identifier("INC-"), None);
    assert_eq!(parse_identifier("INC-12a4"), None);
    assert_eq!(parse_identifier("inc-0001"), None);
  }

  #[test]
  fn types_racial_and_other() {
    let mut i = Incident::new();
    i.is_racial = true;
    i.other_type = "Blancmange".into();
    let types: Vec<&str> = i.types().collect();
    assert_eq!(types, ["Racial", "Blancmange"]);
  }

  #[test]
  fn types_fixed_order_and_restartable() {
    let mut i = Incident::new();
    i.is_concern = true;
    i.is_incident = true;
    i.is_bullying = true;
    let types = i.types();
    let first: Vec<&str> = types.clone().collect();
    let second: Vec<&str> = types.collect();
    assert_eq!(first, ["Incident", "Bullying", "Concern"]);
    assert_eq!(first, second);
  }

  #[test]
  fn types_empty_when_nothing_set() {
    assert_eq!(Incident::new().types().count(), 0);
  }

  #[test]
  fn numbered_pupils_pads_to_minimum() {
    let mut i = Incident::new();
    i.pupils = vec![
      association(1, "Tim Golden", None),
      association(2, "Stephen Davis", Some("pdf")),
    ];
    let slots: Vec<NumberedPupil<'_>> = i.numbered_pupils(4).collect();
    assert_eq!(slots.len(), 4);
    assert_eq!(
      slots[0],
      NumberedPupil { number: 1, name: "Tim Golden", has_statement: false }
    );
    assert_eq!(
      slots[1],
      NumberedPupil { number: 2, name: "Stephen Davis", has_statement: true }
    );
    assert_eq!(
      slots[3],
      NumberedPupil { number: 4, name: "", has_statement: false }
    );
  }

  #[test]
  fn numbered_pupils_never_truncates() {
    let mut i = Incident::new();
    i.pupils = (1..=5)
      .map(|n| association(n, &format!("Pupil Number{n}"), None))
      .collect();
    let numbers: Vec<usize> = i.numbered_pupils(4).map(|s| s.number).collect();
    assert_eq!(numbers, [1, 2, 3, 4, 5]);
  }

  #[test]
  fn status_round_trips_through_str() {
    for st in IncidentStatus::ALL {
      assert_eq!(st.as_str().parse::<IncidentStatus>().unwrap(), st);
    }
    assert!(matches!(
      "Archived".parse::<IncidentStatus>(),
      Err(Error::UnknownStatus(_))
    ));
  }

  #[test]
  fn status_sequence_orders_workflow() {
    let mut all = vec![
      IncidentStatus::Closed,
      IncidentStatus::Open,
      IncidentStatus::Pending,
    ];
    all.sort_by_key(|s| s.sequence());
    assert_eq!(all, IncidentStatus::ALL);
  }
}
