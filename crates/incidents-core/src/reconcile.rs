//! Incident-pupil reconciliation: submitted form slots → minimal store
//! operations.
//!
//! Computes which existing associations are kept (optionally with a
//! replacement statement), which pupils are newly associated, and which
//! associations are dropped, so that the stored state matches one form
//! submission. Pure; the store applies the plan inside a transaction.

use std::collections::HashMap;

use crate::{
  Error, Result,
  attachment::Upload,
  error::RejectedSlot,
  incident::IncidentPupil,
  pupil::split_name,
};

/// One pupil row of a submitted edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedSlot {
  /// 1-based slot number; only used to report rejected names.
  pub slot:       usize,
  pub pupil_name: String,
  /// `None` (or an empty upload) leaves any existing statement untouched.
  pub statement:  Option<Upload>,
}

impl SubmittedSlot {
  pub fn new(slot: usize, pupil_name: impl Into<String>) -> Self {
    Self { slot, pupil_name: pupil_name.into(), statement: None }
  }

  pub fn with_statement(mut self, upload: Upload) -> Self {
    self.statement = Some(upload);
    self
  }

  fn is_blank(&self) -> bool { self.pupil_name.trim().is_empty() }

  /// The statement if it carries any bytes.
  fn into_statement(self) -> Option<Upload> {
    self.statement.filter(|u| !u.is_empty())
  }
}

/// An existing association referenced again by the submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retained {
  pub association_id: i64,
  /// Replacement statement; `None` keeps the stored one.
  pub statement:      Option<Upload>,
}

/// A pupil not yet associated with the incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
  /// Exact submitted name; resolves to an existing pupil or creates one.
  pub pupil_name: String,
  pub statement:  Option<Upload>,
}

/// The result of reconciling a submission against current associations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
  /// In submission order.
  pub retained: Vec<Retained>,
  /// In submission order.
  pub added:    Vec<Added>,
  /// Association ids to delete, in their stored order.
  pub removed:  Vec<i64>,
}

impl ReconcilePlan {
  /// Retained associations that actually need their statement rewritten.
  pub fn replacements(&self) -> impl Iterator<Item = (i64, &Upload)> + '_ {
    self
      .retained
      .iter()
      .filter_map(|r| r.statement.as_ref().map(|u| (r.association_id, u)))
  }

  pub fn counts(&self) -> ReconcileCounts {
    ReconcileCounts {
      retained: self.retained.len(),
      replaced: self.replacements().count(),
      added:    self.added.len(),
      removed:  self.removed.len(),
    }
  }

  /// True if applying the plan would not change anything.
  pub fn is_noop(&self) -> bool {
    self.added.is_empty()
      && self.removed.is_empty()
      && self.replacements().next().is_none()
  }
}

/// Sizes of a plan, for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
  pub retained: usize,
  /// Retained associations whose statement is replaced.
  pub replaced: usize,
  pub added:    usize,
  pub removed:  usize,
}

enum Pending {
  Retained(usize),
  Added(usize),
}

/// Compute the plan that transitions `current` to match `slots`.
///
/// - Blank names are ignored; they never delete anything.
/// - A name matching an existing association keeps it.
/// - Any other name becomes a new association.
/// - Existing associations no submitted slot names are removed, unless the
///   submission names nobody at all, in which case nothing is removed.
/// - A name submitted more than once yields one association; the last slot
///   with a non-empty statement supplies the file.
///
/// Every non-blank name must have a surname. All offending slots are
/// reported together in [`Error::RejectedSlots`] and no plan is produced.
pub fn plan(
  current: &[IncidentPupil],
  slots: impl IntoIterator<Item = SubmittedSlot>,
) -> Result<ReconcilePlan> {
  let mut unreferenced: HashMap<&str, i64> = current
    .iter()
    .map(|ip| (ip.pupil.name.as_str(), ip.association_id))
    .collect();

  let mut plan = ReconcilePlan::default();
  let mut seen: HashMap<String, Pending> = HashMap::new();
  let mut rejected: Vec<RejectedSlot> = Vec::new();
  let mut named_any = false;

  for slot in slots {
    if slot.is_blank() {
      continue;
    }
    named_any = true;
    if split_name(&slot.pupil_name).is_err() {
      rejected.push(RejectedSlot {
        slot: slot.slot,
        name: slot.pupil_name,
      });
      continue;
    }

    let name = slot.pupil_name.clone();
    let statement = slot.into_statement();

    if let Some(pending) = seen.get(&name) {
      // Duplicate within the submission: a later file wins, a later
      // missing file changes nothing.
      if statement.is_some() {
        match *pending {
          Pending::Retained(i) => plan.retained[i].statement = statement,
          Pending::Added(i) => plan.added[i].statement = statement,
        }
      }
      continue;
    }

    match unreferenced.remove(name.as_str()) {
      Some(association_id) => {
        seen.insert(name, Pending::Retained(plan.retained.len()));
        plan.retained.push(Retained { association_id, statement });
      }
      None => {
        seen.insert(name.clone(), Pending::Added(plan.added.len()));
        plan.added.push(Added { pupil_name: name, statement });
      }
    }
  }

  if !rejected.is_empty() {
    return Err(Error::RejectedSlots(rejected));
  }

  if !named_any {
    return Ok(plan);
  }

  plan.removed = current
    .iter()
    .filter(|ip| unreferenced.contains_key(ip.pupil.name.as_str()))
    .map(|ip| ip.association_id)
    .collect();

  Ok(plan)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;
  use crate::pupil::Pupil;

  fn association(id: i64, name: &str) -> IncidentPupil {
    IncidentPupil {
      association_id:      id,
      pupil:               Pupil { pupil_id: id * 10, name: name.into() },
      statement_extension: None,
    }
  }

  fn file(name: &str, body: &[u8]) -> Upload { Upload::new(name, body.to_vec()) }

  #[test]
  fn keeps_existing_and_adds_new() {
    let current = [association(1, "Tim Golden")];
    let slots = [
      SubmittedSlot::new(1, "Tim Golden"),
      SubmittedSlot::new(2, "Stephen Davis").with_statement(file("x.pdf", b"X")),
    ];
    let plan = plan(&current, slots).unwrap();

    assert_eq!(plan.retained, [Retained { association_id: 1, statement: None }]);
    assert_eq!(
      plan.added,
      [Added {
        pupil_name: "Stephen Davis".into(),
        statement:  Some(file("x.pdf", b"X")),
      }]
    );
    assert!(plan.removed.is_empty());
  }

  #[test]
  fn all_blank_slots_change_nothing() {
    let current = [association(1, "Tim Golden"), association(2, "Chris Doran")];
    let slots = [SubmittedSlot::new(1, ""), SubmittedSlot::new(2, "  ")];
    let plan = plan(&current, slots).unwrap();

    assert!(plan.added.is_empty());
    assert!(plan.removed.is_empty());
    assert!(plan.is_noop());
  }

  #[test]
  fn no_slots_at_all_change_nothing() {
    let current = [association(1, "Tim Golden")];
    assert!(plan(&current, Vec::new()).unwrap().is_noop());
  }

  #[test]
  fn omitted_pupil_is_removed() {
    let current = [association(1, "Tim Golden"), association(2, "Chris Doran")];
    let slots = [SubmittedSlot::new(1, "Chris Doran"), SubmittedSlot::new(2, "")];
    let plan = plan(&current, slots).unwrap();

    assert_eq!(plan.removed, [1]);
    assert_eq!(plan.retained.len(), 1);
    assert_eq!(plan.retained[0].association_id, 2);
  }

  #[test]
  fn replacement_statement_only_when_uploaded() {
    let current = [association(1, "Tim Golden"), association(2, "Chris Doran")];
    let slots = [
      SubmittedSlot::new(1, "Tim Golden").with_statement(file("new.doc", b"N")),
      SubmittedSlot::new(2, "Chris Doran").with_statement(file("", b"")),
    ];
    let plan = plan(&current, slots).unwrap();

    let replacements: Vec<(i64, &Upload)> = plan.replacements().collect();
    assert_eq!(replacements.len(), 1);
    assert_eq!(replacements[0].0, 1);
    assert_eq!(replacements[0].1.data, b"N");
  }

  #[test]
  fn duplicate_names_collapse_last_file_wins() {
    let slots = [
      SubmittedSlot::new(1, "Pablo Hinojo").with_statement(file("a.pdf", b"A")),
      SubmittedSlot::new(2, "Pablo Hinojo").with_statement(file("b.pdf", b"B")),
      SubmittedSlot::new(3, "Pablo Hinojo"),
    ];
    let plan = plan(&[], slots).unwrap();

    assert_eq!(plan.added.len(), 1);
    assert_eq!(plan.added[0].statement, Some(file("b.pdf", b"B")));
  }

  #[test]
  fn duplicate_of_existing_association_is_retained_once() {
    let current = [association(1, "Tim Golden")];
    let slots = [
      SubmittedSlot::new(1, "Tim Golden"),
      SubmittedSlot::new(2, "Tim Golden").with_statement(file("t.png", b"T")),
    ];
    let plan = plan(&current, slots).unwrap();

    assert!(plan.added.is_empty());
    assert!(plan.removed.is_empty());
    assert_eq!(plan.retained.len(), 1);
    assert_eq!(plan.retained[0].statement, Some(file("t.png", b"T")));
  }

  #[test]
  fn matching_is_exact() {
    let current = [association(1, "Tim Golden")];
    let slots = [SubmittedSlot::new(1, "tim golden")];
    let plan = plan(&current, slots).unwrap();

    assert_eq!(plan.added.len(), 1);
    assert_eq!(plan.removed, [1]);
  }

  #[test]
  fn names_without_surname_reject_whole_submission() {
    let current = [association(1, "Tim Golden")];
    let slots = [
      SubmittedSlot::new(1, "Tim Golden"),
      SubmittedSlot::new(2, "Cher"),
      SubmittedSlot::new(3, "Stephen Davis"),
      SubmittedSlot::new(4, "Prince"),
    ];
    let err = plan(&current, slots).unwrap_err();

    match err {
      Error::RejectedSlots(rejected) => {
        assert_eq!(
          rejected,
          [
            RejectedSlot { slot: 2, name: "Cher".into() },
            RejectedSlot { slot: 4, name: "Prince".into() },
          ]
        );
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn unchanged_submission_is_noop() {
    let current = [association(1, "Tim Golden"), association(2, "Chris Doran")];
    let slots = [
      SubmittedSlot::new(1, "Tim Golden"),
      SubmittedSlot::new(2, "Chris Doran"),
      SubmittedSlot::new(3, ""),
      SubmittedSlot::new(4, ""),
    ];
    assert!(plan(&current, slots).unwrap().is_noop());
  }
}
