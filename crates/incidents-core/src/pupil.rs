//! Pupils and the surname-first name ordering.
//!
//! A pupil is identified by its full name. The name is split on whitespace:
//! the last token is the surname, everything before it the given names.
//! Pupils sort by surname, then given names, never by the raw string.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Name model ──────────────────────────────────────────────────────────────

/// Split `full_name` into `(given_names, surname)`.
///
/// Fails with [`Error::InvalidName`] when the name has fewer than two
/// whitespace-separated tokens.
pub fn split_name(full_name: &str) -> Result<(Vec<&str>, &str)> {
  let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
  if tokens.len() < 2 {
    return Err(Error::InvalidName(full_name.to_owned()));
  }
  let surname = tokens.pop().unwrap_or_default();
  Ok((tokens, surname))
}

/// Compare two full names by `(surname, given_names)`.
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
  let (given_a, surname_a) = split_name(a)?;
  let (given_b, surname_b) = split_name(b)?;
  Ok((surname_a, given_a).cmp(&(surname_b, given_b)))
}

/// Ordering key for names that may lack a surname.
///
/// A single-token name sorts as if that token were the surname, so stored
/// pupils always have a total order.
fn sort_key(full_name: &str) -> (&str, Vec<&str>) {
  let mut tokens: Vec<&str> = full_name.split_whitespace().collect();
  let surname = tokens.pop().unwrap_or_default();
  (surname, tokens)
}

// ─── Pupil ───────────────────────────────────────────────────────────────────

/// A pupil referenced by one or more incidents.
///
/// Pupils are created the first time an incident names them and are never
/// deleted afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pupil {
  pub pupil_id: i64,
  pub name:     String,
}

impl Pupil {
  /// Everything but the last token of the name, joined by single spaces.
  pub fn first_name(&self) -> Result<String> {
    split_name(&self.name).map(|(given, _)| given.join(" "))
  }

  pub fn last_name(&self) -> Result<&str> {
    split_name(&self.name).map(|(_, surname)| surname)
  }
}

impl PartialEq for Pupil {
  fn eq(&self, other: &Self) -> bool { self.name == other.name }
}

impl Eq for Pupil {}

impl PartialOrd for Pupil {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Pupil {
  fn cmp(&self, other: &Self) -> Ordering {
    // Raw name breaks ties between names differing only in spacing, keeping
    // the order consistent with `Eq`.
    sort_key(&self.name)
      .cmp(&sort_key(&other.name))
      .then_with(|| self.name.cmp(&other.name))
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
