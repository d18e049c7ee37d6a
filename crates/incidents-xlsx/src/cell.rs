//! The tagged cell model.
//!
//! Every value placed on a sheet is one of a few explicit variants, each with
//! its own write rule in the writer.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::error::CellError;

/// Longest text a single cell can hold.
pub const MAX_TEXT_CHARS: usize = 32_767;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
  /// Nothing is written.
  Empty,
  Text(String),
  /// Must be finite.
  Number(f64),
  /// Written as a date serial with a `yyyy-mm-dd` number format.
  Date(NaiveDate),
  /// A URL cell showing `text` in the hyperlink style.
  Hyperlink { url: String, text: String },
}

impl CellValue {
  /// Text cell; an empty string is an [`CellValue::Empty`] cell, which is
  /// also how it reads back.
  pub fn text(s: impl Into<String>) -> Self {
    let s = s.into();
    if s.is_empty() { Self::Empty } else { Self::Text(s) }
  }

  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(s) => Some(s),
      _ => None,
    }
  }

  /// The same value with hyperlinks reduced to their display text.
  pub fn without_link(self) -> Self {
    match self {
      Self::Hyperlink { text, .. } => Self::text(text),
      other => other,
    }
  }

  /// Check the value against the cell limits of the format.
  pub fn check(&self) -> Result<(), CellError> {
    match self {
      Self::Number(n) if !n.is_finite() => Err(CellError::NotFinite(*n)),
      Self::Text(s) | Self::Hyperlink { text: s, .. } => {
        let chars = s.chars().count();
        if chars > MAX_TEXT_CHARS {
          Err(CellError::TextTooLong(chars))
        } else {
          Ok(())
        }
      }
      Self::Date(d) if !(1900..=9999).contains(&d.year()) => {
        Err(CellError::DateOutOfRange(*d))
      }
      _ => Ok(()),
    }
  }
}

impl From<&str> for CellValue {
  fn from(s: &str) -> Self { Self::text(s) }
}

impl From<String> for CellValue {
  fn from(s: String) -> Self { Self::text(s) }
}

impl From<f64> for CellValue {
  fn from(n: f64) -> Self { Self::Number(n) }
}

impl From<NaiveDate> for CellValue {
  fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

/// Dynamically typed rows: null is empty, booleans become `TRUE`/`FALSE`,
/// numbers and strings map directly. Arrays and objects are rejected.
impl TryFrom<&Value> for CellValue {
  type Error = CellError;

  fn try_from(v: &Value) -> Result<Self, CellError> {
    match v {
      Value::Null => Ok(Self::Empty),
      Value::Bool(b) => Ok(Self::Text(if *b { "TRUE" } else { "FALSE" }.into())),
      Value::Number(n) => n
        .as_f64()
        .map(Self::Number)
        .ok_or(CellError::Unsupported("out-of-range number")),
      Value::String(s) => Ok(Self::text(s.as_str())),
      Value::Array(_) => Err(CellError::Unsupported("array")),
      Value::Object(_) => Err(CellError::Unsupported("object")),
    }
  }
}
