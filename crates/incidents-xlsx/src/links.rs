//! Post-processing pass turning incident identifiers into hyperlinks.

use incidents_core::incident::parse_identifier;
use regex::Regex;

use crate::{Result, cell::CellValue, sheet::Sheet};

/// Text cells consisting of exactly this are incident identifiers.
pub const IDENTIFIER_PATTERN: &str = r"^INC-\d{4}$";

/// Rewrites identifier cells into links to the incident's detail view.
pub struct IdentifierLinks {
  pattern:  Regex,
  base_url: String,
}

impl IdentifierLinks {
  /// `base_url` is the root the application is served from; a trailing `/`
  /// is ignored.
  pub fn new(base_url: &str) -> Result<Self> {
    Ok(Self {
      pattern:  Regex::new(IDENTIFIER_PATTERN)?,
      base_url: base_url.trim_end_matches('/').to_owned(),
    })
  }

  /// The detail URL for `text`, if it is an identifier.
  pub fn url_for(&self, text: &str) -> Option<String> {
    if !self.pattern.is_match(text) {
      return None;
    }
    let incident_id = parse_identifier(text)?;
    Some(format!("{}/incidents/{incident_id}", self.base_url))
  }

  /// Scan every cell of every sheet once. Returns the number of cells
  /// rewritten.
  pub fn apply(&self, sheets: &mut [Sheet]) -> usize {
    let mut linked = 0;
    for cell in sheets.iter_mut().flat_map(|s| s.cells_mut()) {
      let Some(url) = cell.as_text().and_then(|t| self.url_for(t)) else {
        continue;
      };
      if let CellValue::Text(text) = std::mem::replace(cell, CellValue::Empty) {
        *cell = CellValue::Hyperlink { url, text };
        linked += 1;
      }
    }
    linked
  }
}
