//! One named table of cells: a header row followed by data rows.

use std::collections::HashSet;

use serde_json::Value;

use crate::{
  cell::CellValue,
  error::{CellError, Error, Result},
};

/// Sheet names longer than this are truncated.
pub const MAX_SHEET_NAME_CHARS: usize = 31;
pub const MAX_COLUMNS: usize = 16_384;
/// Data rows; the header takes the remaining row of the format.
pub const MAX_DATA_ROWS: usize = 1_048_575;
/// Characters the format does not allow in a sheet name.
const FORBIDDEN_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
/// Name the format keeps for itself.
const RESERVED_NAME: &str = "History";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
  /// `None` (or empty) gets a default name from the sheet's position.
  pub name:    Option<String>,
  pub headers: Vec<String>,
  /// Written verbatim, in order, below the header.
  pub rows:    Vec<Vec<CellValue>>,
}

impl Sheet {
  pub fn new<H, S>(name: impl Into<String>, headers: H) -> Self
  where
    H: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      name:    Some(name.into()),
      headers: headers.into_iter().map(Into::into).collect(),
      rows:    Vec::new(),
    }
  }

  pub fn push_row(&mut self, row: impl IntoIterator<Item = CellValue>) {
    self.rows.push(row.into_iter().collect());
  }

  /// Build a sheet from dynamically typed rows, failing on the first value
  /// with no cell representation.
  pub fn from_json_rows(
    name: Option<String>,
    headers: Vec<String>,
    rows: &[Vec<Value>],
  ) -> Result<Self> {
    let mut sheet = Self { name, headers, rows: Vec::with_capacity(rows.len()) };
    for (r, row) in rows.iter().enumerate() {
      let cells = row
        .iter()
        .enumerate()
        .map(|(c, v)| {
          CellValue::try_from(v).map_err(|reason| Error::Serialization {
            sheet: sheet.name.clone().unwrap_or_default(),
            row: r + 1,
            column: c,
            reason,
          })
        })
        .collect::<Result<Vec<_>>>()?;
      sheet.rows.push(cells);
    }
    Ok(sheet)
  }

  /// The name the sheet is written under when it is the `index`th sheet
  /// (zero-based) of a workbook.
  pub fn title(&self, index: usize) -> String {
    match self.name.as_deref() {
      Some(name) if !name.is_empty() => {
        name.chars().take(MAX_SHEET_NAME_CHARS).collect()
      }
      _ => format!("Sheet {index}"),
    }
  }

  /// Every data cell, row by row.
  pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut CellValue> + '_ {
    self.rows.iter_mut().flatten()
  }

  /// Check the sheet against the limits of the format before anything is
  /// written.
  pub fn validate(&self, title: &str) -> Result<()> {
    let fail = |row: usize, column: usize, reason: CellError| {
      Err(Error::Serialization { sheet: title.to_owned(), row, column, reason })
    };

    if let Err(reason) = check_title(title) {
      return fail(0, 0, reason);
    }
    if self.rows.len() > MAX_DATA_ROWS {
      return fail(MAX_DATA_ROWS + 1, 0, CellError::RowLimit);
    }
    if self.headers.len() > MAX_COLUMNS {
      return fail(0, MAX_COLUMNS, CellError::ColumnLimit);
    }
    for (c, header) in self.headers.iter().enumerate() {
      if let Err(reason) = CellValue::text(header.as_str()).check() {
        return fail(0, c, reason);
      }
    }
    for (r, row) in self.rows.iter().enumerate() {
      if row.len() > MAX_COLUMNS {
        return fail(r + 1, MAX_COLUMNS, CellError::ColumnLimit);
      }
      for (c, cell) in row.iter().enumerate() {
        if let Err(reason) = cell.check() {
          return fail(r + 1, c, reason);
        }
      }
    }
    Ok(())
  }
}

fn check_title(title: &str) -> Result<(), CellError> {
  let invalid = title.contains(FORBIDDEN_NAME_CHARS)
    || title.starts_with('\'')
    || title.ends_with('\'')
    || title.eq_ignore_ascii_case(RESERVED_NAME);
  if invalid {
    Err(CellError::SheetName(title.to_owned()))
  } else {
    Ok(())
  }
}

/// Sheet names must be unique within a workbook, ignoring case.
pub fn check_unique_titles(titles: &[String]) -> Result<()> {
  let mut seen = HashSet::new();
  for title in titles {
    if !seen.insert(title.to_lowercase()) {
      return Err(Error::Serialization {
        sheet:  title.clone(),
        row:    0,
        column: 0,
        reason: CellError::DuplicateSheetName(title.clone()),
      });
    }
  }
  Ok(())
}
