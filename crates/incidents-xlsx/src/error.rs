//! Error types for the spreadsheet exporter.

use thiserror::Error;

/// Why a single cell could not be placed on a sheet.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellError {
  #[error("number {0} is not finite")]
  NotFinite(f64),

  #[error("text of {0} characters exceeds the 32767 character cell limit")]
  TextTooLong(usize),

  #[error("date {0} is outside the 1900-9999 range of the format")]
  DateOutOfRange(chrono::NaiveDate),

  #[error("{0} values have no cell representation")]
  Unsupported(&'static str),

  #[error("row is wider than 16384 columns")]
  ColumnLimit,

  #[error("sheet has more than 1048575 data rows")]
  RowLimit,

  #[error("sheet name {0:?} is not allowed")]
  SheetName(String),

  #[error("sheet name {0:?} is already used by another sheet")]
  DuplicateSheetName(String),
}

#[derive(Debug, Error)]
pub enum Error {
  /// `row` and `column` are zero-based sheet coordinates; row 0 is the
  /// header.
  #[error("cannot serialise sheet {sheet:?} at row {row}, column {column}: {reason}")]
  Serialization {
    sheet:  String,
    row:    usize,
    column: usize,
    reason: CellError,
  },

  #[error("core error: {0}")]
  Core(#[from] incidents_core::Error),

  #[error("xlsx error: {0}")]
  Xlsx(#[from] rust_xlsxwriter::XlsxError),

  #[error("xlsx read error: {0}")]
  Read(#[from] calamine::XlsxError),

  #[error("identifier pattern error: {0}")]
  Pattern(#[from] regex::Error),

  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
