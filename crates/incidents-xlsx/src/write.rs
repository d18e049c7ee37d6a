//! Rendering sheets into an `.xlsx` file.

use std::{io::Write as _, path::Path};

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{
  Color, ExcelDateTime, Format, FormatPattern, Workbook, Worksheet,
};

use crate::{
  Result,
  cell::CellValue,
  sheet::{Sheet, check_unique_titles},
};

/// Fill behind header cells.
const HEADER_FILL: u32 = 0xFFFF80;
/// Paper code for A4.
const PAPER_A4: u8 = 9;
const DATE_FORMAT: &str = "yyyy-mm-dd";
/// A progress line is logged every this many rows.
const PROGRESS_ROWS: usize = 1000;

struct Formats {
  header: Format,
  date:   Format,
}

impl Formats {
  fn new() -> Self {
    Self {
      header: Format::new()
        .set_bold()
        .set_pattern(FormatPattern::Solid)
        .set_background_color(Color::RGB(HEADER_FILL)),
      date:   Format::new().set_num_format(DATE_FORMAT),
    }
  }
}

/// Validate every sheet, render the workbook in memory, then move it into
/// place at `path`.
///
/// The workbook is first written to a temporary file beside `path` and
/// renamed over it, so `path` either keeps its previous content or holds the
/// complete new workbook.
pub fn write_workbook(sheets: &[Sheet], path: &Path) -> Result<()> {
  let titles: Vec<String> =
    sheets.iter().enumerate().map(|(i, s)| s.title(i)).collect();
  for (sheet, title) in sheets.iter().zip(&titles) {
    sheet.validate(title)?;
  }
  check_unique_titles(&titles)?;

  let buffer = render(sheets, &titles)?;

  let dir = path
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or(Path::new("."));
  let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
  tmp.write_all(&buffer)?;
  tmp.as_file().sync_all()?;
  tmp.persist(path).map_err(|e| e.error)?;

  tracing::info!(path = %path.display(), sheets = sheets.len(), "workbook written");
  Ok(())
}

fn render(sheets: &[Sheet], titles: &[String]) -> Result<Vec<u8>> {
  let formats = Formats::new();
  let mut workbook = Workbook::new();

  for (sheet, title) in sheets.iter().zip(titles) {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(title)?;
    worksheet.set_landscape();
    worksheet.set_paper_size(PAPER_A4);

    for (c, header) in sheet.headers.iter().enumerate() {
      worksheet.write_string_with_format(0, c as u16, header, &formats.header)?;
    }
    worksheet.set_freeze_panes(1, 0)?;
    tracing::debug!(sheet = %title, "headers written");

    for (r, row) in sheet.rows.iter().enumerate() {
      let sheet_row = (r + 1) as u32;
      for (c, cell) in row.iter().enumerate() {
        write_cell(worksheet, sheet_row, c as u16, cell, &formats)?;
      }
      if (r + 1) % PROGRESS_ROWS == 0 {
        tracing::debug!(sheet = %title, rows = r + 1, "rows written");
      }
    }
    tracing::debug!(sheet = %title, rows = sheet.rows.len(), "sheet complete");
  }

  Ok(workbook.save_to_buffer()?)
}

fn write_cell(
  worksheet: &mut Worksheet,
  row: u32,
  col: u16,
  cell: &CellValue,
  formats: &Formats,
) -> Result<()> {
  match cell {
    CellValue::Empty => {}
    CellValue::Text(s) => {
      worksheet.write_string(row, col, s)?;
    }
    CellValue::Number(n) => {
      worksheet.write_number(row, col, *n)?;
    }
    CellValue::Date(d) => {
      worksheet.write_datetime_with_format(
        row,
        col,
        &excel_date(*d)?,
        &formats.date,
      )?;
    }
    CellValue::Hyperlink { url, text } => {
      worksheet.write_url_with_text(row, col, url.as_str(), text.as_str())?;
    }
  }
  Ok(())
}

/// Dates have been range-checked by [`CellValue::check`].
fn excel_date(d: NaiveDate) -> Result<ExcelDateTime> {
  Ok(ExcelDateTime::from_ymd(d.year() as u16, d.month() as u8, d.day() as u8)?)
}
