//! Reading a workbook back into [`Sheet`]s.

use std::path::Path;

use calamine::{Data, DataType as _, Range, Reader as _, Xlsx, open_workbook};

use crate::{Result, cell::CellValue, sheet::Sheet};

/// Load every sheet of the workbook at `path`. The first row of each sheet
/// becomes its headers. Hyperlinks come back as their display text.
pub fn read_workbook(path: impl AsRef<Path>) -> Result<Vec<Sheet>> {
  let mut workbook: Xlsx<_> = open_workbook(path)?;
  let mut sheets = Vec::new();
  for name in workbook.sheet_names() {
    let range = workbook.worksheet_range(&name)?;
    sheets.push(sheet_from_range(name, &range));
  }
  Ok(sheets)
}

fn sheet_from_range(name: String, range: &Range<Data>) -> Sheet {
  let mut sheet = Sheet { name: Some(name), ..Sheet::default() };
  let Some((first_row, first_col)) = range.start() else {
    return sheet;
  };

  // Ranges begin at the first used cell; restore leading blanks.
  let mut grid: Vec<Vec<CellValue>> =
    (0..first_row).map(|_| Vec::new()).collect();
  for row in range.rows() {
    let mut cells = vec![CellValue::Empty; first_col as usize];
    cells.extend(row.iter().map(cell_value));
    grid.push(cells);
  }

  let mut rows = grid.into_iter();
  sheet.headers = rows
    .next()
    .unwrap_or_default()
    .into_iter()
    .map(|c| match c {
      CellValue::Empty => String::new(),
      CellValue::Text(s) | CellValue::Hyperlink { text: s, .. } => s,
      CellValue::Number(n) => n.to_string(),
      CellValue::Date(d) => d.to_string(),
    })
    .collect();
  sheet.rows = rows.collect();
  sheet
}

fn cell_value(data: &Data) -> CellValue {
  match data {
    Data::Empty => CellValue::Empty,
    Data::String(s) => CellValue::text(s.as_str()),
    Data::Float(f) => CellValue::Number(*f),
    Data::Int(i) => CellValue::Number(*i as f64),
    Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
    Data::DateTime(_) | Data::DateTimeIso(_) => data
      .as_date()
      .map(CellValue::Date)
      .unwrap_or_else(|| CellValue::text(data.to_string())),
    Data::DurationIso(s) => CellValue::text(s.as_str()),
    Data::Error(e) => CellValue::text(e.to_string()),
  }
}
