//! Spreadsheet export for the incident log.
//!
//! Sheets are built in memory from tagged [`CellValue`]s, post-processed so
//! incident identifiers become hyperlinks, validated against the limits of
//! the format and written as one `.xlsx` file. Pure synchronous; callers on
//! an async runtime should run exports on a blocking thread.
//!
//! # Quick start
//!
//! ```no_run
//! use incidents_xlsx::{CellValue, IdentifierLinks, Sheet, write_workbook};
//!
//! let mut sheet = Sheet::new("Incidents", ["Incident", "Status"]);
//! sheet.push_row([CellValue::text("INC-0001"), CellValue::text("Open")]);
//!
//! let mut sheets = vec![sheet];
//! IdentifierLinks::new("http://localhost:5010").unwrap().apply(&mut sheets);
//! write_workbook(&sheets, std::path::Path::new("incidents.xlsx")).unwrap();
//! ```

pub mod cell;
pub mod error;
mod incidents;
pub mod links;
mod read;
pub mod sheet;
mod write;

pub use cell::CellValue;
pub use error::{CellError, Error, Result};
pub use incidents::{HEADERS, SHEET_NAME, export_incidents, incident_sheet};
pub use links::IdentifierLinks;
pub use read::read_workbook;
pub use sheet::Sheet;
pub use write::write_workbook;

// ─── Round-trip tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use incidents_core::{
    incident::{Incident, IncidentPupil, IncidentStatus},
    pupil::Pupil,
  };

  use super::*;

  fn stored(id: i64, one_liner: &str, pupils: &[&str]) -> Incident {
    let mut incident =
      Incident::new_on(NaiveDate::from_ymd_opt(2014, 5, id as u32).unwrap());
    incident.incident_id = Some(id);
    incident.one_liner = one_liner.into();
    incident.pupils = pupils
      .iter()
      .enumerate()
      .map(|(i, name)| IncidentPupil {
        association_id:      i as i64 + 1,
        pupil:               Pupil { pupil_id: i as i64 + 1, name: (*name).into() },
        statement_extension: None,
      })
      .collect();
    incident
  }

  fn sample() -> Vec<Incident> {
    let mut first = stored(1, "An incident occurred", &["Tim Golden", "Stephen Davis"]);
    first.is_racial = true;
    first.other_type = "Blancmange".into();

    let mut second = stored(2, "A second incident occurred", &["Chris Doran"]);
    second.is_bullying = true;
    second.status = IncidentStatus::Closed;
    second.description = "Name calling at break".into();

    vec![first, second]
  }

  #[test]
  fn identifier_cell_becomes_link() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.xlsx");

    let mut sheet = Sheet::new("Incidents", ["Incident", "Status", "Description", "Pupils"]);
    sheet.push_row([
      CellValue::text("INC-0001"),
      CellValue::text("Open"),
      CellValue::text("desc"),
      CellValue::text("Tim Golden"),
    ]);
    let mut sheets = vec![sheet];
    let linked = IdentifierLinks::new("http://localhost:5010")
      .unwrap()
      .apply(&mut sheets);
    write_workbook(&sheets, &path).unwrap();

    assert_eq!(linked, 1);
    assert_eq!(
      sheets[0].rows[0][0],
      CellValue::Hyperlink {
        url:  "http://localhost:5010/incidents/1".into(),
        text: "INC-0001".into(),
      }
    );

    let read = read_workbook(&path).unwrap();
    assert_eq!(read[0].rows[0][0], CellValue::text("INC-0001"));
    assert_eq!(read[0].rows[0][3], CellValue::text("Tim Golden"));
  }

  /// A member of the written archive, as text.
  fn archive_entry(path: &std::path::Path, name: &str) -> String {
    use std::io::Read as _;
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
  }

  #[test]
  fn workbook_layout_in_archive() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.xlsx");

    let mut sheet = Sheet::new("Incidents", ["Incident", "Status"]);
    sheet.push_row([CellValue::text("INC-0001"), CellValue::text("Open")]);
    let mut sheets = vec![sheet];
    IdentifierLinks::new("http://localhost:5010")
      .unwrap()
      .apply(&mut sheets);
    write_workbook(&sheets, &path).unwrap();

    let worksheet = archive_entry(&path, "xl/worksheets/sheet1.xml");
    assert!(worksheet.contains(r#"ySplit="1""#), "{worksheet}");
    assert!(worksheet.contains(r#"state="frozen""#), "{worksheet}");
    assert!(worksheet.contains(r#"<hyperlink ref="A2" r:id="rId1"/>"#), "{worksheet}");
    assert!(worksheet.contains(r#"paperSize="9""#), "{worksheet}");
    assert!(worksheet.contains(r#"orientation="landscape""#), "{worksheet}");

    let rels = archive_entry(&path, "xl/worksheets/_rels/sheet1.xml.rels");
    assert!(rels.contains(r#"Target="http://localhost:5010/incidents/1""#), "{rels}");
    assert!(rels.contains(r#"TargetMode="External""#), "{rels}");

    let styles = archive_entry(&path, "xl/styles.xml");
    assert!(styles.contains(r#"patternType="solid""#), "{styles}");
    assert!(styles.contains(r#"<fgColor rgb="FFFFFF80"/>"#), "{styles}");
    assert!(styles.contains("<b/>"), "{styles}");
  }

  #[test]
  fn duplicate_titles_fail_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dupes.xlsx");

    let sheets = [
      Sheet::new("Incidents logged during the spring term", ["a"]),
      Sheet::new("Incidents logged during the spring half", ["a"]),
    ];
    let err = write_workbook(&sheets, &path).unwrap_err();

    assert!(
      matches!(
        err,
        Error::Serialization { reason: CellError::DuplicateSheetName(_), .. }
      ),
      "{err}"
    );
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn incidents_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incidents.xlsx");
    let incidents = sample();

    let written = export_incidents(&incidents, &path, "http://localhost:5010").unwrap();
    assert_eq!(written, path);

    let read = read_workbook(&path).unwrap();
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].name.as_deref(), Some(SHEET_NAME));
    assert_eq!(read[0].headers, HEADERS);

    let expected = incident_sheet(&incidents).unwrap();
    let actual: Vec<Vec<CellValue>> = read[0]
      .rows
      .iter()
      .map(|row| row.iter().cloned().map(CellValue::without_link).collect())
      .collect();
    assert_eq!(actual, expected.rows);
  }

  #[test]
  fn incident_row_layout() {
    let sheet = incident_sheet(&sample()).unwrap();
    assert_eq!(
      sheet.rows[0],
      [
        CellValue::text("INC-0001"),
        CellValue::Date(NaiveDate::from_ymd_opt(2014, 5, 1).unwrap()),
        CellValue::text("Open"),
        CellValue::text("Racial, Blancmange"),
        CellValue::text("An incident occurred"),
        CellValue::Empty,
        CellValue::text("Tim Golden, Stephen Davis"),
        CellValue::Empty,
      ]
    );
  }

  #[test]
  fn unsaved_incident_cannot_be_exported() {
    assert!(matches!(
      incident_sheet(&[Incident::new()]),
      Err(Error::Core(incidents_core::Error::Unsaved))
    ));
  }

  #[test]
  fn unnamed_and_long_sheet_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.xlsx");

    let sheets = [
      Sheet::new("A sheet name well beyond the thirty-one limit", ["a"]),
      Sheet { headers: vec!["b".into()], ..Sheet::default() },
    ];
    write_workbook(&sheets, &path).unwrap();

    let names: Vec<String> = read_workbook(&path)
      .unwrap()
      .into_iter()
      .filter_map(|s| s.name)
      .collect();
    assert_eq!(names, ["A sheet name well beyond the th", "Sheet 1"]);
  }

  #[test]
  fn failed_export_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.xlsx");

    let mut sheet = Sheet::new("Bad", ["n"]);
    sheet.push_row([CellValue::Number(f64::INFINITY)]);
    let err = write_workbook(&[sheet], &path).unwrap_err();

    assert!(matches!(err, Error::Serialization { .. }));
    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
  }

  #[test]
  fn failed_export_keeps_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("incidents.xlsx");
    export_incidents(&sample(), &path, "http://localhost:5010").unwrap();
    let before = std::fs::read(&path).unwrap();

    let mut sheet = Sheet::new("Bad", ["n"]);
    sheet.push_row([CellValue::Number(f64::NAN)]);
    assert!(write_workbook(&[sheet], &path).is_err());

    assert_eq!(std::fs::read(&path).unwrap(), before);
  }
}
