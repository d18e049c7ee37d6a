//! Mapping incidents onto a sheet.

use std::path::{Path, PathBuf};

use incidents_core::incident::Incident;

use crate::{
  Result,
  cell::CellValue,
  links::IdentifierLinks,
  sheet::Sheet,
  write::write_workbook,
};

pub const SHEET_NAME: &str = "Incidents";

pub const HEADERS: [&str; 8] = [
  "Incident",
  "Logged on",
  "Status",
  "Type",
  "Summary",
  "Description",
  "Pupils",
  "Action taken",
];

/// One row per incident, in the order given. Incidents must have been
/// stored.
pub fn incident_sheet(incidents: &[Incident]) -> Result<Sheet> {
  let mut sheet = Sheet::new(SHEET_NAME, HEADERS);
  for incident in incidents {
    sheet.push_row([
      CellValue::text(incident.identifier()?),
      CellValue::Date(incident.logged_on),
      CellValue::text(incident.status.as_str()),
      CellValue::text(incident.types().collect::<Vec<_>>().join(", ")),
      CellValue::text(incident.one_liner.as_str()),
      CellValue::text(incident.description.as_str()),
      CellValue::text(incident.pupil_names().collect::<Vec<_>>().join(", ")),
      CellValue::text(incident.action_taken.as_str()),
    ]);
  }
  Ok(sheet)
}

/// Write `incidents` to a workbook at `path`, linking identifiers to their
/// detail pages under `base_url`. Returns the path written.
pub fn export_incidents(
  incidents: &[Incident],
  path: impl AsRef<Path>,
  base_url: &str,
) -> Result<PathBuf> {
  let path = path.as_ref();
  let mut sheets = vec![incident_sheet(incidents)?];
  let linked = IdentifierLinks::new(base_url)?.apply(&mut sheets);
  write_workbook(&sheets, path)?;

  tracing::info!(
    path = %path.display(),
    incidents = incidents.len(),
    linked,
    "incidents exported"
  );
  Ok(path.to_path_buf())
}
