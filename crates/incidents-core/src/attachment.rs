//! Binary payloads attached to incidents and to incident-pupil associations.
//!
//! None of these types have behaviour beyond carrying bytes and a name; the
//! store decides where they live.

use std::path::Path;

use serde::Serialize;

/// A file as it arrives from a form upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
  pub filename: String,
  pub data:     Vec<u8>,
}

impl Upload {
  pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
    Self { filename: filename.into(), data: data.into() }
  }

  /// Lowercase extension of the uploaded filename, without the dot. Empty if
  /// the filename has none.
  pub fn extension(&self) -> String {
    Path::new(&self.filename)
      .extension()
      .map(|e| e.to_string_lossy().to_lowercase())
      .unwrap_or_default()
  }

  /// An upload with no payload is how browsers submit an untouched file
  /// input; it never counts as a replacement.
  pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// A file attached directly to an incident (the older, incident-level path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
  pub filename: String,
  pub data:     Vec<u8>,
}

impl From<Upload> for Attachment {
  fn from(u: Upload) -> Self {
    Self { filename: u.filename, data: u.data }
  }
}

/// Metadata for a stored incident-level attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentInfo {
  pub attachment_id: i64,
  pub incident_id:   i64,
  pub filename:      String,
}

/// A pupil statement ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementFile {
  pub filename: String,
  pub data:     Vec<u8>,
}

/// Download name for a statement: `<identifier> <pupil name>[.<extension>]`.
pub fn statement_filename(
  identifier: &str,
  pupil_name: &str,
  extension: &str,
) -> String {
  if extension.is_empty() {
    format!("{identifier} {pupil_name}")
  } else {
    format!("{identifier} {pupil_name}.{extension}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extension_is_lowercased() {
    assert_eq!(Upload::new("Scan.PDF", b"x".to_vec()).extension(), "pdf");
  }

  #[test]
  fn extension_missing() {
    assert_eq!(Upload::new("statement", b"x".to_vec()).extension(), "");
  }

  #[test]
  fn statement_filename_with_and_without_extension() {
    assert_eq!(
      statement_filename("INC-0001", "Tim Golden", "pdf"),
      "INC-0001 Tim Golden.pdf"
    );
    assert_eq!(
      statement_filename("INC-0001", "Tim Golden", ""),
      "INC-0001 Tim Golden"
    );
  }
}
