pub mod export;
pub mod files;
pub mod incidents;
pub mod lookups;

use std::path::Path;

use axum::{
  http::header,
  response::{IntoResponse, Response},
};

pub(crate) const CONTENT_TYPE_XLSX: &str =
  "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Media type for a download, guessed from its extension.
pub(crate) fn content_type(filename: &str) -> &'static str {
  let extension = Path::new(filename)
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
    .unwrap_or_default();
  match extension.as_str() {
    "pdf" => "application/pdf",
    "jpg" | "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "txt" => "text/plain; charset=utf-8",
    "doc" => "application/msword",
    "docx" => {
      "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    }
    "xlsx" => CONTENT_TYPE_XLSX,
    _ => "application/octet-stream",
  }
}

/// `Content-Disposition` for an attachment: an ASCII `filename` for old
/// clients and the exact name as RFC 5987 `filename*`.
pub(crate) fn content_disposition(filename: &str) -> String {
  let fallback: String = filename
    .chars()
    .map(|c| match c {
      '"' => '\'',
      '\\' => '_',
      c if c.is_ascii() && !c.is_ascii_control() => c,
      _ => '_',
    })
    .collect();
  format!(
    "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
    urlencoding::encode(filename)
  )
}

/// A file download named `filename`.
pub(crate) fn download(filename: &str, data: Vec<u8>) -> Response {
  let disposition = content_disposition(filename);
  (
    [
      (header::CONTENT_TYPE, content_type(filename).to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    data,
  )
    .into_response()
}
