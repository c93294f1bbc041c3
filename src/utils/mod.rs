use chrono::{DateTime, Local, Utc};
use mime_guess::{mime, Mime};
use serde::{Deserialize, Deserializer};
use std::path::Path;

/// Accepts both string and numeric identifiers and normalizes them to a string.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(value) => value,
        RawId::Int(value) => value.to_string(),
        RawId::Uint(value) => value.to_string(),
    })
}

pub fn format_local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

pub fn upload_mime_type(path: &Path) -> Mime {
    mime_guess::from_path(path).first_or_octet_stream()
}

/// The uploader accepts PDFs and images.
pub fn is_supported_upload(path: &Path) -> bool {
    let guessed = upload_mime_type(path);
    guessed.type_() == mime::IMAGE || guessed.essence_str() == mime::APPLICATION_PDF.essence_str()
}
