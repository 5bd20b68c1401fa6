use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::domain::UploadedFile;
use crate::error::AppError;

/// Media types the model accepts as inline document data. Matching is on the declared type only.
pub const ACCEPTED_MEDIA_TYPES: [&str; 5] = [
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/webp",
    "image/heic",
];

pub fn is_accepted_media_type(mime_type: &str) -> bool {
    ACCEPTED_MEDIA_TYPES.contains(&mime_type)
}

/// Declared media type for a local path, by extension.
pub fn media_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

fn check_media_type(name: &str, mime_type: &str) -> Result<(), AppError> {
    if !is_accepted_media_type(mime_type) {
        return Err(AppError::ingestion("Unsupported file type")
            .with_details(format!("name={name}; mime_type={mime_type}")));
    }
    Ok(())
}

/// Hex SHA-256 of raw file content. Identifies a file in logs without its content.
pub fn content_sha256(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Encode raw file bytes into an upload payload.
pub fn ingest_bytes(name: &str, mime_type: &str, bytes: &[u8]) -> Result<UploadedFile, AppError> {
    check_media_type(name, mime_type)?;
    if bytes.is_empty() {
        return Err(AppError::ingestion("File is empty").with_details(format!("name={name}")));
    }

    let file = UploadedFile {
        data: STANDARD.encode(bytes),
        mime_type: mime_type.to_string(),
        name: name.to_string(),
    };
    tracing::debug!(
        name,
        mime_type,
        bytes = bytes.len(),
        sha256 = %content_sha256(bytes),
        "file ingested"
    );
    Ok(file)
}

/// Build an upload payload from a `data:<type>;base64,<payload>` URL (or a bare base64 payload).
///
/// Only the encoded bytes after the first comma are kept. The declared media type passed in wins
/// over whatever the prefix says.
pub fn ingest_data_url(name: &str, mime_type: &str, data_url: &str) -> Result<UploadedFile, AppError> {
    check_media_type(name, mime_type)?;

    let data = strip_data_url_prefix(data_url).trim();
    if data.is_empty() {
        return Err(AppError::ingestion("File is empty").with_details(format!("name={name}")));
    }
    STANDARD.decode(data).map_err(|e| {
        AppError::ingestion("File payload is not valid base64")
            .with_details(format!("name={name}; err={e}"))
    })?;

    Ok(UploadedFile {
        data: data.to_string(),
        mime_type: mime_type.to_string(),
        name: name.to_string(),
    })
}

pub fn strip_data_url_prefix(data_url: &str) -> &str {
    if !data_url.starts_with("data:") {
        return data_url;
    }
    match data_url.split_once(',') {
        Some((_, payload)) => payload,
        None => "",
    }
}

/// Read a local file and encode it. `mime_override` replaces the extension-derived type.
pub fn ingest_path(path: &Path, mime_override: Option<&str>) -> Result<UploadedFile, AppError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let mime_type = match mime_override {
        Some(m) => m.to_string(),
        None => media_type_for_path(path)
            .ok_or_else(|| {
                AppError::ingestion("Unsupported file type")
                    .with_details(format!("path={}", path.display()))
            })?
            .to_string(),
    };

    let bytes = fs::read(path).map_err(|e| {
        AppError::ingestion("Failed to read file")
            .with_details(format!("path={}; err={e}", path.display()))
    })?;

    ingest_bytes(&name, &mime_type, &bytes)
}

impl UploadedFile {
    pub fn decoded_bytes(&self) -> Result<Vec<u8>, AppError> {
        STANDARD.decode(self.data.as_bytes()).map_err(|e| {
            AppError::ingestion("File payload is not valid base64")
                .with_details(format!("name={}; err={e}", self.name))
        })
    }
}
