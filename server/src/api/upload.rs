use std::path::PathBuf;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    Json,
};
use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Largest accepted file, 10 MiB.
pub const MAX_FILE_SIZE: usize = 10 << 20;

pub const ALLOWED_EXTENSIONS: [&str; 5] = [".jpg", ".jpeg", ".png", ".pdf", ".txt"];

const FIELD_NAME: &str = "myFile";

#[derive(Clone, Debug)]
pub struct UploadState {
    pub dir: PathBuf,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub filename: String,
    pub message: String,
}

/// Leaves room for the multipart framing around a maximum sized file, so an
/// oversized file is reported as such instead of as a broken form.
pub fn body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_FILE_SIZE + (1 << 20))
}

/// Splits a client supplied file name into its stripped stem and its
/// extension, the extension keeping its leading dot. Directory parts are
/// dropped.
fn split_file_name(file_name: &str) -> (String, &str) {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let (stem, extension) = match base.rfind('.') {
        Some(dot) => base.split_at(dot),
        None => (base, ""),
    };

    let stem = stem.chars().filter(char::is_ascii_alphanumeric).collect();

    (stem, extension)
}

fn is_allowed(extension: &str) -> bool {
    ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
}

/// The name a file is stored under: alphanumeric characters of the stem plus
/// the original extension, or a fresh ObjectId when nothing of the stem is
/// left.
pub fn sanitize_file_name(file_name: &str) -> String {
    let (stem, extension) = split_file_name(file_name);

    if stem.is_empty() {
        format!("{}{extension}", ObjectId::new().to_hex())
    } else {
        format!("{stem}{extension}")
    }
}

#[tracing::instrument(skip_all)]
pub async fn upload_file(
    State(state): State<UploadState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, Error> {
    let mut multipart = multipart.map_err(|rejection| Error::InvalidBody(rejection.body_text()))?;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let (_, extension) = split_file_name(&original);
        if !is_allowed(extension) {
            tracing::debug!("rejected upload of {:?}", original);
            return Err(Error::FileTypeNotAllowed);
        }

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if content.len() + chunk.len() > MAX_FILE_SIZE {
                return Err(Error::FileTooLarge);
            }
            content.extend_from_slice(&chunk);
        }

        let filename = sanitize_file_name(&original);

        tokio::fs::create_dir_all(&state.dir).await?;
        tokio::fs::write(state.dir.join(&filename), &content).await?;

        tracing::info!("stored upload {:?} as {} ({} bytes)", original, filename, content.len());

        return Ok(Json(UploadResponse {
            message: format!("Successfully Uploaded File: {filename}"),
            filename,
        }));
    }

    Err(Error::MissingFile)
}
