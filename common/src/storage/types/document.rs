use std::{fmt, path::Path};

use axum_typed_multipart::FieldData;
use mime_guess::from_path;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::AppError;

/// Extensions accepted by the upload form.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "pptx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Pptx,
}

impl DocumentFormat {
    /// Resolves the format from the file name's extension, case-insensitively.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "pptx" => Some(Self::Pptx),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Pptx => f.write_str("pptx"),
        }
    }
}

/// A document received in one upload batch. The bytes are owned by the request.
#[derive(Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub format: DocumentFormat,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedDocument")
            .field("file_name", &self.file_name)
            .field("format", &self.format)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl UploadedDocument {
    /// Builds a document from raw bytes, rejecting names without an allowed extension.
    pub fn new(file_name: &str, bytes: Vec<u8>) -> Result<Self, AppError> {
        let sanitized = Self::sanitize_file_name(file_name);
        let format = DocumentFormat::from_file_name(&sanitized).ok_or_else(|| {
            AppError::Validation(format!(
                "{file_name} is not an allowed file type (allowed: {})",
                ALLOWED_EXTENSIONS.join(", ")
            ))
        })?;

        Ok(Self {
            mime_type: Self::guess_mime_type(Path::new(&sanitized)),
            file_name: sanitized,
            format,
            bytes,
        })
    }

    /// Reads an uploaded multipart field. Returns `Ok(None)` for the empty part a browser sends
    /// when nothing was selected.
    pub async fn from_field_data(
        field_data: FieldData<NamedTempFile>,
    ) -> Result<Option<Self>, AppError> {
        let Some(file_name) = field_data
            .metadata
            .file_name
            .filter(|name| !name.trim().is_empty())
        else {
            return Ok(None);
        };

        let bytes = tokio::fs::read(field_data.contents.path()).await?;
        debug!(%file_name, bytes = bytes.len(), "Read uploaded document");

        Self::new(&file_name, bytes).map(Some)
    }

    /// Guesses the MIME type based on the file extension.
    fn guess_mime_type(path: &Path) -> String {
        from_path(path)
            .first_or(mime::APPLICATION_OCTET_STREAM)
            .to_string()
    }

    /// Keeps ASCII alphanumerics and underscores in the stem, replaces everything else with
    /// `_`, and keeps the extension. Directory components are dropped first.
    fn sanitize_file_name(file_name: &str) -> String {
        let base = file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_name);
        let clean = |part: &str| -> String {
            part.chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        c
                    } else {
                        '_'
                    }
                })
                .collect()
        };

        match base.rsplit_once('.') {
            Some((stem, extension)) => format!("{}.{}", clean(stem), clean(extension)),
            None => clean(base),
        }
    }
}
