//! PDF input for the extraction workflow.
//!
//! Only PDF documents are accepted. Documents travel to the generative
//! service as standard-alphabet base64.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Only PDF documents are supported (got {0})")]
    UnsupportedType(String),

    #[error("Document is empty")]
    Empty,

    #[error("Document data is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

/// A document ready to be sent inline to the generative service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedDocument {
    pub mime_type: String,
    /// Base64 payload.
    pub data: String,
}

impl EncodedDocument {
    /// Encode raw bytes, checking they look like a PDF.
    pub fn from_pdf_bytes(bytes: &[u8]) -> Result<Self, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(DocumentError::UnsupportedType(
                "content without a PDF header".to_string(),
            ));
        }
        Ok(Self {
            mime_type: PDF_MIME.to_string(),
            data: STANDARD.encode(bytes),
        })
    }

    /// Read and encode a local file. The extension must be `.pdf`.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(DocumentError::UnsupportedType(path.display().to_string()));
        }
        let bytes = std::fs::read(path)?;
        Self::from_pdf_bytes(&bytes)
    }

    /// Validate a client-side encoded upload.
    pub fn validate(self) -> Result<Self, DocumentError> {
        if !self.mime_type.eq_ignore_ascii_case(PDF_MIME) {
            return Err(DocumentError::UnsupportedType(self.mime_type));
        }
        if self.data.trim().is_empty() {
            return Err(DocumentError::Empty);
        }
        STANDARD.decode(self.data.trim())?;
        Ok(Self {
            mime_type: PDF_MIME.to_string(),
            data: self.data.trim().to_string(),
        })
    }
}
