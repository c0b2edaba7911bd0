//! Document Extractor — turns an uploaded resume into plain text.
//!
//! PDF parsing is CPU-bound and may panic on hostile input, so it runs inside
//! `tokio::task::spawn_blocking` and a panic is reported as a failure, never propagated.

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub mod upload;

pub use upload::{StagedUpload, UploadedDocument};

const PDF_MAGIC: &[u8] = b"%PDF-";
const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown"];

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported document format: {0}")]
    Unsupported(String),

    #[error("document could not be parsed: {0}")]
    Corrupt(String),

    #[error("document contains no extractable text")]
    NoText,

    #[error("extractor crashed while parsing the document")]
    Panicked,
}

/// Plain text extracted from a resume. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeText(String);

impl ResumeText {
    /// Trims the raw text; whitespace-only input is `NoText`.
    pub fn new(raw: &str) -> Result<Self, ExtractionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Pluggable extractor. The orchestrator only ever sees this trait.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> Result<ResumeText, ExtractionError>;
}

/// Document kinds the file extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Sniffs the kind from content first, then from the file extension.
    pub fn detect(path: &Path, head: &[u8]) -> Option<Self> {
        if head.starts_with(PDF_MAGIC) {
            return Some(DocumentKind::Pdf);
        }
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())?;
        if TEXT_EXTENSIONS.contains(&extension.as_str()) {
            Some(DocumentKind::PlainText)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::PlainText => "txt",
        }
    }
}

/// Filesystem-backed extractor: PDF via `pdf-extract`, UTF-8 text as-is.
#[derive(Debug, Clone, Default)]
pub struct FileExtractor;

#[async_trait]
impl DocumentExtractor for FileExtractor {
    async fn extract(&self, path: &Path) -> Result<ResumeText, ExtractionError> {
        let bytes = tokio::fs::read(path).await?;

        let kind = DocumentKind::detect(path, &bytes)
            .ok_or_else(|| ExtractionError::Unsupported(path.display().to_string()))?;

        let raw = match kind {
            DocumentKind::Pdf => extract_pdf(bytes).await?,
            DocumentKind::PlainText => String::from_utf8(bytes)
                .map_err(|_| ExtractionError::Corrupt("text is not valid UTF-8".to_string()))?,
        };

        ResumeText::new(&raw)
    }
}

async fn extract_pdf(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                ExtractionError::Panicked
            } else {
                ExtractionError::Corrupt(e.to_string())
            }
        })?;

    joined.map_err(|e| ExtractionError::Corrupt(e.to_string()))
}
