//! Per-run staging of the uploaded document on disk.
//!
//! Every run gets its own uniquely named file, so concurrent runs never share a path.
//! The file lives exactly as long as the `StagedUpload` handle.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;
use uuid::Uuid;

use crate::extraction::DocumentKind;

/// An uploaded document held in memory until the pipeline stages it.
#[derive(Debug, Clone, Default)]
pub struct UploadedDocument {
    pub file_name: String,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Extension used for the staged copy: PDF content wins, then the original name.
    fn staged_extension(&self) -> String {
        if DocumentKind::detect(Path::new(&self.file_name), &self.bytes) == Some(DocumentKind::Pdf)
        {
            return DocumentKind::Pdf.extension().to_string();
        }
        Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_else(|| "bin".to_string())
    }
}

/// A document written to a unique temporary path. Dropping it removes the file.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Writes the document on the blocking pool so the async caller never does file I/O.
    pub async fn stage_blocking(
        dir: PathBuf,
        run_id: Uuid,
        document: UploadedDocument,
    ) -> io::Result<Self> {
        tokio::task::spawn_blocking(move || Self::stage(&dir, run_id, &document))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }

    pub fn stage(dir: &Path, run_id: Uuid, document: &UploadedDocument) -> io::Result<Self> {
        let suffix = format!(".{}", document.staged_extension());
        let prefix = format!("resume-{run_id}-");

        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(dir)?;
        file.write_all(&document.bytes)?;
        file.flush()?;

        debug!("Staged upload for run {} at {}", run_id, file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
