use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::analysis::sections::GapOverview;
use crate::extraction::UploadedDocument;
use crate::pipeline::error::PipelineError;
use crate::pipeline::state::PipelineState;

/// Everything a run needs from the user.
#[derive(Debug, Clone, Default)]
pub struct PipelineRequest {
    pub document: UploadedDocument,
    pub job_description: String,
    pub company_name: String,
}

impl PipelineRequest {
    /// Guard for leaving `Idle`: all three inputs must be present and non-blank.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut missing = Vec::new();
        if self.document.is_empty() {
            missing.push("resume");
        }
        if self.job_description.trim().is_empty() {
            missing.push("job description");
        }
        if self.company_name.trim().is_empty() {
            missing.push("company name");
        }

        if missing.is_empty() {
            return Ok(());
        }
        Err(PipelineError::Validation(format!(
            "Please provide a resume, job description, and company name (missing: {})",
            missing.join(", ")
        )))
    }
}

/// Result of a successful run. Intermediate outputs are surfaced alongside the final content.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: Uuid,
    pub company_name: String,
    pub research_summary: String,
    pub search_queries: Vec<String>,
    pub gap_report: String,
    pub gap_overview: GapOverview,
    pub tailored_content: String,
    /// Structural problems found in model output. Never fatal.
    pub warnings: Vec<String>,
    pub transitions: Vec<PipelineState>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}
