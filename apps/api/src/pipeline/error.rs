use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::pipeline::state::PipelineState;
use crate::research::AgentError;

/// Every way a pipeline run can end without a report.
/// Stage errors are mapped into this type only by the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Required input missing; no stage was attempted.
    #[error("{0}")]
    Validation(String),

    /// Server-side failure writing the upload to disk; not the user's fault.
    #[error("could not stage the upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error("document extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("company research failed: {0}")]
    Agent(#[from] AgentError),

    #[error("text generation failed while {stage}: {source}")]
    Generation {
        stage: PipelineState,
        #[source]
        source: LlmError,
    },
}

impl PipelineError {
    pub fn generation(stage: PipelineState) -> impl FnOnce(LlmError) -> Self {
        move |source| PipelineError::Generation { stage, source }
    }

    /// Stable machine-readable code for logs and API responses.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "VALIDATION_ERROR",
            PipelineError::Staging(_) => "INTERNAL_ERROR",
            PipelineError::Extraction(_) => "EXTRACTION_FAILED",
            PipelineError::Agent(_) => "RESEARCH_FAILED",
            PipelineError::Generation { .. } => "GENERATION_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_names_stage() {
        let err = PipelineError::generation(PipelineState::Writing)(LlmError::EmptyContent);
        assert_eq!(
            err.to_string(),
            "text generation failed while writing: LLM returned empty content"
        );
        assert_eq!(err.code(), "GENERATION_FAILED");
    }

    #[test]
    fn test_staging_failure_is_internal() {
        let err = PipelineError::Staging(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.code(), "INTERNAL_ERROR");
        assert!(err.to_string().starts_with("could not stage the upload"));
    }

    #[test]
    fn test_agent_error_converts() {
        let err: PipelineError = AgentError::IterationLimit { iterations: 15 }.into();
        assert!(matches!(err, PipelineError::Agent(_)));
        assert_eq!(err.code(), "RESEARCH_FAILED");
    }
}
