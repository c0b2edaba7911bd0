// Gap Analyst
// Compares resume, job description and company research; produces a four-section
// markdown report (match score, missing keywords, cultural fit, improvements).

pub mod prompts;
pub mod sections;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analysis::prompts::{GAP_ANALYSIS_PROMPT_TEMPLATE, GAP_ANALYSIS_SYSTEM};
use crate::analysis::sections::{
    check_sections, gap_overview, GapOverview, SectionCheck, GAP_REPORT_SECTIONS,
};
use crate::llm_client::prompts::{heading_outline, render, HEADINGS_INSTRUCTION};
use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};

#[derive(Debug, Clone, Copy)]
pub struct GapAnalysisRequest<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub company_research: &'a str,
}

/// The gap report exactly as the model wrote it.
#[derive(Debug, Clone, PartialEq)]
pub struct GapReport {
    pub markdown: String,
}

impl GapReport {
    pub fn check(&self) -> SectionCheck {
        check_sections(&self.markdown, GAP_REPORT_SECTIONS)
    }

    pub fn overview(&self) -> GapOverview {
        gap_overview(&self.markdown)
    }
}

#[async_trait]
pub trait GapAnalyst: Send + Sync {
    async fn analyze(&self, request: GapAnalysisRequest<'_>) -> Result<GapReport, LlmError>;
}

/// Single-call analyst backed by the text-generation capability.
pub struct LlmGapAnalyst {
    llm: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl LlmGapAnalyst {
    pub fn new(llm: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        Self { llm, temperature }
    }
}

#[async_trait]
impl GapAnalyst for LlmGapAnalyst {
    async fn analyze(&self, request: GapAnalysisRequest<'_>) -> Result<GapReport, LlmError> {
        let prompt = build_gap_prompt(&request);
        let generation = self
            .llm
            .generate(
                &GenerationRequest::new(prompt, self.temperature).with_system(GAP_ANALYSIS_SYSTEM),
            )
            .await?;

        info!("Gap analysis produced {} chars", generation.text.len());
        Ok(GapReport {
            markdown: generation.text.trim().to_string(),
        })
    }
}

fn build_gap_prompt(request: &GapAnalysisRequest<'_>) -> String {
    let outline = heading_outline(
        "##",
        &GAP_REPORT_SECTIONS
            .iter()
            .map(|s| (s.name, s.hint))
            .collect::<Vec<_>>(),
    );

    render(
        GAP_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("headings_instruction", HEADINGS_INSTRUCTION),
            ("output_format", outline.as_str()),
            ("job_description", request.job_description),
            ("company_research", request.company_research),
            ("resume", request.resume_text),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::llm_client::Generation;

    struct EchoLlm {
        reply: String,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    #[async_trait]
    impl TextGenerator for EchoLlm {
        async fn generate(&self, request: &GenerationRequest) -> Result<Generation, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(Generation {
                text: self.reply.clone(),
                usage: None,
            })
        }
    }

    fn request() -> GapAnalysisRequest<'static> {
        GapAnalysisRequest {
            resume_text: "5 years Python, SQL",
            job_description: "Requires AWS Redshift, Python, dbt",
            company_research: "- Acme builds analytics software",
        }
    }

    #[test]
    fn test_prompt_carries_all_inputs_and_headings_in_order() {
        let prompt = build_gap_prompt(&request());
        assert!(prompt.contains("5 years Python, SQL"));
        assert!(prompt.contains("Requires AWS Redshift, Python, dbt"));
        assert!(prompt.contains("Acme builds analytics software"));

        let positions: Vec<usize> = GAP_REPORT_SECTIONS
            .iter()
            .map(|s| prompt.find(&format!("## {}", s.name)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!prompt.contains("{output_format}"));
    }

    #[test]
    fn test_placeholder_text_in_inputs_is_not_expanded() {
        let prompt = build_gap_prompt(&GapAnalysisRequest {
            resume_text: "RESUME-BODY",
            job_description: "Send your {resume} to jobs@acme.com",
            company_research: "- Acme templates use {output_format} literally",
        });
        assert!(prompt.contains("Send your {resume} to jobs@acme.com"));
        assert!(prompt.contains("- Acme templates use {output_format} literally"));
        assert_eq!(prompt.matches("RESUME-BODY").count(), 1);
    }

    #[tokio::test]
    async fn test_analyze_uses_configured_temperature_and_system() {
        let llm = Arc::new(EchoLlm {
            reply: "  ## Match Score\n60/100\n".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let analyst = LlmGapAnalyst::new(llm.clone(), 0.7);

        let report = analyst.analyze(request()).await.unwrap();

        assert_eq!(report.markdown, "## Match Score\n60/100");
        assert_eq!(report.overview().match_score, Some(60));
        assert_eq!(report.check().missing.len(), 3);

        let seen = llm.seen.lock().unwrap();
        assert!((seen[0].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(seen[0].system.as_deref(), Some(GAP_ANALYSIS_SYSTEM));
        assert!(seen[0].stop.is_empty());
    }
}
