// Resume Writer
// Turns resume + job description + gap report into tailored markdown:
// professional summary, skills updates, one weekend project.

pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analysis::sections::{check_sections, SectionCheck, TAILORED_CONTENT_SECTIONS};
use crate::llm_client::prompts::{
    heading_outline, render, HEADINGS_INSTRUCTION, NO_FABRICATION_INSTRUCTION,
};
use crate::llm_client::{GenerationRequest, LlmError, TextGenerator};
use crate::writer::prompts::{TAILORING_PROMPT_TEMPLATE, TAILORING_SYSTEM};

#[derive(Debug, Clone, Copy)]
pub struct TailoringRequest<'a> {
    pub resume_text: &'a str,
    pub job_description: &'a str,
    pub gap_report: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TailoredContent {
    pub markdown: String,
}

impl TailoredContent {
    pub fn check(&self) -> SectionCheck {
        check_sections(&self.markdown, TAILORED_CONTENT_SECTIONS)
    }
}

#[async_trait]
pub trait ResumeWriter: Send + Sync {
    async fn tailor(&self, request: TailoringRequest<'_>) -> Result<TailoredContent, LlmError>;
}

pub struct LlmResumeWriter {
    llm: Arc<dyn TextGenerator>,
    temperature: f32,
}

impl LlmResumeWriter {
    pub fn new(llm: Arc<dyn TextGenerator>, temperature: f32) -> Self {
        Self { llm, temperature }
    }
}

#[async_trait]
impl ResumeWriter for LlmResumeWriter {
    async fn tailor(&self, request: TailoringRequest<'_>) -> Result<TailoredContent, LlmError> {
        let prompt = build_tailoring_prompt(&request);
        let generation = self
            .llm
            .generate(
                &GenerationRequest::new(prompt, self.temperature).with_system(TAILORING_SYSTEM),
            )
            .await?;

        info!("Resume writer produced {} chars", generation.text.len());
        Ok(TailoredContent {
            markdown: generation.text.trim().to_string(),
        })
    }
}

fn build_tailoring_prompt(request: &TailoringRequest<'_>) -> String {
    let outline = heading_outline(
        "###",
        &TAILORED_CONTENT_SECTIONS
            .iter()
            .map(|s| (s.name, s.hint))
            .collect::<Vec<_>>(),
    );

    render(
        TAILORING_PROMPT_TEMPLATE,
        &[
            ("no_fabrication", NO_FABRICATION_INSTRUCTION),
            ("headings_instruction", HEADINGS_INSTRUCTION),
            ("output_format", outline.as_str()),
            ("job_description", request.job_description),
            ("gap_report", request.gap_report),
            ("resume", request.resume_text),
        ],
    )
}
