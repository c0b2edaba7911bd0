// Research Agent
// Given a company name, gathers web context with a bounded ReAct loop and
// returns a short bullet summary (product, recent news, mission/culture).

pub mod agent;
pub mod parser;
pub mod prompts;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;

pub use agent::ReactResearchAgent;

#[derive(Debug, Clone)]
pub struct ResearchRequest {
    pub company_name: String,
}

/// Output of the research stage.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyResearch {
    pub summary: String,
    /// Search queries issued while researching, in order.
    pub queries: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent stopped after {iterations} iterations without a final answer")]
    IterationLimit { iterations: u32 },

    #[error("reasoning model call failed: {0}")]
    Llm(#[from] LlmError),
}

#[async_trait]
pub trait CompanyResearcher: Send + Sync {
    async fn research(&self, request: ResearchRequest) -> Result<CompanyResearch, AgentError>;
}
