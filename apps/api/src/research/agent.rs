//! ReAct research agent — an explicit think/act/observe loop with a hard iteration cap.
//!
//! Flow per iteration: render prompt + scratchpad → model (stops before "Observation")
//! → parse → run tool or finish. Parse failures become observations so the model
//! can correct its format; they still consume an iteration.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::prompts::render;
use crate::llm_client::{GenerationRequest, TextGenerator};
use crate::research::parser::{parse_step, AgentStep};
use crate::research::prompts::{
    OBSERVATION_STOP, REACT_PROMPT_TEMPLATE, RESEARCH_QUESTION_TEMPLATE, SEARCH_TOOL_DESCRIPTION,
    SEARCH_TOOL_NAME,
};
use crate::research::{AgentError, CompanyResearch, CompanyResearcher, ResearchRequest};
use crate::search::SearchProvider;

/// One completed think/act/observe round, replayed into the next prompt.
#[derive(Debug, Clone)]
struct ScratchpadEntry {
    log: String,
    observation: String,
}

pub struct ReactResearchAgent {
    llm: Arc<dyn TextGenerator>,
    search: Arc<dyn SearchProvider>,
    temperature: f32,
    max_iterations: u32,
}

impl ReactResearchAgent {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        search: Arc<dyn SearchProvider>,
        temperature: f32,
        max_iterations: u32,
    ) -> Self {
        Self {
            llm,
            search,
            temperature,
            max_iterations: max_iterations.max(1),
        }
    }

    async fn run_tool(&self, tool: &str, input: &str) -> String {
        if tool != SEARCH_TOOL_NAME {
            return format!("{tool} is not a valid tool, try one of [{SEARCH_TOOL_NAME}].");
        }

        info!("Research agent searching via {}: {:?}", self.search.name(), input);
        match self.search.search(input).await {
            Ok(snippets) => snippets,
            Err(e) => {
                warn!("Search failed for {:?}: {e}", input);
                format!("Search failed: {e}. Try a different query or answer with what you know.")
            }
        }
    }
}

#[async_trait]
impl CompanyResearcher for ReactResearchAgent {
    async fn research(&self, request: ResearchRequest) -> Result<CompanyResearch, AgentError> {
        let question = render(
            RESEARCH_QUESTION_TEMPLATE,
            &[("company_name", request.company_name.as_str())],
        );
        let mut scratchpad: Vec<ScratchpadEntry> = Vec::new();
        let mut queries: Vec<String> = Vec::new();

        for iteration in 1..=self.max_iterations {
            let prompt = build_react_prompt(&question, &scratchpad);
            let generation_request =
                GenerationRequest::new(prompt, self.temperature).with_stop(&[OBSERVATION_STOP]);
            let generation = self.llm.generate(&generation_request).await?;

            match parse_step(&generation.text) {
                Ok(AgentStep::Finish { answer }) => {
                    info!(
                        "Research on {:?} finished after {} iteration(s), {} search(es)",
                        request.company_name,
                        iteration,
                        queries.len()
                    );
                    return Ok(CompanyResearch {
                        summary: answer,
                        queries,
                    });
                }
                Ok(AgentStep::Action { tool, input, log }) => {
                    if tool == SEARCH_TOOL_NAME {
                        queries.push(input.clone());
                    }
                    let observation = self.run_tool(&tool, &input).await;
                    scratchpad.push(ScratchpadEntry { log, observation });
                }
                Err(e) => {
                    warn!(
                        "Research iteration {}/{}: unparseable output ({}), feeding error back",
                        iteration,
                        self.max_iterations,
                        e
                    );
                    scratchpad.push(ScratchpadEntry {
                        log: generation.text,
                        observation: e.to_string(),
                    });
                }
            }
        }

        Err(AgentError::IterationLimit {
            iterations: self.max_iterations,
        })
    }
}

/// Fills the ReAct template with the tool list, the question and the scratchpad so far.
fn build_react_prompt(question: &str, scratchpad: &[ScratchpadEntry]) -> String {
    let tools = format!("{SEARCH_TOOL_NAME}: {SEARCH_TOOL_DESCRIPTION}");
    let agent_scratchpad: String = scratchpad
        .iter()
        .map(|entry| format!("{}\nObservation: {}\nThought: ", entry.log, entry.observation))
        .collect();

    render(
        REACT_PROMPT_TEMPLATE,
        &[
            ("tools", tools.as_str()),
            ("tool_names", SEARCH_TOOL_NAME),
            ("input", question),
            ("agent_scratchpad", agent_scratchpad.as_str()),
        ],
    )
}
