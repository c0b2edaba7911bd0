//! Parses one ReAct step out of raw model output.
//!
//! Malformed output is not fatal: the caller turns a `ParseError` into an
//! observation so the model can correct itself on the next iteration.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";

/// What the model decided to do in one step.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Invoke `tool` with `input`. `log` is the raw model text, replayed in the scratchpad.
    Action {
        tool: String,
        input: String,
        log: String,
    },
    Finish {
        answer: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Invalid Format: Missing 'Action:' after 'Thought:'")]
    MissingAction,

    #[error("Invalid Format: Missing 'Action Input:' after 'Action:'")]
    MissingActionInput,

    #[error("Parsing LLM output produced both a final answer and a parse-able action")]
    ActionAndFinalAnswer,

    #[error("Invalid Format: 'Final Answer:' must be followed by the answer itself")]
    EmptyFinalAnswer,
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("action regex is valid")
    })
}

fn bare_action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("bare regex is valid"))
}

/// Parses a single model completion into an `AgentStep`.
pub fn parse_step(text: &str) -> Result<AgentStep, ParseError> {
    let includes_answer = text.contains(FINAL_ANSWER_MARKER);

    if let Some(caps) = action_regex().captures(text) {
        if includes_answer {
            return Err(ParseError::ActionAndFinalAnswer);
        }
        let tool = caps[1].trim().to_string();
        let input = clean_input(&caps[2]);
        return Ok(AgentStep::Action {
            tool,
            input,
            log: text.to_string(),
        });
    }

    if includes_answer {
        let answer = text
            .split(FINAL_ANSWER_MARKER)
            .last()
            .unwrap_or_default()
            .trim()
            .to_string();
        if answer.is_empty() {
            return Err(ParseError::EmptyFinalAnswer);
        }
        return Ok(AgentStep::Finish { answer });
    }

    if bare_action_regex().is_match(text) {
        Err(ParseError::MissingActionInput)
    } else {
        Err(ParseError::MissingAction)
    }
}

/// Strips whitespace and a single layer of surrounding quotes from an action input.
fn clean_input(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unquoted.trim().to_string()
}
