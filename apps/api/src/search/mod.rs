//! Web search — the external search capability used by the research agent.
//!
//! Pluggable via `SearchProvider`. The production backend is Serper (Google results).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::Config;

/// Returned when a search succeeds but yields nothing usable.
pub const NO_RESULTS: &str = "No good search result found";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Query string in, ranked text snippets out (flattened into one observation).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &str;

    async fn search(&self, query: &str) -> Result<String, SearchError>;
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
}

/// Serper.dev Google search provider (requires API key)
#[derive(Clone)]
pub struct SerperClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    result_count: u32,
}

impl SerperClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.serper_api_key.clone(),
            endpoint: format!("{}/search", config.serper_base_url.trim_end_matches('/')),
            result_count: config.search_result_count,
        }
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    fn name(&self) -> &str {
        "Serper"
    }

    async fn search(&self, query: &str) -> Result<String, SearchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: self.result_count,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let data: Value = response.json().await?;
        Ok(flatten_results(&data, self.result_count as usize))
    }
}

/// Flattens a Serper response into ranked snippets.
///
/// An answer box wins outright. Otherwise the knowledge graph (if any) leads,
/// followed by organic snippets in rank order.
fn flatten_results(data: &Value, limit: usize) -> String {
    if let Some(answer_box) = data.get("answerBox") {
        for key in ["answer", "snippet"] {
            if let Some(text) = str_field(answer_box, key) {
                return text.to_string();
            }
        }
        if let Some(highlighted) = answer_box.get("snippetHighlighted").and_then(|v| v.as_array()) {
            let joined = highlighted
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            if !joined.trim().is_empty() {
                return joined;
            }
        }
    }

    let mut snippets: Vec<String> = Vec::new();

    if let Some(kg) = data.get("knowledgeGraph") {
        let title = str_field(kg, "title");
        if let (Some(title), Some(kind)) = (title, str_field(kg, "type")) {
            snippets.push(format!("{title}: {kind}."));
        }
        if let Some(description) = str_field(kg, "description") {
            snippets.push(description.to_string());
        }
        if let Some(attributes) = kg.get("attributes").and_then(|v| v.as_object()) {
            for (attribute, value) in attributes {
                if let Some(value) = value.as_str() {
                    snippets.push(format!("{} {attribute}: {value}.", title.unwrap_or("")));
                }
            }
        }
    }

    if let Some(organic) = data.get("organic").and_then(|v| v.as_array()) {
        for result in organic.iter().take(limit) {
            if let Some(snippet) = str_field(result, "snippet") {
                snippets.push(snippet.to_string());
            }
        }
    }

    if snippets.is_empty() {
        return NO_RESULTS.to_string();
    }

    snippets.join(" ")
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
