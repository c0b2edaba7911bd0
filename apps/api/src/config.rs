use std::path::PathBuf;

use anyhow::{bail, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_SERPER_BASE_URL: &str = "https://google.serper.dev";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Application configuration, built once at startup and handed to each client explicitly.
/// Fails fast if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub serper_api_key: String,
    pub serper_base_url: String,
    pub llm_model: String,
    pub research_temperature: f32,
    pub analyst_temperature: f32,
    pub writer_temperature: f32,
    pub agent_max_iterations: u32,
    pub search_result_count: u32,
    pub llm_timeout_secs: u64,
    pub llm_max_retries: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` is the only production caller.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            openai_api_key: require(&lookup, "OPENAI_API_KEY")?,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            serper_api_key: require(&lookup, "SERPER_API_KEY")?,
            serper_base_url: lookup("SERPER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_SERPER_BASE_URL.to_string()),
            llm_model: lookup("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            research_temperature: parse_or(&lookup, "RESEARCH_TEMPERATURE", 0.0)?,
            analyst_temperature: parse_or(&lookup, "ANALYST_TEMPERATURE", 0.7)?,
            writer_temperature: parse_or(&lookup, "WRITER_TEMPERATURE", 0.7)?,
            agent_max_iterations: parse_or(&lookup, "AGENT_MAX_ITERATIONS", 15)?,
            search_result_count: parse_or(&lookup, "SEARCH_RESULT_COUNT", 10)?,
            llm_timeout_secs: parse_or(&lookup, "LLM_TIMEOUT_SECS", 120)?,
            llm_max_retries: parse_or(&lookup, "LLM_MAX_RETRIES", 0)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(std::env::temp_dir),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("RESEARCH_TEMPERATURE", self.research_temperature),
            ("ANALYST_TEMPERATURE", self.analyst_temperature),
            ("WRITER_TEMPERATURE", self.writer_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                bail!("{key} must be between 0.0 and 2.0, got {value}");
            }
        }
        if self.agent_max_iterations == 0 {
            bail!("AGENT_MAX_ITERATIONS must be at least 1");
        }
        if self.search_result_count == 0 {
            bail!("SEARCH_RESULT_COUNT must be at least 1");
        }
        Ok(())
    }
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}
