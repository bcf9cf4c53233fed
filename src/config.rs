//! Start-up configuration.
//!
//! Everything the agent needs is collected once into [`Settings`] and passed
//! around by reference; nothing writes to the process environment. The three
//! API keys come from the environment (or `.env`), and any that are missing
//! are asked for interactively through a [`SecretPrompt`].

use crate::error::{AgentError, Result};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

pub const LANGSMITH_API_KEY: &str = "LANGSMITH_API_KEY";
pub const FINANCIAL_DATASETS_API_KEY: &str = "FINANCIAL_DATASETS_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_LANGSMITH_ENDPOINT: &str = "https://api.smith.langchain.com";
const DEFAULT_LANGSMITH_PROJECT: &str = "pr-rundown-waiter-11";
const DEFAULT_ADDR: &str = "127.0.0.1:7860";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_ITERATIONS: usize = 15;

/// An API key that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Source of secrets that were not found in the environment
pub trait SecretPrompt {
    fn prompt(&self, env_key: &str) -> Result<String>;
}

/// Reads a secret from the terminal without echoing it
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn prompt(&self, env_key: &str) -> Result<String> {
        rpassword::prompt_password(format!("{}: ", env_key))
            .map_err(|err| AgentError::Config(format!("Failed to read {}: {}", env_key, err)))
    }
}

#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_iterations: usize,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct FinancialDatasetsSettings {
    pub api_key: ApiKey,
    pub base_url: String,
}

/// LangSmith run tracing
#[derive(Debug, Clone)]
pub struct TracingSettings {
    pub api_key: ApiKey,
    pub enabled: bool,
    pub endpoint: String,
    pub project: String,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
}

/// Immutable process configuration, built once at start-up
#[derive(Debug, Clone)]
pub struct Settings {
    pub model: ModelSettings,
    pub financial_datasets: FinancialDatasetsSettings,
    pub tracing: TracingSettings,
    pub server: ServerSettings,
}

impl Settings {
    /// Load `.env`, read the process environment and prompt for missing keys
    pub fn load(prompt: &dyn SecretPrompt) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok(), prompt)
    }

    /// Build settings from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F, prompt: &dyn SecretPrompt) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secret = |key: &str| -> Result<ApiKey> {
            match value(key) {
                Some(key_value) => Ok(ApiKey::new(key_value.trim())),
                None => {
                    let entered = prompt.prompt(key)?;
                    let entered = entered.trim();
                    if entered.is_empty() {
                        return Err(AgentError::Config(format!("{} must not be empty", key)));
                    }
                    Ok(ApiKey::new(entered))
                }
            }
        };

        // Same order as the interactive prompts.
        let tracing_key = secret(LANGSMITH_API_KEY)?;
        let financial_key = secret(FINANCIAL_DATASETS_API_KEY)?;
        let model_key = secret(OPENAI_API_KEY)?;

        let addr_raw = value("FIN_AGENT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = parse_addr(&addr_raw)?;

        Ok(Self {
            model: ModelSettings {
                api_key: model_key,
                model: value("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: value("OPENAI_BASE_URL").unwrap_or_else(|| {
                    crate::services::openai_client::DEFAULT_BASE_URL.to_string()
                }),
                timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
                max_iterations: DEFAULT_MAX_ITERATIONS,
                max_tokens: None,
            },
            financial_datasets: FinancialDatasetsSettings {
                api_key: financial_key,
                base_url: value("FINANCIAL_DATASETS_BASE_URL").unwrap_or_else(|| {
                    crate::tools::financial_datasets::DEFAULT_BASE_URL.to_string()
                }),
            },
            tracing: TracingSettings {
                api_key: tracing_key,
                enabled: value("LANGSMITH_TRACING")
                    .map(|flag| parse_flag(&flag))
                    .unwrap_or(false),
                endpoint: value("LANGSMITH_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_LANGSMITH_ENDPOINT.to_string()),
                project: value("LANGSMITH_PROJECT")
                    .unwrap_or_else(|| DEFAULT_LANGSMITH_PROJECT.to_string()),
            },
            server: ServerSettings { addr },
        })
    }
}

pub fn parse_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|err| AgentError::Config(format!("Invalid listen address {:?}: {}", raw, err)))
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct ScriptedPrompt {
        answers: HashMap<&'static str, &'static str>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompt {
        fn new(answers: &[(&'static str, &'static str)]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl SecretPrompt for ScriptedPrompt {
        fn prompt(&self, env_key: &str) -> Result<String> {
            self.asked.borrow_mut().push(env_key.to_string());
            Ok(self.answers.get(env_key).copied().unwrap_or("").to_string())
        }
    }

    fn env(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_all_keys_from_env() {
        let prompt = ScriptedPrompt::new(&[]);
        let settings = Settings::from_lookup(
            env(&[
                (LANGSMITH_API_KEY, "ls-key"),
                (FINANCIAL_DATASETS_API_KEY, "fd-key"),
                (OPENAI_API_KEY, "sk-key"),
            ]),
            &prompt,
        )
        .unwrap();

        assert!(prompt.asked.borrow().is_empty());
        assert_eq!(settings.model.api_key.expose(), "sk-key");
        assert_eq!(settings.model.model, "gpt-4o");
        assert_eq!(settings.model.max_iterations, 15);
        assert_eq!(settings.financial_datasets.api_key.expose(), "fd-key");
        assert_eq!(
            settings.financial_datasets.base_url,
            "https://api.financialdatasets.ai"
        );
        assert!(!settings.tracing.enabled);
        assert_eq!(settings.tracing.project, "pr-rundown-waiter-11");
        assert_eq!(settings.server.addr.port(), 7860);
    }

    #[test]
    fn test_missing_keys_are_prompted_in_order() {
        let prompt = ScriptedPrompt::new(&[
            (LANGSMITH_API_KEY, "ls-typed"),
            (OPENAI_API_KEY, " sk-typed "),
        ]);
        let settings = Settings::from_lookup(
            env(&[(FINANCIAL_DATASETS_API_KEY, "fd-key"), ("LANGSMITH_TRACING", "true")]),
            &prompt,
        )
        .unwrap();

        assert_eq!(
            *prompt.asked.borrow(),
            vec![LANGSMITH_API_KEY.to_string(), OPENAI_API_KEY.to_string()]
        );
        assert_eq!(settings.model.api_key.expose(), "sk-typed");
        assert_eq!(settings.tracing.api_key.expose(), "ls-typed");
        assert!(settings.tracing.enabled);
    }

    #[test]
    fn test_empty_prompt_answer_is_fatal() {
        let prompt = ScriptedPrompt::new(&[]);
        let err = Settings::from_lookup(env(&[]), &prompt).unwrap_err();
        assert!(matches!(err, AgentError::Config(msg) if msg.contains(LANGSMITH_API_KEY)));
    }

    #[test]
    fn test_invalid_addr() {
        let prompt = ScriptedPrompt::new(&[]);
        let err = Settings::from_lookup(
            env(&[
                (LANGSMITH_API_KEY, "a"),
                (FINANCIAL_DATASETS_API_KEY, "b"),
                (OPENAI_API_KEY, "c"),
                ("FIN_AGENT_ADDR", "localhost"),
            ]),
            &prompt,
        )
        .unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("sk-secret");
        assert_eq!(format!("{:?}", key), "ApiKey(***)");
    }
}
