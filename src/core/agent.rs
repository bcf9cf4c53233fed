use crate::{
    config::Settings,
    error::Result,
    services::openai_client::OpenAIClient,
    tools::{FinancialDatasetsClient, FinancialDatasetsToolkit, ToolRegistry},
    types::AgentResponse,
};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::prompt::FINANCIAL_ANALYST_PROMPT;

/// Anything that can answer a query with tools behind it.
///
/// The query pipeline only depends on this trait, so tests can swap the
/// real model-backed agent for a scripted one.
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    async fn invoke(&self, input: &str) -> Result<AgentResponse>;
}

/// Tool-calling agent over an OpenAI-compatible chat-completions API
#[derive(Debug)]
pub struct FinancialAgent {
    openai_client: OpenAIClient,
    tools: ToolRegistry,
    system_prompt: String,
    model: String,
    max_iterations: usize,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl FinancialAgent {
    pub fn new(api_key: String, tools: ToolRegistry) -> Self {
        Self {
            openai_client: OpenAIClient::new(api_key),
            tools,
            system_prompt: FINANCIAL_ANALYST_PROMPT.to_string(),
            model: "gpt-4o".to_string(),
            max_iterations: 15,
            max_tokens: None,
            timeout: Duration::from_secs(120),
        }
    }

    /// Agent with the three Financial Datasets tools, configured from `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        let client = FinancialDatasetsClient::new(settings.financial_datasets.api_key.expose())
            .with_base_url(settings.financial_datasets.base_url.clone());
        let tools = FinancialDatasetsToolkit::new(client).into_registry();

        let model = &settings.model;
        Self::new(model.api_key.expose().to_string(), tools)
            .with_model(model.model.clone())
            .with_base_url(model.base_url.clone())
            .with_timeout(model.timeout)
            .with_max_iterations(model.max_iterations)
            .with_max_tokens(model.max_tokens)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_client.set_base_url(base_url);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub(crate) fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub(crate) fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub(crate) fn max_tokens(&self) -> Option<u32> {
        self.max_tokens
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    pub(crate) async fn make_raw_request(&self, request_body: &Value) -> Result<Value> {
        self.openai_client
            .chat_completion(request_body)
            .await
    }

    /// Run the agent and return only the final answer
    pub async fn run(&self, prompt: &str) -> Result<String> {
        Ok(self.run_with_steps(prompt).await?.output)
    }
}

#[async_trait]
impl AgentExecutor for FinancialAgent {
    async fn invoke(&self, input: &str) -> Result<AgentResponse> {
        let result = self.run_with_steps(input).await?;
        debug!("{}", result.replay());
        Ok(AgentResponse::new(input, result.output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecretPrompt;

    struct NoPrompt;

    impl SecretPrompt for NoPrompt {
        fn prompt(&self, env_key: &str) -> Result<String> {
            Err(crate::AgentError::Config(format!("unexpected prompt for {env_key}")))
        }
    }

    #[test]
    fn test_from_settings_registers_statement_tools() {
        let settings = Settings::from_lookup(
            |key| match key {
                "LANGSMITH_API_KEY" => Some("ls".to_string()),
                "FINANCIAL_DATASETS_API_KEY" => Some("fd".to_string()),
                "OPENAI_API_KEY" => Some("sk".to_string()),
                "OPENAI_MODEL" => Some("gpt-4o-mini".to_string()),
                _ => None,
            },
            &NoPrompt,
        )
        .unwrap();

        let agent = FinancialAgent::from_settings(&settings);
        assert_eq!(agent.model(), "gpt-4o-mini");
        assert_eq!(agent.tools().len(), 3);
        assert!(agent.tools().has_tool("income_statements"));
        assert!(agent.system_prompt().contains("cash_flow_statements"));
    }
}
