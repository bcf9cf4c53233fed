use serde_json::{json, Value};
use tracing::debug;

use crate::error::{AgentError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Single chat-completions call. Failures are returned as-is, never retried.
    /// The caller owns the deadline.
    pub async fn chat_completion(&self, body: &Value) -> Result<Value> {
        let request_url = build_chat_url(&self.base_url);
        debug!(url = %request_url, "sending chat completion request");

        let response = self
            .http
            .post(&request_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        let response_json: Value = match serde_json::from_str(&response_text) {
            Ok(value) => value,
            Err(err) if status.is_success() => {
                return Err(AgentError::Unknown(format!("Failed to parse JSON: {err}")))
            }
            Err(_) => {
                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message: response_text.trim().to_string(),
                })
            }
        };

        if !status.is_success() {
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_json).unwrap_or(response_text),
            });
        }

        if response_json.get("error").is_some_and(|error| !error.is_null()) {
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: api_error_message(&response_json)
                    .unwrap_or_else(|| response_json["error"].to_string()),
            });
        }

        Ok(response_json)
    }
}

fn api_error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(|error| error.get("message"))
        .and_then(|value| value.as_str())
        .map(|s| s.to_string())
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        body
    }
}
