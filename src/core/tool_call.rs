use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Represents a tool call request from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// The call id, or an empty string when the model omitted it
    pub fn id_of(tool_call: &Value) -> &str {
        tool_call
            .get("id")
            .and_then(|value| value.as_str())
            .unwrap_or_default()
    }

    /// Parse a tool call from OpenAI response format
    pub fn from_openai_format(tool_call: &Value) -> Result<Self> {
        let id = Self::id_of(tool_call).to_string();

        let function = tool_call.get("function").ok_or_else(|| {
            AgentError::InvalidFunctionCall("Tool call missing function".to_string())
        })?;

        let name = function
            .get("name")
            .and_then(|value| value.as_str())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                AgentError::InvalidFunctionCall("Tool call missing function name".to_string())
            })?;

        let arguments_str = function
            .get("arguments")
            .and_then(|value| value.as_str())
            .unwrap_or("");
        let arguments = if arguments_str.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(arguments_str).map_err(|err| {
                AgentError::InvalidFunctionCall(format!(
                    "Failed to parse arguments for tool '{}': {}",
                    name, err
                ))
            })?
        };

        Ok(Self::new(id, name, arguments))
    }

    /// Keep a call that failed to parse as the model sent it, with the
    /// argument text as a JSON string
    pub fn raw(tool_call: &Value) -> Self {
        let function = tool_call.get("function");
        let field = |key: &str| {
            function
                .and_then(|f| f.get(key))
                .and_then(|value| value.as_str())
                .unwrap_or_default()
                .to_string()
        };

        Self::new(
            Self::id_of(tool_call),
            field("name"),
            Value::String(field("arguments")),
        )
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution {
    pub tool_call: ToolCall,
    start_time: Instant,
}

impl ToolExecution {
    /// Start tracking a tool execution
    pub fn start(tool_call: ToolCall) -> Self {
        Self {
            tool_call,
            start_time: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
