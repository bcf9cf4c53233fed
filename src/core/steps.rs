use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Represents a single step in the agent's reasoning process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStep {
    /// The user's financial query
    Task { content: String },
    /// The model asked for a statement lookup
    Action {
        tool_name: String,
        tool_call_id: String,
        arguments: Value,
    },
    /// Result (or error payload) of a statement lookup
    Observation {
        tool_call_id: String,
        result: String,
        is_error: bool,
    },
    /// Final answer from the agent
    FinalAnswer { answer: String },
}

impl AgentStep {
    /// Convert step to OpenAI message format
    pub fn to_message(&self) -> Value {
        match self {
            AgentStep::Task { content } => {
                serde_json::json!({
                    "role": "user",
                    "content": content
                })
            }
            AgentStep::Action {
                tool_name,
                tool_call_id,
                arguments,
            } => {
                // Unparseable arguments are kept as the raw text the model sent.
                let arguments = match arguments {
                    Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                };
                serde_json::json!({
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": tool_call_id,
                        "type": "function",
                        "function": {
                            "name": tool_name,
                            "arguments": arguments
                        }
                    }]
                })
            }
            AgentStep::Observation {
                tool_call_id,
                result,
                ..
            } => {
                serde_json::json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result
                })
            }
            AgentStep::FinalAnswer { answer } => {
                serde_json::json!({
                    "role": "assistant",
                    "content": answer
                })
            }
        }
    }

    /// Get a human-readable description of the step
    pub fn describe(&self) -> String {
        match self {
            AgentStep::Task { content } => format!("Task: {}", content),
            AgentStep::Action {
                tool_name,
                arguments,
                ..
            } => format!("Action: {}({})", tool_name, arguments),
            AgentStep::Observation {
                result, is_error, ..
            } => {
                if *is_error {
                    format!("Error: {}", result)
                } else {
                    format!("Observation: {}", truncate(result, 200))
                }
            }
            AgentStep::FinalAnswer { answer } => format!("Final Answer: {}", answer),
        }
    }
}

// Statement payloads run to several KB; keep log lines readable.
fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_message_shape() {
        let step = AgentStep::Action {
            tool_name: "income_statements".to_string(),
            tool_call_id: "call_1".to_string(),
            arguments: json!({"ticker": "AAPL"}),
        };
        let message = step.to_message();
        assert_eq!(message["role"], "assistant");
        assert_eq!(message["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            message["tool_calls"][0]["function"]["arguments"],
            r#"{"ticker":"AAPL"}"#
        );
    }

    #[test]
    fn test_raw_string_arguments_are_sent_verbatim() {
        let step = AgentStep::Action {
            tool_name: "balance_sheets".to_string(),
            tool_call_id: "call_2".to_string(),
            arguments: json!("{bad json"),
        };
        assert_eq!(
            step.to_message()["tool_calls"][0]["function"]["arguments"],
            "{bad json"
        );
    }

    #[test]
    fn test_describe_truncates_long_observations() {
        let step = AgentStep::Observation {
            tool_call_id: "call_1".to_string(),
            result: "x".repeat(500),
            is_error: false,
        };
        let description = step.describe();
        assert!(description.ends_with("..."));
        assert!(description.len() < 230);
    }
}
