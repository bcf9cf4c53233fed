use crate::{AgentError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// A tool that can be executed by the agent
pub trait Tool: Send + Sync + std::fmt::Debug {
    /// The name of the tool (used in function calls)
    fn name(&self) -> &'static str;

    /// A description of what the tool does
    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters
    fn parameters_schema(&self) -> Value;

    /// Execute the tool with given parameters
    fn execute(
        &self,
        parameters: Value,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>>;
}

/// Deserialize tool arguments, reporting the offending field path on failure
pub fn parse_arguments<T: DeserializeOwned>(tool_name: &str, parameters: Value) -> Result<T> {
    serde_path_to_error::deserialize(parameters).map_err(|err| {
        let path = err.path().to_string();
        let location = if path == "." { "<root>".to_string() } else { path };
        AgentError::Validation(format!(
            "Invalid parameters for {} at {}: {}",
            tool_name,
            location,
            err.inner()
        ))
    })
}

/// Registry for available tools, keyed by tool name
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_boxed(Box::new(tool));
    }

    pub fn register_boxed(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|tool| tool.as_ref())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call by name
    pub async fn execute(&self, name: &str, parameters: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        tool.execute(parameters).await
    }

    /// Generate tool schemas for OpenAI function calling
    pub fn to_openai_tools(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": tool.name(),
                        "description": tool.description(),
                        "parameters": tool.parameters_schema()
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::pin::Pin;

    #[derive(Debug)]
    struct EchoTool;

    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the input back"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }

        fn execute(
            &self,
            parameters: Value,
        ) -> Pin<Box<dyn std::future::Future<Output = Result<Value>> + Send + '_>> {
            Box::pin(async move { Ok(parameters) })
        }
    }

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Params {
        ticker: String,
        limit: u32,
    }

    #[tokio::test]
    async fn test_registry_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has_tool("echo"));
        assert_eq!(registry.names(), vec!["echo"]);

        let result = registry.execute("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(result["text"], "hi");
    }

    #[test]
    fn test_registry_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = tokio_test::block_on(registry.execute("missing", json!({}))).unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "missing"));
    }

    #[test]
    fn test_openai_tool_format() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let tools = registry.to_openai_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "echo");
    }

    #[test]
    fn test_parse_arguments_reports_path() {
        let err = parse_arguments::<Params>("balance_sheets", json!({"ticker": "AAPL", "limit": "x"}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("balance_sheets"), "{message}");
        assert!(message.contains("limit"), "{message}");
    }
}
