use super::steps::AgentStep;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Ordered record of one agent run, convertible to chat messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMemory {
    steps: Vec<AgentStep>,
    system_prompt: Option<String>,
}

impl AgentMemory {
    /// Create a new memory with optional system prompt
    pub fn new(system_prompt: Option<String>) -> Self {
        Self {
            steps: Vec::new(),
            system_prompt,
        }
    }

    /// Add a step to memory
    pub fn add_step(&mut self, step: AgentStep) {
        info!(target: "fin_agent_rs::steps", "{}", step.describe());
        self.steps.push(step);
    }

    pub fn into_steps(self) -> Vec<AgentStep> {
        self.steps
    }

    /// Convert memory to OpenAI message format
    pub fn as_messages(&self) -> Vec<Value> {
        let mut messages = Vec::with_capacity(self.steps.len() + 1);

        if let Some(system_prompt) = &self.system_prompt {
            messages.push(serde_json::json!({
                "role": "system",
                "content": system_prompt
            }));
        }

        messages.extend(self.steps.iter().map(AgentStep::to_message));
        messages
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn count_actions(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, AgentStep::Action { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_creation() {
        let memory = AgentMemory::new(Some("System".to_string()));
        assert_eq!(memory.step_count(), 0);
        assert!(memory.is_empty());
    }

    #[test]
    fn test_as_messages() {
        let mut memory = AgentMemory::new(Some("You are a financial analyst".to_string()));
        memory.add_step(AgentStep::Task {
            content: "What was AAPL's revenue in 2023?".to_string(),
        });

        let messages = memory.as_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
    }

    #[test]
    fn test_without_system_prompt() {
        let mut memory = AgentMemory::new(None);
        memory.add_step(AgentStep::Task {
            content: "hi".to_string(),
        });
        assert_eq!(memory.as_messages()[0]["role"], "user");
    }

    #[test]
    fn test_count_actions() {
        let mut memory = AgentMemory::new(None);
        memory.add_step(AgentStep::Action {
            tool_name: "balance_sheets".to_string(),
            tool_call_id: "1".to_string(),
            arguments: Value::Null,
        });
        memory.add_step(AgentStep::Observation {
            tool_call_id: "1".to_string(),
            result: "[]".to_string(),
            is_error: false,
        });
        assert_eq!(memory.count_actions(), 1);
        assert_eq!(memory.step_count(), 2);
    }
}
