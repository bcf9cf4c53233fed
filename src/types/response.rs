use serde::{Deserialize, Serialize};

/// What an agent executor returns for one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Echo of the query that was asked
    pub input: String,
    /// The agent's final answer text
    pub output: String,
}

impl AgentResponse {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    pub fn map_output(self, f: impl FnOnce(&str) -> String) -> Self {
        let output = f(&self.output);
        Self {
            input: self.input,
            output,
        }
    }
}
