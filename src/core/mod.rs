pub mod agent;
pub mod memory;
pub mod prompt;
pub mod steps;
pub mod tool_call;

pub use crate::types::result::{RunResult, TokenUsage};
pub use agent::{AgentExecutor, FinancialAgent};
pub use memory::AgentMemory;
pub use prompt::FINANCIAL_ANALYST_PROMPT;
pub use steps::AgentStep;
pub use tool_call::{ToolCall, ToolExecution};
