pub mod response;
pub mod result;

pub use response::AgentResponse;
pub use result::{RunResult, TokenUsage};
