//! fin-agent-rs: ask an LLM agent about company financial statements.
//!
//! The agent can look up balance sheets, income statements and cash flow
//! statements from the Financial Datasets API. Answers are stripped of LaTeX
//! math wrappers and shown on the command line or in a single-page web form.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use fin_agent_rs::{config::TerminalPrompt, display, FinancialAgent, QueryPipeline, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::load(&TerminalPrompt)?;
//!     let pipeline = QueryPipeline::new(Arc::new(FinancialAgent::from_settings(&settings)));
//!
//!     let outcome = pipeline.run("What was AAPL's revenue in 2023?").await;
//!     println!("{}", display::render_outcome(&outcome));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod display;
pub mod error;
pub mod pipeline;
pub mod sanitize;
pub(crate) mod services;
pub mod telemetry;
pub mod tools;
pub mod types;
pub mod web;

pub use config::Settings;
pub use core::{
    AgentExecutor, AgentMemory, AgentStep, FinancialAgent, RunResult, TokenUsage, ToolCall,
};
pub use error::{AgentError, Result};
pub use pipeline::{Query, QueryError, QueryOutcome, QueryPipeline};
pub use sanitize::clean_latex;
pub use tools::{FinancialDatasetsClient, FinancialDatasetsToolkit, Tool, ToolRegistry};
pub use types::AgentResponse;

#[cfg(feature = "cli")]
pub mod cli;
