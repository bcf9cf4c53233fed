//! Query validation, agent dispatch and answer cleanup.
//!
//! [`QueryPipeline::run`] never fails: every path ends in a [`QueryOutcome`]
//! that the front ends render.

use crate::{
    core::agent::AgentExecutor,
    sanitize::clean_latex,
    telemetry::{RunRecord, RunTracer},
    types::AgentResponse,
};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Why a query was refused before reaching the agent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query cannot be empty. Please try again.")]
    Empty,
}

/// A validated, trimmed, non-empty query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QueryError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of one pass through the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The agent answered; `output` is already sanitized
    Answered(AgentResponse),
    /// The query was rejected before dispatch
    Rejected(QueryError),
    /// The agent (or something behind it) failed
    Failed { query: String, message: String },
}

impl QueryOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, QueryOutcome::Answered(_))
    }
}

pub struct QueryPipeline {
    agent: Arc<dyn AgentExecutor>,
    tracer: Option<Arc<dyn RunTracer>>,
}

impl QueryPipeline {
    pub fn new(agent: Arc<dyn AgentExecutor>) -> Self {
        Self {
            agent,
            tracer: None,
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<dyn RunTracer>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Validate `raw`, ask the agent once and clean the answer
    pub async fn run(&self, raw: &str) -> QueryOutcome {
        let query = match Query::parse(raw) {
            Ok(query) => query,
            Err(err) => {
                info!("rejected query: {}", err);
                return QueryOutcome::Rejected(err);
            }
        };

        info!(query = query.as_str(), "dispatching query to agent");
        let started_at = Utc::now();

        let (outcome, record) = match self.agent.invoke(query.as_str()).await {
            Ok(response) => {
                info!("agent answered");
                let response = response.map_output(clean_latex);
                let record = RunRecord::success(&response.input, &response.output, started_at);
                (QueryOutcome::Answered(response), record)
            }
            Err(err) => {
                error!(error = %err, "agent call failed");
                let message = err.to_string();
                let record = RunRecord::failure(query.as_str(), &message, started_at);
                let outcome = QueryOutcome::Failed {
                    query: query.as_str().to_string(),
                    message,
                };
                (outcome, record)
            }
        };

        if let Some(tracer) = &self.tracer {
            if let Err(err) = tracer.record(&record).await {
                warn!(error = %err, "failed to record run trace");
            }
        }

        outcome
    }
}

impl std::fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryPipeline")
            .field("tracing", &self.tracer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AgentError, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAgent {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl AgentExecutor for RecordingAgent {
        async fn invoke(&self, input: &str) -> Result<AgentResponse> {
            self.calls.lock().unwrap().push(input.to_string());
            if self.fail {
                return Err(AgentError::Api {
                    status: 500,
                    message: "model unavailable".to_string(),
                });
            }
            Ok(AgentResponse::new(input, "  Margin: \\[ 10 / 40 = 25\\% \\] "))
        }
    }

    #[derive(Default)]
    struct RecordingTracer {
        runs: Mutex<Vec<RunRecord>>,
    }

    #[async_trait]
    impl RunTracer for RecordingTracer {
        async fn record(&self, run: &RunRecord) -> Result<()> {
            self.runs.lock().unwrap().push(run.clone());
            Err(AgentError::Unknown("tracing backend down".to_string()))
        }
    }

    #[test]
    fn test_query_parse() {
        assert_eq!(Query::parse("").unwrap_err(), QueryError::Empty);
        assert_eq!(Query::parse(" \t\n").unwrap_err(), QueryError::Empty);
        assert_eq!(Query::parse("  AAPL revenue ").unwrap().as_str(), "AAPL revenue");
    }

    #[tokio::test]
    async fn test_empty_query_never_reaches_agent() {
        let agent = Arc::new(RecordingAgent::default());
        let pipeline = QueryPipeline::new(agent.clone());

        let outcome = pipeline.run("   ").await;

        assert_eq!(outcome, QueryOutcome::Rejected(QueryError::Empty));
        assert!(agent.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_answer_is_sanitized_and_agent_called_once() {
        let agent = Arc::new(RecordingAgent::default());
        let pipeline = QueryPipeline::new(agent.clone());

        let outcome = pipeline.run("What was AAPL's net margin in 2023?").await;

        assert_eq!(
            outcome,
            QueryOutcome::Answered(AgentResponse::new(
                "What was AAPL's net margin in 2023?",
                "Margin:  10 / 40 = 25\\%"
            ))
        );
        assert_eq!(
            *agent.calls.lock().unwrap(),
            vec!["What was AAPL's net margin in 2023?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_agent_failure_becomes_outcome() {
        let agent = Arc::new(RecordingAgent {
            fail: true,
            ..Default::default()
        });
        let pipeline = QueryPipeline::new(agent);

        let outcome = pipeline.run("TSLA debt?").await;

        assert_eq!(
            outcome,
            QueryOutcome::Failed {
                query: "TSLA debt?".to_string(),
                message: "API error (500): model unavailable".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_tracer_errors_do_not_change_outcome() {
        let tracer = Arc::new(RecordingTracer::default());
        let pipeline =
            QueryPipeline::new(Arc::new(RecordingAgent::default())).with_tracer(tracer.clone());

        assert!(pipeline.run("MSFT cash flow").await.is_answered());
        assert!(pipeline.run("").await == QueryOutcome::Rejected(QueryError::Empty));

        let runs = tracer.runs.lock().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].inputs["input"], "MSFT cash flow");
    }
}
