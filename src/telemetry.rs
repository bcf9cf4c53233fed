//! Run tracing to LangSmith.
//!
//! Each answered (or failed) query becomes one `chain` run in the configured
//! LangSmith project. Tracing is best-effort: the pipeline logs and ignores
//! any error returned here.

use crate::{
    config::TracingSettings,
    error::{AgentError, Result},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

const RUN_NAME: &str = "financial-agent";

/// One traced agent invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRecord {
    pub id: Uuid,
    pub name: String,
    pub run_type: String,
    pub inputs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl RunRecord {
    pub fn success(input: &str, output: &str, start_time: DateTime<Utc>) -> Self {
        Self::new(input, Some(json!({ "output": output })), None, start_time)
    }

    pub fn failure(input: &str, error: &str, start_time: DateTime<Utc>) -> Self {
        Self::new(input, None, Some(error.to_string()), start_time)
    }

    fn new(
        input: &str,
        outputs: Option<Value>,
        error: Option<String>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: RUN_NAME.to_string(),
            run_type: "chain".to_string(),
            inputs: json!({ "input": input }),
            outputs,
            error,
            start_time,
            end_time: Utc::now(),
        }
    }
}

#[async_trait]
pub trait RunTracer: Send + Sync {
    async fn record(&self, run: &RunRecord) -> Result<()>;
}

#[derive(Serialize)]
struct RunPayload<'a> {
    #[serde(flatten)]
    run: &'a RunRecord,
    session_name: &'a str,
}

/// Posts runs to the LangSmith REST API
#[derive(Debug, Clone)]
pub struct LangSmithTracer {
    api_key: String,
    endpoint: String,
    project: String,
    client: Client,
}

impl LangSmithTracer {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            project: project.into(),
            client: Client::new(),
        }
    }

    /// `None` when tracing is switched off
    pub fn from_settings(settings: &TracingSettings) -> Option<Self> {
        settings.enabled.then(|| {
            Self::new(
                settings.api_key.expose(),
                settings.endpoint.clone(),
                settings.project.clone(),
            )
        })
    }
}

#[async_trait]
impl RunTracer for LangSmithTracer {
    async fn record(&self, run: &RunRecord) -> Result<()> {
        let url = format!("{}/runs", self.endpoint.trim_end_matches('/'));
        let payload = RunPayload {
            run,
            session_name: &self.project,
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AgentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!(run_id = %run.id, project = %self.project, "run traced");
        Ok(())
    }
}
