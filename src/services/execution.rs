use crate::{
    core::{
        agent::FinancialAgent,
        memory::AgentMemory,
        steps::AgentStep,
        tool_call::{ToolCall, ToolExecution},
    },
    error::{AgentError, Result},
    services::openai_client::ChatCompletionRequest,
    types::result::{RunResult, TokenUsage},
};
use serde_json::{json, Value};
use std::time::Instant;
use tokio::time::timeout;
use tracing::{debug, info_span, warn, Instrument};

impl FinancialAgent {
    /// Run the tool-calling loop until the model answers without tool calls
    pub async fn run_with_steps(&self, prompt: &str) -> Result<RunResult> {
        let span = info_span!("agent_run", model = %self.model());
        self.run_loop(prompt).instrument(span).await
    }

    async fn run_loop(&self, prompt: &str) -> Result<RunResult> {
        let start_time = Instant::now();
        let mut memory = AgentMemory::new(Some(self.system_prompt().to_string()));
        memory.add_step(AgentStep::Task {
            content: prompt.to_string(),
        });

        let tools = self.tools().to_openai_tools();
        let mut usage: Option<TokenUsage> = None;

        for iteration in 1..=self.max_iterations() {
            debug!(iteration, "requesting chat completion");

            let mut chat_request =
                ChatCompletionRequest::new(self.model().to_owned(), memory.as_messages())
                    .with_max_tokens(self.max_tokens());

            if !tools.is_empty() {
                chat_request = chat_request
                    .with_tools(tools.clone())
                    .with_tool_choice(json!("auto"));
            }

            let request_body = chat_request.into_value();

            let response = timeout(self.timeout(), self.make_raw_request(&request_body))
                .await
                .map_err(|_| AgentError::Timeout("chat completion call timed out".to_string()))??;

            if let Some(turn_usage) = TokenUsage::from_response(&response) {
                usage.get_or_insert_with(TokenUsage::default).add(turn_usage);
            }

            let assistant_message = assistant_message(&response)?;

            let tool_calls = assistant_message
                .get("tool_calls")
                .and_then(|value| value.as_array())
                .filter(|calls| !calls.is_empty());

            match tool_calls {
                Some(calls) => {
                    for tool_call in calls {
                        self.handle_tool_call(tool_call, &mut memory).await;
                    }
                }
                None => {
                    let answer = assistant_message
                        .get("content")
                        .and_then(|value| value.as_str())
                        .unwrap_or("")
                        .trim()
                        .to_string();

                    memory.add_step(AgentStep::FinalAnswer {
                        answer: answer.clone(),
                    });

                    return Ok(RunResult::new(
                        answer,
                        memory.into_steps(),
                        usage,
                        start_time.elapsed(),
                        iteration,
                    ));
                }
            }
        }

        Err(AgentError::MaxIterations(self.max_iterations()))
    }

    /// Execute one tool call, recording the action and its observation.
    /// Failures go back to the model as error payloads.
    async fn handle_tool_call(&self, raw_call: &Value, memory: &mut AgentMemory) {
        let tool_call = match ToolCall::from_openai_format(raw_call) {
            Ok(call) => call,
            Err(error) => {
                warn!(%error, "malformed tool call");
                // The tool message must answer an assistant tool_calls entry.
                let raw = ToolCall::raw(raw_call);
                memory.add_step(AgentStep::Action {
                    tool_name: raw.name,
                    tool_call_id: raw.id.clone(),
                    arguments: raw.arguments,
                });
                memory.add_step(AgentStep::Observation {
                    tool_call_id: raw.id,
                    result: error.to_error_payload().to_string(),
                    is_error: true,
                });
                return;
            }
        };

        memory.add_step(AgentStep::Action {
            tool_name: tool_call.name.clone(),
            tool_call_id: tool_call.id.clone(),
            arguments: tool_call.arguments.clone(),
        });

        let execution = ToolExecution::start(tool_call);
        let outcome = self
            .tools()
            .execute(&execution.tool_call.name, execution.tool_call.arguments.clone())
            .await;
        debug!(
            tool = %execution.tool_call.name,
            elapsed_ms = execution.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "tool finished"
        );

        let (result, is_error) = match outcome {
            Ok(value) => (value.to_string(), false),
            Err(error) => {
                warn!(tool = %execution.tool_call.name, %error, "tool failed");
                (error.to_error_payload().to_string(), true)
            }
        };

        memory.add_step(AgentStep::Observation {
            tool_call_id: execution.tool_call.id,
            result,
            is_error,
        });
    }
}

fn assistant_message(response: &Value) -> Result<&Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            AgentError::Unknown("Missing 'choices' array in completion response".to_string())
        })?;

    let first_choice = choices.first().ok_or_else(|| {
        AgentError::Unknown("Completion response contained no choices".to_string())
    })?;

    first_choice.get("message").ok_or_else(|| {
        AgentError::Unknown("Completion response missing assistant message".to_string())
    })
}
