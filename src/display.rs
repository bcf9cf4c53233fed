//! Plain-text rendering of pipeline outcomes, shared by the CLI and the web page.

use crate::{pipeline::QueryOutcome, types::AgentResponse};

pub const EXAMPLE_QUERY: &str =
    "What was AAPL's revenue in 2023? What about its total debt in Q1 2024?";

/// The query/answer block shown after a successful run
pub fn format_response(response: &AgentResponse) -> String {
    format!(
        "=== User Query ===\n{}\n\n=== Chatbot Response ===\n{}\n\n=== End of Response ===",
        response.input, response.output
    )
}

pub fn format_error(message: &str) -> String {
    format!("Error: {}", message)
}

/// Render any outcome as the text the user sees
pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Answered(response) => format_response(response),
        QueryOutcome::Rejected(err) => format_error(&err.to_string()),
        QueryOutcome::Failed { message, .. } => format_error(message),
    }
}
