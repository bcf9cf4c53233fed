//! Single-page web form.
//!
//! `GET /` shows the form, `POST /` runs one query and shows the page again
//! with the output region filled in. Nothing is kept between requests.

use crate::{
    display::{render_outcome, EXAMPLE_QUERY},
    error::Result,
    pipeline::{QueryOutcome, QueryPipeline},
};
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::info;

#[derive(Clone)]
struct WebState {
    pipeline: Arc<QueryPipeline>,
}

#[derive(Debug, Deserialize)]
struct QueryForm {
    #[serde(default)]
    query: String,
}

pub fn router(pipeline: Arc<QueryPipeline>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .layer(TraceLayer::new_for_http())
        .with_state(WebState { pipeline })
}

/// Serve the form until the process is stopped
pub async fn serve(addr: SocketAddr, pipeline: Arc<QueryPipeline>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Financial chatbot listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(pipeline)).await?;
    Ok(())
}

async fn index() -> Html<String> {
    Html(render_page("", None))
}

async fn submit(State(state): State<WebState>, Form(form): Form<QueryForm>) -> Html<String> {
    let outcome = state.pipeline.run(&form.query).await;
    Html(render_page(&form.query, Some(&outcome)))
}

fn render_page(query: &str, outcome: Option<&QueryOutcome>) -> String {
    let output = match outcome {
        None => String::new(),
        Some(outcome) => {
            let class = if outcome.is_answered() { "answer" } else { "error" };
            format!(
                r#"<pre id="output" class="{}">{}</pre>"#,
                class,
                escape_html(&render_outcome(outcome))
            )
        }
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Financial Analysis Chatbot</title>
<style>
body {{ font-family: sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; }}
textarea {{ width: 100%; }}
pre {{ white-space: pre-wrap; background: #f6f8fa; padding: 1rem; border-radius: 4px; }}
pre.error {{ color: #b00020; }}
</style>
</head>
<body>
<h1>Financial Analysis Chatbot</h1>
<p>Ask about income statements, balance sheets or cash flow statements of public companies.</p>
<form method="post" action="/">
<textarea name="query" rows="3" placeholder="{}">{}</textarea>
<p><button type="submit">Submit</button></p>
</form>
{}
</body>
</html>
"#,
        escape_html(EXAMPLE_QUERY),
        escape_html(query),
        output
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
