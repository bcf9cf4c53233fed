use crate::{
    config::{parse_addr, Settings, TerminalPrompt},
    display::{format_error, render_outcome, EXAMPLE_QUERY},
    pipeline::{Query, QueryPipeline},
    telemetry::LangSmithTracer,
    web, FinancialAgent,
};
use clap::{value_parser, Arg, ArgMatches, Command};
use std::io::{BufRead, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn command() -> Command {
    Command::new("fin-agent")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Ask an LLM agent questions about company financial statements")
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .global(true)
                .help("Chat model to use (or set OPENAI_MODEL) [default: gpt-4o]"),
        )
        .arg(
            Arg::new("base-url")
                .short('u')
                .long("base-url")
                .value_name("URL")
                .global(true)
                .help("OpenAI-compatible API base URL (or set OPENAI_BASE_URL)"),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Timeout for each model request in seconds [default: 120]"),
        )
        .arg(
            Arg::new("max-iterations")
                .short('i')
                .long("max-iterations")
                .value_name("COUNT")
                .global(true)
                .value_parser(value_parser!(usize))
                .help("Maximum agent iterations [default: 15]"),
        )
        .subcommand(
            Command::new("ask")
                .about("Ask a single question on the command line (default)")
                .arg(
                    Arg::new("query")
                        .help("The question; prompted for when omitted")
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the single-page chat form")
                .arg(
                    Arg::new("addr")
                        .short('a')
                        .long("addr")
                        .value_name("ADDR")
                        .help("Listen address (or set FIN_AGENT_ADDR) [default: 127.0.0.1:7860]"),
                ),
        )
}

/// CLI entry point for the fin-agent tool
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let matches = command().get_matches();
    let serving = matches!(matches.subcommand(), Some(("serve", _)));
    init_tracing(serving);

    let mut settings = Settings::load(&TerminalPrompt)?;
    apply_overrides(&mut settings, &matches);

    let pipeline = Arc::new(build_pipeline(&settings));

    match matches.subcommand() {
        Some(("serve", sub)) => {
            let addr = match sub.get_one::<String>("addr") {
                Some(raw) => parse_addr(raw)?,
                None => settings.server.addr,
            };
            info!(model = %settings.model.model, "starting web form");
            web::serve(addr, pipeline).await?;
        }
        Some(("ask", sub)) => {
            let query = sub.get_one::<String>("query").cloned();
            ask(&pipeline, query, &mut std::io::stdin().lock(), &mut std::io::stdout()).await?
        }
        _ => ask(&pipeline, None, &mut std::io::stdin().lock(), &mut std::io::stdout()).await?,
    }

    Ok(())
}

fn init_tracing(serving: bool) {
    let default_filter = if serving {
        "fin_agent_rs=info,tower_http=info"
    } else {
        "fin_agent_rs=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn apply_overrides(settings: &mut Settings, matches: &ArgMatches) {
    if let Some(model) = matches.get_one::<String>("model") {
        settings.model.model = model.clone();
    }
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        settings.model.base_url = base_url.clone();
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        settings.model.timeout = Duration::from_secs(*timeout);
    }
    if let Some(max_iterations) = matches.get_one::<usize>("max-iterations") {
        settings.model.max_iterations = *max_iterations;
    }
}

fn build_pipeline(settings: &Settings) -> QueryPipeline {
    let agent = FinancialAgent::from_settings(settings);
    let pipeline = QueryPipeline::new(Arc::new(agent));

    match LangSmithTracer::from_settings(&settings.tracing) {
        Some(tracer) => {
            info!(project = %settings.tracing.project, "LangSmith tracing enabled");
            pipeline.with_tracer(Arc::new(tracer))
        }
        None => pipeline,
    }
}

/// One question, one answer, then exit
async fn ask<R: BufRead, W: Write>(
    pipeline: &QueryPipeline,
    query: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match query {
        Some(query) => query,
        None => {
            writeln!(out, "\nExample query: '{}'", EXAMPLE_QUERY)?;
            write!(out, "Enter your financial query: ")?;
            out.flush()?;

            let mut line = String::new();
            input.read_line(&mut line)?;
            line
        }
    };

    match Query::parse(&raw) {
        Ok(query) => {
            writeln!(out, "\nYou asked: {}", query.as_str())?;
            writeln!(out, "Processing your query...")?;
        }
        Err(err) => {
            writeln!(out, "{}", format_error(&err.to_string()))?;
            return Ok(());
        }
    }

    let outcome = pipeline.run(&raw).await;
    writeln!(out, "\n{}", render_outcome(&outcome))?;

    Ok(())
}
