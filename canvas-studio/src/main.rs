//! # GenAI Canvas CLI
//!
//! Runs one generation against a fresh canvas and prints the resulting
//! document as JSON.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use genai_canvas_core::onboarding::GETTING_STARTED;
use genai_canvas_studio::config::first_run_gate;
use genai_canvas_studio::{execute, new_document, CliArgs, GeminiClient, Orchestrator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,genai_canvas_studio=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,genai_canvas_studio=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let args = CliArgs::parse();

    let mut gate = first_run_gate(&args.state_dir());
    if gate.should_show() {
        eprintln!("{GETTING_STARTED}\n");
        gate.dismiss();
    }

    let client = GeminiClient::new(args.gemini_config())?;
    let document = new_document(args.width, args.height);
    let orchestrator = Orchestrator::with_config(
        document.clone(),
        Arc::new(client),
        args.orchestrator_config(),
    );

    if let Err(e) = execute(&orchestrator, &args.command).await {
        tracing::warn!("Command failed: {e}");
        eprintln!("{}", e.toast().title);
        return Ok(ExitCode::FAILURE);
    }

    println!("{}", document.to_json()?);
    Ok(ExitCode::SUCCESS)
}
