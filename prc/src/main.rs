//! prc - prompt router client
//!
//! CLI entry point for submitting prompts and following their sessions.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use promptrouter::cli::{Cli, Command, OutputFormat, get_log_path};
use promptrouter::client::{HttpSessionApi, SessionApi};
use promptrouter::config::Config;
use promptrouter::controller::{ControllerOptions, SessionController};
use promptrouter::domain::SessionId;
use promptrouter::repl::{PromptOutput, Repl};
use promptrouter::surface::TerminalSurface;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(command) = &cli.command {
        command.validate()?;
    }

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(base_url) = &cli.base_url {
        config.server.base_url = base_url.clone();
    }
    config.validate().context("Invalid configuration")?;

    info!(base_url = %config.server.base_url, "prc loaded config");

    let api: Arc<dyn SessionApi> =
        Arc::new(HttpSessionApi::from_config(&config.server).context("Failed to create router client")?);
    let options = ControllerOptions::from_config(&config);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Ask { prompt }) => cmd_ask(api, options, &prompt.join(" ")).await,
        Some(Command::Status {
            session_id,
            watch,
            format,
        }) => cmd_status(api, options, SessionId::from(session_id), watch, format).await,
        Some(Command::Repl) | None => cmd_repl(api, options).await,
    }
}

/// Submit one prompt and poll it to a terminal status
async fn cmd_ask(api: Arc<dyn SessionApi>, options: ControllerOptions, prompt: &str) -> Result<()> {
    debug!(prompt_len = prompt.len(), "cmd_ask: called");
    let mut controller = SessionController::new(api, TerminalSurface::stdout(), options);

    let session_id = controller.submit(prompt).await?;
    println!("{} {}", "Session:".dimmed(), session_id.to_string().cyan());

    Ok(controller.run_until_idle().await.into_result()?)
}

/// Interactive loop
async fn cmd_repl(api: Arc<dyn SessionApi>, options: ControllerOptions) -> Result<()> {
    debug!("cmd_repl: called");
    let output = PromptOutput::new();
    let controller = SessionController::new(api, TerminalSurface::new(output.clone()), options);
    Repl::new(controller, output).run().await
}

/// Show (and optionally follow) an existing session
async fn cmd_status(
    api: Arc<dyn SessionApi>,
    options: ControllerOptions,
    session_id: SessionId,
    watch: bool,
    format: OutputFormat,
) -> Result<()> {
    debug!(%session_id, watch, ?format, "cmd_status: called");

    if format == OutputFormat::Json {
        let snapshot = api
            .fetch_status(&session_id)
            .await
            .context(format!("Failed to fetch status of session {}", session_id))?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut controller = SessionController::new(api, TerminalSurface::stdout(), options);
    controller.attach(session_id);

    // First fetch right away rather than one interval in
    let outcome = controller.follow(watch).await;
    debug!(?outcome, "cmd_status: done");
    Ok(outcome.into_result()?)
}
