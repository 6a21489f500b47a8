//! Terminal dashboard and administrative CLI for the HealthTrack platform.

use std::process;
use std::time::Duration;

use anyhow::anyhow;
use clap::Parser;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use uuid::Uuid;

mod cli;
mod client;
mod commands;
mod output;

use cli::{Cli, Command, ServiceCommand, command_label};
use client::{AppContext, CliError, CliResult, HEADER_REQUEST_ID, TelemetryEmitter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);
    let trace_id = Uuid::new_v4().to_string();
    let telemetry = TelemetryEmitter::from_env();

    let result = run(cli, &trace_id).await;

    let (exit_code, message, outcome) = match result {
        Ok(()) => (0, None, "success"),
        Err(err) => {
            let exit_code = err.exit_code();
            let message = err.display_message();
            eprintln!("error: {message}");
            (exit_code, Some(message), "error")
        }
    };

    if let Some(emitter) = &telemetry {
        emitter
            .emit(
                &trace_id,
                command_name,
                outcome,
                exit_code,
                message.as_deref(),
            )
            .await;
    }

    if exit_code != 0 {
        process::exit(exit_code);
    }
}

async fn run(cli: Cli, trace_id: &str) -> CliResult<()> {
    let mut default_headers = HeaderMap::new();
    let request_id = HeaderValue::from_str(trace_id)
        .map_err(|_| CliError::failure(anyhow!("trace identifier contains invalid characters")))?;
    default_headers.insert(HEADER_REQUEST_ID, request_id);

    let client = Client::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .default_headers(default_headers)
        .build()
        .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

    let ctx = AppContext {
        client,
        base_url: cli.api_url,
    };

    match cli.command {
        Command::Dashboard(args) => commands::dashboard::handle_dashboard(&ctx, args).await,
        Command::Ls(args) => commands::services::handle_list(&ctx, args).await,
        Command::Service(service) => match service {
            ServiceCommand::Add(args) => commands::services::handle_add(&ctx, args).await,
            ServiceCommand::Remove(args) => commands::services::handle_remove(&ctx, args).await,
        },
        Command::Checks(args) => commands::services::handle_checks(&ctx, args).await,
        Command::Overview(args) => commands::services::handle_overview(&ctx, args).await,
        Command::Tail(args) => commands::tail::handle_tail(&ctx, args).await,
    }
}
