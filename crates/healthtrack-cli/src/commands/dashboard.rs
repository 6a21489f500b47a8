//! The polling dashboard controller.
//!
//! One cycle fetches the service list, then the per-service metrics
//! summaries sequentially. A metrics fetch that fails for one service is
//! recorded as "no data yet" and never aborts the batch; a failed cycle is
//! logged and retried on the next tick. The loop is timer-driven and stops
//! on Ctrl-C.

use std::time::Duration;

use healthtrack_api_models::{MetricsSummaryView, ServiceListResponse, ServiceView};
use serde::Serialize;
use tokio::time::sleep;
use uuid::Uuid;

use crate::cli::{DashboardArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::output::render_dashboard;

/// One service's row in a dashboard cycle; `metrics` is `None` in the
/// "no data" state.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct DashboardEntry {
    pub(crate) service: ServiceView,
    pub(crate) metrics: Option<MetricsSummaryView>,
}

pub(crate) async fn handle_dashboard(ctx: &AppContext, args: DashboardArgs) -> CliResult<()> {
    loop {
        match poll_cycle(ctx).await {
            Ok(entries) => render_cycle(&entries, args.format)?,
            Err(err) => eprintln!("dashboard refresh failed: {}", err.display_message()),
        }

        if args.once {
            return Ok(());
        }

        tokio::select! {
            () = sleep(Duration::from_secs(args.refresh_secs.max(1))) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("dashboard stopped");
                return Ok(());
            }
        }
    }
}

/// Execute one polling cycle: the service list, then each service's metrics
/// in sequence.
pub(crate) async fn poll_cycle(ctx: &AppContext) -> CliResult<Vec<DashboardEntry>> {
    let services = fetch_services(ctx).await?;

    let mut entries = Vec::with_capacity(services.len());
    for service in services {
        let metrics = match fetch_metrics(ctx, service.id).await {
            Ok(metrics) => Some(metrics),
            Err(err) => {
                // The service may simply not have any checks yet.
                tracing::debug!(
                    service_id = %service.id,
                    error = %err.display_message(),
                    "no metrics for service"
                );
                None
            }
        };
        entries.push(DashboardEntry { service, metrics });
    }

    Ok(entries)
}

fn render_cycle(entries: &[DashboardEntry], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let text = serde_json::to_string_pretty(entries)
                .map_err(|err| CliError::failure(anyhow::anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            print!("{}", render_dashboard(entries));
        }
    }
    Ok(())
}

async fn fetch_services(ctx: &AppContext) -> CliResult<Vec<ServiceView>> {
    let url = ctx.endpoint("/v1/services")?;
    let response = ctx.client.get(url).send().await.map_err(|err| {
        CliError::failure(anyhow::anyhow!("request to /v1/services failed: {err}"))
    })?;

    if response.status().is_success() {
        let listing = response
            .json::<ServiceListResponse>()
            .await
            .map_err(|err| {
                CliError::failure(anyhow::anyhow!("failed to parse service list: {err}"))
            })?;
        Ok(listing.services)
    } else {
        Err(classify_problem(response).await)
    }
}

async fn fetch_metrics(ctx: &AppContext, id: Uuid) -> CliResult<MetricsSummaryView> {
    let url = ctx.endpoint(&format!("/v1/services/{id}/metrics"))?;
    let response = ctx.client.get(url).send().await.map_err(|err| {
        CliError::failure(anyhow::anyhow!(
            "request to /v1/services/{{id}}/metrics failed: {err}"
        ))
    })?;

    if response.status().is_success() {
        response.json::<MetricsSummaryView>().await.map_err(|err| {
            CliError::failure(anyhow::anyhow!("failed to parse metrics summary: {err}"))
        })
    } else {
        Err(classify_problem(response).await)
    }
}
