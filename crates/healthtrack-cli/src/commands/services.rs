//! Service management and read-only listing commands.

use anyhow::anyhow;
use healthtrack_api_models::{
    CheckListResponse, OverviewResponse, ServiceCreateRequest, ServiceListResponse, ServiceView,
};
use healthtrack_core::model::{DEFAULT_INTERVAL_SECONDS, DEFAULT_TIMEOUT_SECONDS};

use crate::cli::{ChecksArgs, ListArgs, OutputFormat, OverviewArgs, ServiceAddArgs, ServiceRemoveArgs};
use crate::client::{AppContext, CliError, CliResult, classify_problem};
use crate::output::{render_check_table, render_overview, render_service_table};

pub(crate) async fn handle_list(ctx: &AppContext, args: ListArgs) -> CliResult<()> {
    let url = ctx.endpoint("/v1/services")?;
    let response = ctx
        .client
        .get(url)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/services failed: {err}")))?;

    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }

    let listing = response
        .json::<ServiceListResponse>()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to parse service list: {err}")))?;

    match args.format {
        OutputFormat::Json => print_json(&listing.services)?,
        OutputFormat::Table => print!("{}", render_service_table(&listing.services)),
    }
    Ok(())
}

pub(crate) async fn handle_add(ctx: &AppContext, args: ServiceAddArgs) -> CliResult<()> {
    if args.name.trim().is_empty() {
        return Err(CliError::validation("service name must not be empty"));
    }
    if args.url.trim().is_empty() {
        return Err(CliError::validation("service URL must not be empty"));
    }

    let request = ServiceCreateRequest {
        name: args.name.trim().to_string(),
        url: args.url.trim().to_string(),
        interval_seconds: args.interval.unwrap_or(DEFAULT_INTERVAL_SECONDS),
        timeout_seconds: args.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    };

    let url = ctx.endpoint("/v1/services")?;
    let response = ctx
        .client
        .post(url)
        .json(&request)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/services failed: {err}")))?;

    if response.status().is_success() {
        let created = response
            .json::<ServiceView>()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to parse created service: {err}")))?;
        println!("Service registered (id: {})", created.id);
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}

pub(crate) async fn handle_remove(ctx: &AppContext, args: ServiceRemoveArgs) -> CliResult<()> {
    let id = args.id;
    let url = ctx.endpoint(&format!("/v1/services/{id}"))?;
    let response = ctx.client.delete(url).send().await.map_err(|err| {
        CliError::failure(anyhow!("request to /v1/services/{{id}} failed: {err}"))
    })?;

    if response.status().is_success() {
        println!("Service removed (id: {id})");
        Ok(())
    } else {
        Err(classify_problem(response).await)
    }
}

pub(crate) async fn handle_checks(ctx: &AppContext, args: ChecksArgs) -> CliResult<()> {
    let mut url = ctx.endpoint(&format!("/v1/services/{}/checks", args.id))?;
    if let Some(limit) = args.limit {
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
    }

    let response = ctx.client.get(url).send().await.map_err(|err| {
        CliError::failure(anyhow!(
            "request to /v1/services/{{id}}/checks failed: {err}"
        ))
    })?;

    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }

    let history = response
        .json::<CheckListResponse>()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to parse check history: {err}")))?;

    match args.format {
        OutputFormat::Json => print_json(&history.checks)?,
        OutputFormat::Table => print!("{}", render_check_table(&history.checks)),
    }
    Ok(())
}

pub(crate) async fn handle_overview(ctx: &AppContext, args: OverviewArgs) -> CliResult<()> {
    let url = ctx.endpoint("/v1/overview")?;
    let response = ctx
        .client
        .get(url)
        .send()
        .await
        .map_err(|err| CliError::failure(anyhow!("request to /v1/overview failed: {err}")))?;

    if !response.status().is_success() {
        return Err(classify_problem(response).await);
    }

    let overview = response
        .json::<OverviewResponse>()
        .await
        .map_err(|err| CliError::failure(anyhow!("failed to parse overview: {err}")))?;

    match args.format {
        OutputFormat::Json => print_json(&overview)?,
        OutputFormat::Table => print!("{}", render_overview(&overview)),
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use reqwest::Client;
    use serde_json::json;
    use uuid::Uuid;

    fn context_for(server: &MockServer) -> AppContext {
        AppContext {
            client: Client::new(),
            base_url: server.base_url().parse().expect("valid URL"),
        }
    }

    #[tokio::test]
    async fn service_add_posts_the_create_payload() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let mock = server.mock(move |when, then| {
            when.method(POST).path("/v1/services").json_body(json!({
                "name": "gateway",
                "url": "https://gateway.internal/health",
                "interval_seconds": 30,
                "timeout_seconds": 10
            }));
            then.status(201).json_body(json!({
                "id": id,
                "name": "gateway",
                "url": "https://gateway.internal/health",
                "interval_seconds": 30,
                "timeout_seconds": 10,
                "created_at": "2026-08-01T00:00:00Z"
            }));
        });

        let ctx = context_for(&server);
        handle_add(
            &ctx,
            ServiceAddArgs {
                name: "gateway".to_string(),
                url: "https://gateway.internal/health".to_string(),
                interval: Some(30),
                timeout_seconds: None,
            },
        )
        .await
        .expect("service add succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn service_add_rejects_empty_name_locally() {
        let server = MockServer::start_async().await;
        let ctx = context_for(&server);
        let err = handle_add(
            &ctx,
            ServiceAddArgs {
                name: "  ".to_string(),
                url: "https://gateway.internal/health".to_string(),
                interval: None,
                timeout_seconds: None,
            },
        )
        .await
        .expect_err("empty name must fail validation");
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn service_remove_issues_delete_request() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let path = format!("/v1/services/{id}");
        let mock = server.mock(move |when, then| {
            when.method(DELETE).path(path.as_str());
            then.status(204);
        });

        let ctx = context_for(&server);
        handle_remove(&ctx, ServiceRemoveArgs { id })
            .await
            .expect("service remove succeeds");
        mock.assert();
    }

    #[tokio::test]
    async fn unknown_service_removal_reports_failure() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        server.mock(move |when, then| {
            when.method(DELETE).path(format!("/v1/services/{id}"));
            then.status(404).json_body(json!({
                "type": "https://healthtrack.dev/problems/not-found",
                "title": "resource not found",
                "status": 404,
                "detail": "service not found"
            }));
        });

        let ctx = context_for(&server);
        let err = handle_remove(&ctx, ServiceRemoveArgs { id })
            .await
            .expect_err("missing service must fail");
        assert_eq!(err.exit_code(), 3);
    }
}
