//! The split command: the one tool whose server side may finish
//! asynchronously. Drives a [`ProgressTracker`] either straight to
//! completion (inline results) or through the polling loop (queued job),
//! rendering progress once a second until a terminal state.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use inkpress_api_models::{SplitOptions, StartOutcome};
use inkpress_client::ToolBackend;
use inkpress_events::OperationState;
use inkpress_ops::{
    DEFAULT_POLL_PERIOD, DownloadLink, ProgressTracker, StatusProbe, TrackerOptions, spawn_poll,
};

use crate::cli::SplitArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::commands::tools::{deliver, load_input};
use crate::output::render_progress;

const RENDER_PERIOD: Duration = Duration::from_secs(1);

pub(crate) async fn handle_split(ctx: &AppContext, args: SplitArgs) -> CliResult<()> {
    let file = load_input(&args.file)?;
    let options = SplitOptions {
        page_ranges: args.ranges,
        every_n_pages: args.every_n_pages,
    };

    let method = args.method.into();
    // Validation failures never start the operation; the tracker stays
    // idle and the message goes straight to the user.
    inkpress_client::validate::ensure_pdf_upload(&file)?;
    inkpress_client::validate::ensure_split_options(method, &options)?;

    let mut tracker = ProgressTracker::new(
        "split",
        TrackerOptions {
            allow_cancel: true,
            allow_retry: true,
            ..TrackerOptions::default()
        },
    )
    .with_bus(ctx.bus.clone());
    tracker
        .attach_input(file.clone())
        .and_then(|()| tracker.submit())
        .map_err(|err| CliError::failure(anyhow!(err)))?;

    let backend: &dyn ToolBackend = &ctx.api;
    let outcome = match backend.split(&file, method, &options).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracker
                .fail(err.to_string())
                .map_err(|fail_err| CliError::failure(anyhow!(fail_err)))?;
            return Err(err.into());
        }
    };

    match outcome {
        StartOutcome::Sync(results) => {
            let links = results
                .iter()
                .map(|result| ctx.api.resolve_split_result(result))
                .collect::<Result<Vec<_>, _>>()?;
            tracker
                .begin_processing()
                .and_then(|()| tracker.complete(links.clone()))
                .map_err(|err| CliError::failure(anyhow!(err)))?;
            deliver(ctx, &links, args.download.as_deref()).await
        }
        StartOutcome::Async { job_id } => {
            if args.no_wait {
                println!("queued job {job_id}");
                return Ok(());
            }
            tracker.assign_job_id(&job_id);

            let tracker = Arc::new(Mutex::new(tracker));
            let probe: Arc<dyn StatusProbe> = Arc::new(ctx.api.clone());
            let handle = spawn_poll(&tracker, probe, job_id, DEFAULT_POLL_PERIOD);
            tracker
                .lock()
                .expect("tracker mutex poisoned")
                .attach_poll(handle);

            let links = watch_until_done(&tracker).await?;
            deliver(ctx, &links, args.download.as_deref()).await
        }
    }
}

/// Render progress once a second until the tracker reaches a terminal
/// state, then return the download links or surface the failure.
async fn watch_until_done(
    tracker: &Arc<Mutex<ProgressTracker>>,
) -> CliResult<Vec<DownloadLink>> {
    let mut ticker = tokio::time::interval(RENDER_PERIOD);
    loop {
        ticker.tick().await;
        let view = tracker.lock().expect("tracker mutex poisoned").view();
        render_progress(&view);
        if view.status.is_terminal() {
            break;
        }
    }

    let guard = tracker.lock().expect("tracker mutex poisoned");
    match guard.status() {
        OperationState::Completed => Ok(guard
            .operation()
            .results()
            .map(<[DownloadLink]>::to_vec)
            .unwrap_or_default()),
        OperationState::Failed => {
            let message = guard
                .operation()
                .error()
                .unwrap_or("operation failed")
                .to_owned();
            Err(CliError::failure(anyhow!(message)))
        }
        other => Err(CliError::failure(anyhow!(
            "operation ended in unexpected state '{}'",
            other.label()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, SplitMethodArg};
    use httpmock::prelude::*;
    use inkpress_client::{ApiClient, SessionStore};
    use inkpress_events::EventBus;
    use reqwest::Url;
    use serde_json::json;
    use std::path::{Path, PathBuf};

    fn context_for(server: &MockServer, dir: &Path) -> AppContext {
        let bus = EventBus::new();
        let session = SessionStore::open(dir.join("session.json"), bus.clone());
        let api = ApiClient::new(
            Url::parse(&server.base_url()).expect("mock URL"),
            session,
        )
        .expect("client");
        AppContext {
            api,
            bus,
            output: OutputFormat::Table,
        }
    }

    fn write_pdf(dir: &Path) -> PathBuf {
        let path = dir.join("book.pdf");
        std::fs::write(&path, b"%PDF-1.7 fixture").expect("write fixture");
        path
    }

    fn split_args(file: PathBuf) -> SplitArgs {
        SplitArgs {
            file,
            method: SplitMethodArg::Range,
            ranges: Some("1-2,3".into()),
            every_n_pages: None,
            no_wait: false,
            download: None,
        }
    }

    #[tokio::test]
    async fn inline_results_complete_without_polling() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/pdf/split");
            then.status(200).json_body(json!({
                "success": true,
                "results": [
                    {
                        "filename": "part-1.pdf",
                        "fileUrl": "/api/file?folder=splits&filename=raw-part-1.pdf",
                        "pageRange": "1-2",
                        "fileSize": 100
                    },
                    {
                        "filename": "part-2.pdf",
                        "fileUrl": "/api/file?folder=splits&filename=raw-part-2.pdf",
                        "pageRange": "3",
                        "fileSize": 80
                    }
                ]
            }));
        });
        let status_mock = server.mock(|when, then| {
            when.method(GET).path("/api/pdf/split/status");
            then.status(200).json_body(json!({"id": "never"}));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        handle_split(&ctx, split_args(write_pdf(dir.path())))
            .await
            .expect("split completes inline");
        status_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn queued_jobs_poll_until_completed() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/pdf/split");
            then.status(200)
                .json_body(json!({ "success": true, "id": "job-7" }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/pdf/split/status")
                .query_param("id", "job-7");
            then.status(200).json_body(json!({
                "id": "job-7",
                "status": "completed",
                "progress": 100,
                "total": 1,
                "completed": 1,
                "results": [{
                    "filename": "part-1.pdf",
                    "fileUrl": "/api/file?folder=splits&filename=raw-part-1.pdf",
                    "pageRange": "1-2,3",
                    "fileSize": 100
                }]
            }));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        handle_split(&ctx, split_args(write_pdf(dir.path())))
            .await
            .expect("queued split completes");
    }

    #[tokio::test]
    async fn no_wait_prints_the_job_id_and_returns() {
        let server = MockServer::start_async().await;
        let status_mock = server.mock(|when, then| {
            when.method(GET).path("/api/pdf/split/status");
            then.status(200).json_body(json!({"id": "job-8"}));
        });
        server.mock(|when, then| {
            when.method(POST).path("/api/pdf/split");
            then.status(200)
                .json_body(json!({ "success": true, "id": "job-8" }));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let mut args = split_args(write_pdf(dir.path()));
        args.no_wait = true;
        handle_split(&ctx, args).await.expect("queued and detached");
        status_mock.assert_calls(0);
    }

    #[tokio::test]
    async fn failed_jobs_surface_the_failure_message() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/pdf/split");
            then.status(200)
                .json_body(json!({ "success": true, "id": "job-9" }));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/pdf/split/status")
                .query_param("id", "job-9");
            then.status(200)
                .json_body(json!({ "id": "job-9", "status": "failed" }));
        });

        let dir = tempfile::tempdir().expect("temp dir");
        let ctx = context_for(&server, dir.path());
        let err = handle_split(&ctx, split_args(write_pdf(dir.path())))
            .await
            .expect_err("failure surfaces");
        assert!(err.display_message().contains("Split operation failed"));
    }
}
