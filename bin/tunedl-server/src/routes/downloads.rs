//! Download submission, status polling and maintenance endpoints.
//!
//! Submissions return immediately with a job ID; the job itself runs in the
//! background and is only observable through `/status/{id}` and `/downloads`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tracing::{debug, info};
use tunedl_core::{DownloadList, JobDetail, clear_jobs};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::downloads::{ClearRequest, ClearResponse, DownloadAccepted, DownloadRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(start_download, get_status, list_downloads, clear_downloads),
    components(schemas(DownloadRequest, DownloadAccepted, ClearRequest, ClearResponse))
)]
pub struct DownloadsApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/download", post(start_download))
        .route("/status/{id}", get(get_status))
        .route("/downloads", get(list_downloads))
        .route("/downloads/clear", post(clear_downloads))
}

#[utoipa::path(
    post,
    path = "/download",
    tag = "downloads",
    request_body = DownloadRequest,
    responses(
        (status = 202, description = "Download job accepted", body = DownloadAccepted),
        (status = 400, description = "No URL provided"),
        (status = 500, description = "Output directory unavailable"),
    )
)]
pub async fn start_download(
    State(state): State<Arc<AppState>>,
    body: Result<Json<DownloadRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DownloadAccepted>), ServerError> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable download request");
            DownloadRequest::default()
        }
    };

    let submission = state
        .dispatcher
        .submit(req.url.as_deref(), req.quality.as_deref())
        .await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DownloadAccepted {
            success: true,
            message: "Download started".to_owned(),
            download_id: submission.download_id,
            status_url: submission.status_url,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/status/{id}",
    tag = "downloads",
    params(
        ("id" = String, Path, description = "ID returned by POST /download")
    ),
    responses(
        (status = 200, description = "Current job record", body = Value),
        (status = 404, description = "Download ID not found"),
    )
)]
pub async fn get_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<JobDetail>, ServerError> {
    Ok(Json(state.reporter.get_one(&id).await?))
}

#[utoipa::path(
    get,
    path = "/downloads",
    tag = "downloads",
    responses(
        (status = 200, description = "All jobs, newest first, with per-status counts", body = Value),
    )
)]
pub async fn list_downloads(State(state): State<Arc<AppState>>) -> Json<DownloadList> {
    Json(state.reporter.list_all().await)
}

#[utoipa::path(
    post,
    path = "/downloads/clear",
    tag = "downloads",
    request_body = ClearRequest,
    responses(
        (status = 200, description = "Jobs removed", body = ClearResponse),
    )
)]
pub async fn clear_downloads(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ClearRequest>, JsonRejection>,
) -> Json<ClearResponse> {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!(error = %rejection, "unreadable clear request; clearing finished jobs only");
            ClearRequest::default()
        }
    };
    let outcome = clear_jobs(state.registry(), req.clear_all).await;
    info!(clear_all = req.clear_all, cleared = outcome.cleared_count, "downloads cleared");

    Json(ClearResponse {
        success: true,
        message: outcome.message(),
        cleared_count: outcome.cleared_count,
        remaining: outcome.remaining,
    })
}
