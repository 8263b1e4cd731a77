//! Asset API handlers.
//!
//! Each handler maps one HTTP request to exactly one contract call, then
//! logs and records the outcome under its operation name.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::time::Instant;

use crate::bridge::{CreateAssetRequest, MessageResponse, ASSET_CREATED};
use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// `POST /assets`
pub async fn create_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateAssetRequest>, JsonRejection>,
) -> Response {
    let start = Instant::now();
    let result = async {
        let Json(request) = payload?;
        request.validate().map_err(ApiError::bad_request)?;
        state
            .bridge
            .create_asset(&request.id, &request.value.to_argument())
            .await?;
        let body = MessageResponse {
            message: ASSET_CREATED.to_string(),
        };
        Ok::<_, ApiError>((StatusCode::CREATED, Json(body)).into_response())
    }
    .await;

    finish("create_asset", request_id(&headers), start, result)
}

/// `GET /assets/{id}`
pub async fn read_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let start = Instant::now();
    let result = state
        .bridge
        .read_asset(&id)
        .await
        .map(raw_text)
        .map_err(ApiError::from);

    finish("read_asset", request_id(&headers), start, result)
}

/// `GET /assets`
pub async fn list_assets(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let start = Instant::now();
    let result = state
        .bridge
        .list_assets()
        .await
        .map(raw_text)
        .map_err(ApiError::from);

    finish("list_assets", request_id(&headers), start, result)
}

/// `GET /health`. Liveness only; the ledger is not contacted.
pub async fn health() -> Response {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
    .into_response()
}

fn raw_text(payload: Vec<u8>) -> Response {
    let text = match String::from_utf8(payload) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    (StatusCode::OK, text).into_response()
}

fn finish(
    operation: &'static str,
    request_id: &str,
    start: Instant,
    result: Result<Response, ApiError>,
) -> Response {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ApiError::Rejected { status, message } => tracing::warn!(
                    request_id = %request_id,
                    operation,
                    status = status.as_u16(),
                    error = %message,
                    "Request rejected"
                ),
                ApiError::Ledger(err) => tracing::error!(
                    request_id = %request_id,
                    operation,
                    error = %err,
                    "Ledger operation failed"
                ),
            }
            e.into_response()
        }
    };

    let status = response.status();
    tracing::debug!(
        request_id = %request_id,
        operation,
        status = status.as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );
    metrics::record_request(operation, status.as_u16(), start);
    response
}
