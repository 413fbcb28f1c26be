//! Demonstration routes, one per failure shape the middleware distinguishes.

use anyhow::Context as _;
use axum::routing::get;
use axum::{Json, Router};
use problemkit::errors::{ErrDef, Failure, service};
use problemkit::ApiResult;
use serde_json::{Value, json};

pub const WIDGET_NOT_FOUND: ErrDef = ErrDef {
    status: 404,
    title: "Widget Not Found",
    token: "widget_not_found",
    type_url: "https://errors.problemkit.dev/widget_not_found",
};

async fn health() -> &'static str {
    "ok"
}

async fn widget() -> ApiResult<Json<Value>> {
    Err(WIDGET_NOT_FOUND.error("widget 7 does not exist").into())
}

async fn report() -> ApiResult<Json<Value>> {
    let raw = std::fs::read_to_string("/nonexistent/problemkit/report.csv")
        .context("failed to load report")?;
    Ok(Json(json!({ "bytes": raw.len() })))
}

async fn checkout() -> ApiResult<Json<Value>> {
    let failure = Failure::from(service::internal("payment backend timed out"))
        .context("checkout failed");
    Err(failure.into())
}

/// Router without the problem middleware; the caller installs it.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/demo/widget", get(widget))
        .route("/demo/report", get(report))
        .route("/demo/checkout", get(checkout))
}
