use crate::{error::AppError, AppState};
use axum::{
    extract::State,
    http::{header, Uri},
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;

const LOGIN_PAGE: &str = include_str!("login.html");
const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub payload_count: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        payload_count: state.evaluator.directory().payload_count(),
    })
}

/// 演示用登录表单，提交到 POST /login
pub async fn index() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let text = state
        .metrics
        .render()
        .map_err(|e| AppError::internal_with_context("指标渲染失败", &e))?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], text))
}

pub async fn not_found(uri: Uri) -> AppError {
    tracing::debug!("未知路径: {}", uri.path());
    AppError::NotFound(uri.path().to_string())
}
