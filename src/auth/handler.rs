use super::evaluator::{CredentialSubmission, LoginOutcome};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

impl IntoResponse for LoginOutcome {
    fn into_response(self) -> Response {
        let body = Json(LoginResponse {
            success: false,
            message: self.message(),
        });
        (self.status(), body).into_response()
    }
}

/// 宽松解析：缺失或非字符串字段视为空字符串，无法解析的请求体视为空提交
pub fn parse_submission(body: &[u8]) -> CredentialSubmission {
    let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let field = |name: &str| {
        value
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    CredentialSubmission {
        username: field("username"),
        password: field("password"),
    }
}

pub async fn login(State(state): State<AppState>, body: Bytes) -> LoginOutcome {
    let status = state.lockout.register_attempt().await;
    let submission = parse_submission(&body);

    let outcome = state.evaluator.evaluate(&submission, status.locked_out);
    state.metrics.record_login(outcome.label(), status.recent_attempts);

    if status.locked_out {
        state.metrics.lockout_rejections.inc();
        tracing::warn!(
            username = %submission.username,
            recent_attempts = status.recent_attempts,
            "登录尝试过多，拒绝请求"
        );
    } else {
        tracing::info!(
            username = %submission.username,
            outcome = outcome.label(),
            status = outcome.status().as_u16(),
            "登录请求"
        );
    }

    outcome
}
