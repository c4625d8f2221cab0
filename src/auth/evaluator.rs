use super::directory::AccountDirectory;
use axum::http::StatusCode;
use std::sync::Arc;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSubmission {
    pub username: String,
    pub password: String,
}

/// 登录请求的结果。演示接口没有成功分支。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    LockedOut,
    UnknownUser,
    PasswordInvalid,
    SqlError { username: String },
    SpecialMessage(String),
    Failed,
}

impl LoginOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            LoginOutcome::LockedOut => StatusCode::TOO_MANY_REQUESTS,
            LoginOutcome::UnknownUser | LoginOutcome::PasswordInvalid | LoginOutcome::Failed => {
                StatusCode::UNAUTHORIZED
            }
            LoginOutcome::SqlError { .. } => StatusCode::BAD_REQUEST,
            LoginOutcome::SpecialMessage(_) => StatusCode::FORBIDDEN,
        }
    }

    pub fn message(&self) -> String {
        match self {
            LoginOutcome::LockedOut => "Access denied: too many failed attempts.".to_string(),
            LoginOutcome::UnknownUser | LoginOutcome::Failed => "Login failed.".to_string(),
            LoginOutcome::PasswordInvalid => "Password invalid.".to_string(),
            LoginOutcome::SqlError { username } => {
                format!("SQL syntax error near '{}'; SQLSTATE[42000]", username)
            }
            LoginOutcome::SpecialMessage(message) => message.clone(),
        }
    }

    /// 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            LoginOutcome::LockedOut => "locked_out",
            LoginOutcome::UnknownUser => "unknown_user",
            LoginOutcome::PasswordInvalid => "password_invalid",
            LoginOutcome::SqlError { .. } => "sql_error",
            LoginOutcome::SpecialMessage(_) => "special_message",
            LoginOutcome::Failed => "failed",
        }
    }
}

/// 按固定顺序检查提交的凭据，第一个命中的规则决定响应
pub struct LoginEvaluator {
    directory: Arc<AccountDirectory>,
}

impl LoginEvaluator {
    pub fn new(directory: Arc<AccountDirectory>) -> Self {
        Self { directory }
    }

    pub fn directory(&self) -> &AccountDirectory {
        &self.directory
    }

    pub fn evaluate(&self, submission: &CredentialSubmission, locked_out: bool) -> LoginOutcome {
        if locked_out {
            return LoginOutcome::LockedOut;
        }

        let username = submission.username.as_str();
        if !self.directory.is_known(username) {
            return LoginOutcome::UnknownUser;
        }

        // 先于密码检查泄露用户名有效性
        let lower_username = username.to_lowercase();
        if self.directory.is_password_invalid(&lower_username) {
            return LoginOutcome::PasswordInvalid;
        }

        if username.contains('\'') {
            return LoginOutcome::SqlError {
                username: username.to_string(),
            };
        }

        if submission.password == username {
            if let Some(message) = self.directory.special_message(&lower_username) {
                return LoginOutcome::SpecialMessage(message.to_string());
            }
        }

        LoginOutcome::Failed
    }
}
