/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / validation error / auth error を統一的に変換
 * - 文字列比較ではなく variant で分岐する (match は網羅的)
 */
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::repos::error::RepoError;
use crate::services::auth::password::PasswordError;
use crate::services::auth::token::TokenError;

/// One field-level validation failure, rendered inside `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed ({} violation(s))", .0.len())]
    Validation(Vec<FieldViolation>),
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("conflict: {0}")]
    Conflict(&'static str),
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub const AUTH_REQUIRED: &'static str = "Authentication required";
    pub const INSUFFICIENT_PERMISSIONS: &'static str = "Insufficient permissions";

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(details) => json!({
                "error": "Validation failed",
                "details": details,
            }),
            AppError::Unauthorized(message) => json!({
                "error": "Unauthorized",
                "message": message,
            }),
            AppError::Forbidden(message) => json!({
                "error": "Forbidden",
                "message": message,
            }),
            AppError::NotFound { resource } => json!({
                "error": format!("{resource} not found"),
            }),
            AppError::Conflict(message) => json!({
                "error": "Conflict",
                "message": message,
            }),
            AppError::Internal => json!({
                "error": "Internal server error",
            }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Conflict => AppError::Conflict("Email already exists"),
            RepoError::Db(err) => {
                tracing::error!(error = ?err, "database error");
                AppError::Internal
            }
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(e: PasswordError) -> Self {
        tracing::error!(error = %e, "password hashing failed");
        AppError::Internal
    }
}

// 署名側の失敗 (sign-in / sign-up)。検証側の失敗は middleware で 401 にする
impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        tracing::error!(error = %e, "token signing failed");
        AppError::Internal
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}
