/*
 * Responsibility
 * - Path の `{user_id}` を文字列で受け、正の整数 (users.id) へ変換する
 * - 失敗時は AppError::Validation (400) にして、repo は呼ばない
 */
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

use crate::error::AppError;

const INVALID_ID: &str = "must be a positive integer";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

pub fn parse_user_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| AppError::validation("id", INVALID_ID))
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::validation("id", INVALID_ID))?;
        parse_user_id(&raw).map(UserId)
    }
}
