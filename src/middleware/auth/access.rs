//! access token 検証 → AuthCtx を extensions に入れる
//!
//! - token は cookie → `Authorization: Bearer` の順に探す (credential.rs)
//! - 署名 / exp の検証は TokenCodec 側
//! - 失敗理由 (署名不正・期限切れ・形式不正) はログにだけ残し、レスポンスは同一の 401
//! - ログに token 本体は出さない

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::middleware::auth::credential;
use crate::services::auth::TokenCodec;
use crate::state::AppState;

pub const MISSING_CREDENTIAL: &str =
    "Authentication required. Provide token via cookie or Authorization header.";
pub const INVALID_CREDENTIAL: &str = "Invalid or expired token";

/// 認証が必要なルート群に middleware を適用する。
///
/// 例：
/// ```ignore
/// let users = middleware::auth::access::apply(users, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // route_layer: マッチしないパスは 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_ctx = authenticate(&state.tokens, &state.cookie.name, req.headers())?;

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(auth_ctx);

    Ok(next.run(req).await)
}

/// Extract + verify. Emits exactly one `authentication attempt` event.
pub fn authenticate(
    codec: &TokenCodec,
    cookie_name: &str,
    headers: &HeaderMap,
) -> Result<AuthCtx, AppError> {
    let has_cookie = credential::cookie_value(headers, cookie_name).is_some();
    let has_auth_header = headers.contains_key(header::AUTHORIZATION);

    let Some(cred) = credential::extract(headers, cookie_name) else {
        tracing::info!(
            has_cookie,
            has_auth_header,
            has_token = false,
            outcome = "missing_credential",
            "authentication attempt"
        );
        return Err(AppError::Unauthorized(MISSING_CREDENTIAL));
    };

    match codec.verify(cred.token) {
        Ok(ctx) => {
            tracing::info!(
                has_cookie,
                has_auth_header,
                has_token = true,
                source = ?cred.source,
                user_id = ctx.user_id,
                issued_at = ctx.issued_at,
                expires_at = ctx.expires_at,
                outcome = "authenticated",
                "authentication attempt"
            );
            Ok(ctx)
        }
        Err(err) => {
            tracing::warn!(
                has_cookie,
                has_auth_header,
                has_token = true,
                source = ?cred.source,
                error = %err,
                outcome = "invalid_credential",
                "authentication attempt"
            );
            Err(AppError::Unauthorized(INVALID_CREDENTIAL))
        }
    }
}
