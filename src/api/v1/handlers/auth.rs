/*
 * Responsibility
 * - /auth/sign-up, /auth/sign-in, /auth/sign-out
 * - 成功時は access token を HttpOnly cookie に載せる (body にも user を返す)
 * - sign-in の失敗理由 (email 不明 / password 不一致) は区別しない
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::IntoResponse,
};

use crate::{
    api::v1::{
        dto::{
            auth::{SignInRequest, SignUpRequest},
            users::{MessageEnvelope, UserEnvelope},
        },
        extractors::AuthCtx,
    },
    config::CookieConfig,
    error::AppError,
    repos::user_repo::{NewUser, UserRow},
    services::authz::Role,
    state::AppState,
};

const INVALID_LOGIN: &str = "Invalid email or password";

pub async fn sign_up(
    State(state): State<AppState>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let signup = req.validate().map_err(AppError::Validation)?;

    let password_hash = state.passwords.hash(signup.password).await?;
    let row = state
        .users
        .create(NewUser {
            name: signup.name,
            email: signup.email,
            password_hash,
            role: Role::User,
        })
        .await?;

    tracing::info!(user_id = row.id, "user registered");

    let cookie = issue_cookie(&state, &row)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(UserEnvelope {
            message: "User registered",
            user: row.into(),
        }),
    ))
}

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload?;
    let signin = req.validate().map_err(AppError::Validation)?;

    // email 不明でも argon2 を 1 回回す (応答時間で登録有無が分からないように)
    let Some(row) = state.users.find_by_email(&signin.email).await? else {
        state.passwords.verify_absent(signin.password).await?;
        tracing::info!("sign-in failed: unknown email");
        return Err(AppError::Unauthorized(INVALID_LOGIN));
    };

    if !state
        .passwords
        .verify(signin.password, row.password_hash.clone())
        .await?
    {
        tracing::info!(user_id = row.id, "sign-in failed: wrong password");
        return Err(AppError::Unauthorized(INVALID_LOGIN));
    }

    tracing::info!(user_id = row.id, "user signed in");

    let cookie = issue_cookie(&state, &row)?;
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(UserEnvelope {
            message: "User signed in successfully",
            user: row.into(),
        }),
    ))
}

pub async fn sign_out(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let cookie = HeaderValue::from_str(&clear_cookie(&state.cookie)).map_err(|_| AppError::Internal)?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageEnvelope {
            message: "User signed out successfully",
        }),
    ))
}

fn issue_cookie(state: &AppState, row: &UserRow) -> Result<HeaderValue, AppError> {
    let identity = AuthCtx {
        email: Some(row.email.clone()),
        ..AuthCtx::new(row.id, row.role)
    };
    let token = state.tokens.sign(&identity)?;

    HeaderValue::from_str(&auth_cookie(&state.cookie, &token)).map_err(|_| AppError::Internal)
}

fn auth_cookie(config: &CookieConfig, token: &str) -> String {
    cookie_string(config, token, config.max_age_seconds)
}

fn clear_cookie(config: &CookieConfig) -> String {
    cookie_string(config, "", 0)
}

fn cookie_string(config: &CookieConfig, value: &str, max_age: u64) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}",
        config.name, value, max_age
    );
    if config.secure {
        cookie.push_str("; Secure");
    }
    cookie
}
