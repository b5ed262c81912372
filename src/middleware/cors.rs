//! CORS policy for browser clients.
//!
//! The access token can travel in an HttpOnly cookie, so browser callers on
//! another origin need `credentials: "include"`.
//!
//! Policy:
//! - Development: permissive (Allow-Origin: *), WITHOUT credentials.
//!   Cookie auth from a different dev origin is not supported; use the bearer header.
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`, WITH credentials.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 10);

/// Apply CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(config.app_env.is_production(), &config.cors_allowed_origins))
}

fn layer(production: bool, allowed_origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(PREFLIGHT_MAX_AGE);

    if !production {
        return base.allow_origin(Any);
    }

    // An empty allowlist allows no origin at all (no CORS headers).
    let allowed: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    base.allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}
