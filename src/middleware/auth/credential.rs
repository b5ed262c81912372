//! Locate the access token in an incoming request.
//!
//! Order:
//! 1. the auth cookie (non-empty value wins)
//! 2. `Authorization: Bearer <token>` (prefix is case-sensitive, single space)
//!
//! When both are present the cookie is used and the header is ignored.

use axum::http::{HeaderMap, header};

pub const BEARER_PREFIX: &str = "Bearer ";

/// Where the credential came from. Logged, never the token itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Header,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential<'a> {
    pub token: &'a str,
    pub source: CredentialSource,
}

pub fn extract<'a>(headers: &'a HeaderMap, cookie_name: &str) -> Option<Credential<'a>> {
    if let Some(token) = cookie_value(headers, cookie_name) {
        return Some(Credential {
            token,
            source: CredentialSource::Cookie,
        });
    }

    bearer_token(headers).map(|token| Credential {
        token,
        source: CredentialSource::Header,
    })
}

/// First non-empty value of cookie `name` across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .filter(|t| !t.is_empty())
}
