use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::api::v1::extractors::AuthCtx;
use crate::services::authz::Role;

/// Errors returned by token signing / verification.
///
/// The variant is for logs only. On verification the HTTP boundary maps every
/// variant to the same 401 so callers cannot tell a bad signature from an expired token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid 'sub' (expected positive integer)")]
    InvalidSub,
    #[error("signing secret must not be empty")]
    EmptySecret,
    #[error("token ttl out of range")]
    InvalidTtl,
}

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub iat: i64,
    pub exp: i64,
    #[serde(default)]
    pub jti: Option<String>,
}

/// HS256 signer/verifier for access tokens.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl_seconds: u64, leeway_seconds: u64) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let ttl_seconds = i64::try_from(ttl_seconds).map_err(|_| TokenError::InvalidTtl)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = leeway_seconds;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    /// Sign a fresh token for `identity`, valid for `ttl_seconds` from now.
    ///
    /// `identity.issued_at` / `expires_at` are ignored; the codec stamps its own.
    pub fn sign(&self, identity: &AuthCtx) -> Result<String, TokenError> {
        self.sign_at(identity, Utc::now().timestamp())
    }

    pub fn sign_at(&self, identity: &AuthCtx, now: i64) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: identity.user_id.to_string(),
            role: identity.role,
            email: identity.email.clone(),
            iat: now,
            exp: now
                .checked_add(self.ttl_seconds)
                .ok_or(TokenError::InvalidTtl)?,
            jti: Some(Uuid::new_v4().to_string()),
        };

        self.encode(&claims)
    }

    fn encode(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        Ok(jsonwebtoken::encode(&header, claims, &self.encoding_key)?)
    }

    /// Verify signature + expiry and convert the claims into an `AuthCtx`.
    pub fn verify(&self, token: &str) -> Result<AuthCtx, TokenError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        // Project convention: subject is users.id
        let user_id = claims
            .sub
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or(TokenError::InvalidSub)?;

        Ok(AuthCtx {
            user_id,
            role: claims.role,
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }
}
