/// Factory: build auth services from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::{PasswordHasher, TokenCodec, TokenError};

pub fn build_token_codec(config: &Config) -> Result<Arc<TokenCodec>, TokenError> {
    let codec = TokenCodec::new(
        config.jwt_secret.as_bytes(),
        config.jwt_ttl_seconds,
        config.jwt_leeway_seconds,
    )?;

    Ok(Arc::new(codec))
}

pub fn build_password_hasher() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::new())
}
