/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - users: Arc<dyn UserRepo>, tokens: TokenCodec, passwords: PasswordHasher, cookie 設定
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 * - グローバル変数は持たない。依存はすべて app.rs で組み立ててここから注入する
 */
use std::fmt;
use std::sync::Arc;

use crate::config::CookieConfig;
use crate::repos::UserRepo;
use crate::services::auth::{PasswordHasher, TokenCodec};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepo>,
    pub tokens: Arc<TokenCodec>,
    pub passwords: Arc<PasswordHasher>,
    pub cookie: Arc<CookieConfig>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepo>,
        tokens: Arc<TokenCodec>,
        passwords: Arc<PasswordHasher>,
        cookie: CookieConfig,
    ) -> Self {
        Self {
            users,
            tokens,
            passwords,
            cookie: Arc::new(cookie),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("tokens", &self.tokens)
            .field("passwords", &self.passwords)
            .field("cookie", &self.cookie)
            .finish_non_exhaustive()
    }
}
