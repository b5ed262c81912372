/*
 * Responsibility
 * - handler が受け取る型付き extractor の公開
 */
pub mod auth_ctx;
pub mod user_id;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use user_id::UserId;
