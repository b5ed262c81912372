/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは services::auth::token の責務
 * - ここは「型（契約）」として固定化する
 */
use crate::services::authz::Role;

/// 認証済みのリクエストに付与されるコンテキスト (caller identity)
///
/// - `user_id` は users.id (BIGSERIAL)
/// - `role` は認可判定に使う。細かい判定は services::authz::policy で行う
/// - `issued_at` / `expires_at` は unix 秒。ログ相関用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub user_id: i64,
    pub role: Role,
    pub email: Option<String>,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AuthCtx {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self {
            user_id,
            role,
            email: None,
            issued_at: 0,
            expires_at: 0,
        }
    }

    pub fn is_self(&self, user_id: i64) -> bool {
        self.user_id == user_id
    }
}
