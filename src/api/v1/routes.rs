/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /auth/... は公開、/users 系は access middleware (route_layer) の内側
 * - DELETE だけ role gate (DeleteUsers を持つロール) を追加で掛ける
 * - PUT の認可 (本人 or admin / role 変更は admin) は handler 内の policy で判定
 */
use axum::{
    Router,
    handler::Handler,
    middleware::from_fn,
    routing::{get, post},
};

use crate::services::authz::{Capability, Role};
use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{sign_in, sign_out, sign_up},
    health::health,
    users::{delete_user, get_user, list_users, update_user},
};
use crate::middleware::auth::{access, require_roles};

pub fn routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out));

    let delete_gate = from_fn(require_roles(Role::holding(Capability::DeleteUsers)));

    let users = Router::new().route("/users", get(list_users)).route(
        "/users/{user_id}",
        get(get_user)
            .put(update_user)
            .delete(delete_user.layer(delete_gate)),
    );

    public.merge(access::apply(users, state))
}
