/*
 * Responsibility
 * - /users 系 handler (list / get / update / delete)
 * - 順序: path id の検証 → body の検証 → 認可 (policy) → password hash → repo
 * - 検証・認可で弾いた場合 repo は呼ばない
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    api::v1::{
        dto::users::{
            MessageEnvelope, UpdateUserRequest, UserEnvelope, UserListEnvelope, UserResponse,
        },
        extractors::{AuthCtxExtractor, UserId},
    },
    error::AppError,
    repos::user_repo::UserUpdate,
    services::authz::{Decision, check_update_permission},
    state::AppState,
};

const USER: &str = "User";

pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserListEnvelope>, AppError> {
    tracing::info!("listing users");

    let users: Vec<UserResponse> = state
        .users
        .list()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListEnvelope {
        message: "Successfully retrieved all users.",
        user_count: users.len(),
        users,
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<UserEnvelope>, AppError> {
    tracing::info!(user_id, "getting user");

    let row = state
        .users
        .get(user_id)
        .await?
        .ok_or(AppError::not_found(USER))?;

    Ok(Json(UserEnvelope {
        message: "Successfully retrieved user.",
        user: row.into(),
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthCtxExtractor(caller): AuthCtxExtractor,
    UserId(user_id): UserId,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<UserEnvelope>, AppError> {
    let Json(req) = payload?;
    let changes = req.validate().map_err(AppError::Validation)?;

    if let Decision::Deny(reason) = check_update_permission(&caller, user_id, &changes) {
        tracing::info!(
            caller_id = caller.user_id,
            target_id = user_id,
            reason = reason.code(),
            "update denied"
        );
        return Err(AppError::Forbidden(reason.message()));
    }

    // plaintext はここで消える (repo には hash しか渡せない)
    let password_hash = match changes.password {
        Some(password) => Some(state.passwords.hash(password).await?),
        None => None,
    };

    let update = UserUpdate {
        name: changes.name,
        email: changes.email,
        password_hash,
        role: changes.role,
    };

    tracing::info!(user_id, caller_id = caller.user_id, "updating user");

    let row = state
        .users
        .update(user_id, update)
        .await?
        .ok_or(AppError::not_found(USER))?;

    Ok(Json(UserEnvelope {
        message: "Successfully updated user.",
        user: row.into(),
    }))
}

pub async fn delete_user(
    State(state): State<AppState>,
    UserId(user_id): UserId,
) -> Result<Json<MessageEnvelope>, AppError> {
    tracing::info!(user_id, "deleting user");

    if !state.users.delete(user_id).await? {
        return Err(AppError::not_found(USER));
    }

    Ok(Json(MessageEnvelope {
        message: "Successfully deleted user.",
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::services::authz::Role;
    use crate::test_support::TestApp;

    #[tokio::test]
    async fn requests_without_credentials_are_rejected() {
        let app = TestApp::new();
        let id = app.repo.seed("Alice", "alice@example.com", Role::User);

        for (method, body) in [
            (Method::GET, None),
            (Method::PUT, Some(json!({"name": "Bob"}))),
            (Method::DELETE, None),
        ] {
            let res = app
                .request(method.clone(), &format!("/api/v1/users/{id}"), None, body)
                .await;
            assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{method}");
            assert_eq!(res.body["error"], "Unauthorized");
        }
        assert_eq!(app.repo.calls(), 0);
    }

    #[tokio::test]
    async fn list_returns_users_and_count_without_passwords() {
        let app = TestApp::new();
        let id = app.repo.seed("Alice", "alice@example.com", Role::User);
        app.repo.seed("Root", "root@example.com", Role::Admin);

        let token = app.token_for(id, Role::User);
        let res = app.get("/api/v1/users", Some(&token)).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["userCount"], 2);
        assert_eq!(res.body["users"][0]["email"], "alice@example.com");
        assert!(res.body["users"][0].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn fetch_with_non_numeric_id_is_a_validation_error() {
        let app = TestApp::new();
        let token = app.token_for(1, Role::Admin);

        let res = app.get("/api/v1/users/abc", Some(&token)).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["error"], "Validation failed");
        assert_eq!(res.body["details"][0]["field"], "id");
        assert_eq!(app.repo.calls(), 0);
    }

    #[tokio::test]
    async fn fetch_missing_user_is_not_found() {
        let app = TestApp::new();
        let token = app.token_for(1, Role::Admin);

        let res = app.get("/api/v1/users/999", Some(&token)).await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn user_updates_own_name_only() {
        let app = TestApp::new();
        let id = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(id, Role::User);

        let res = app
            .put(&format!("/api/v1/users/{id}"), &token, json!({"name": "Bob"}))
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "Successfully updated user.");
        assert_eq!(res.body["user"]["name"], "Bob");
        assert_eq!(res.body["user"]["email"], "alice@example.com");
        assert_eq!(res.body["user"]["role"], "user");
    }

    #[tokio::test]
    async fn user_cannot_update_someone_else() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let other = app.repo.seed("Carol", "carol@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .put(&format!("/api/v1/users/{other}"), &token, json!({"name": "Bob"}))
            .await;

        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(
            res.body,
            json!({"error": "Forbidden", "message": "You can only update your own profile"})
        );
        assert_eq!(app.repo.snapshot(other).unwrap().name, "Carol");
    }

    #[tokio::test]
    async fn user_changing_someone_elses_role_gets_not_self_reason() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let other = app.repo.seed("Carol", "carol@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .put(&format!("/api/v1/users/{other}"), &token, json!({"role": "admin"}))
            .await;

        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["message"], "You can only update your own profile");
    }

    #[tokio::test]
    async fn user_cannot_promote_themselves() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .put(&format!("/api/v1/users/{me}"), &token, json!({"role": "admin"}))
            .await;

        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["message"], "Only admins can change user roles");
        assert_eq!(app.repo.snapshot(me).unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn admin_can_change_anyones_role() {
        let app = TestApp::new();
        let admin = app.repo.seed("Root", "root@example.com", Role::Admin);
        let target = app.repo.seed("Carol", "carol@example.com", Role::User);
        let token = app.token_for(admin, Role::Admin);

        let res = app
            .put(&format!("/api/v1/users/{target}"), &token, json!({"role": "admin"}))
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["user"]["role"], "admin");
        assert_eq!(app.repo.snapshot(target).unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn password_is_stored_hashed() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .put(
                &format!("/api/v1/users/{me}"),
                &token,
                json!({"password": "new-password"}),
            )
            .await;

        assert_eq!(res.status, StatusCode::OK);
        let stored = app.repo.snapshot(me).unwrap().password_hash;
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("new-password"));
        assert!(!res.body.to_string().contains("new-password"));
    }

    #[tokio::test]
    async fn taking_another_users_email_is_a_conflict() {
        let app = TestApp::new();
        app.repo.seed("Alice", "alice@example.com", Role::User);
        let carol = app.repo.seed("Carol", "carol@example.com", Role::User);
        let token = app.token_for(carol, Role::User);

        let res = app
            .put(
                &format!("/api/v1/users/{carol}"),
                &token,
                json!({"email": "alice@example.com"}),
            )
            .await;

        assert_eq!(res.status, StatusCode::CONFLICT);
        assert_eq!(res.body["error"], "Conflict");
        assert_eq!(app.repo.snapshot(carol).unwrap().email, "carol@example.com");

        // 自分の現在の email を送り直すのは衝突ではない
        let res = app
            .put(
                &format!("/api/v1/users/{carol}"),
                &token,
                json!({"email": "carol@example.com"}),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_body_is_rejected_before_authorization() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .put("/api/v1/users/2", &token, json!({"role": "superuser"}))
            .await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body["details"][0]["field"], "role");

        let res = app.put(&format!("/api/v1/users/{me}"), &token, json!({})).await;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_update_of_missing_user_is_not_found() {
        let app = TestApp::new();
        let token = app.token_for(1, Role::Admin);

        let res = app
            .put("/api/v1/users/404", &token, json!({"name": "Ghost"}))
            .await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn delete_requires_admin() {
        let app = TestApp::new();
        let me = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(me, Role::User);

        let res = app
            .request(Method::DELETE, &format!("/api/v1/users/{me}"), Some(&token), None)
            .await;

        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.body["message"], "Insufficient permissions");
        assert!(app.repo.snapshot(me).is_some());
    }

    #[tokio::test]
    async fn admin_deletes_user() {
        let app = TestApp::new();
        let target = app.repo.seed("Carol", "carol@example.com", Role::User);
        let token = app.token_for(1, Role::Admin);

        let res = app
            .request(
                Method::DELETE,
                &format!("/api/v1/users/{target}"),
                Some(&token),
                None,
            )
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "Successfully deleted user.");
        assert!(app.repo.snapshot(target).is_none());
    }

    #[tokio::test]
    async fn delete_of_nonexistent_user_is_not_found() {
        let app = TestApp::new();
        let token = app.token_for(1, Role::Admin);

        let res = app
            .request(Method::DELETE, "/api/v1/users/12345", Some(&token), None)
            .await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.body, json!({"error": "User not found"}));
    }

    #[tokio::test]
    async fn cookie_credential_is_accepted() {
        let app = TestApp::new();
        let id = app.repo.seed("Alice", "alice@example.com", Role::User);
        let token = app.token_for(id, Role::User);

        let res = app
            .request_with_cookie(Method::GET, &format!("/api/v1/users/{id}"), &token)
            .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["user"]["id"], id);
    }
}
