/*
 * Responsibility
 * - Users の request/response DTO
 * - validate() は形式チェック + 正規化を行い、型付きの値 (UserChanges) か違反一覧を返す
 * - password は response に含めない
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::v1::dto::fields;
use crate::error::FieldViolation;
use crate::repos::user_repo::UserRow;
use crate::services::auth::Password;
use crate::services::authz::{ChangeSet, Role};

/// PUT /users/{id} の body (部分更新)
///
/// role は文字列で受ける: 未知のロールを 422 ではなく 400 の validation error にするため
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Password>,
    pub role: Option<String>,
}

/// Validated, normalised update. Password is still plaintext here.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<Password>,
    pub role: Option<Role>,
}

impl ChangeSet for UserChanges {
    fn role(&self) -> Option<Role> {
        self.role
    }
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserChanges, Vec<FieldViolation>> {
        let mut violations = Vec::new();
        let mut changes = UserChanges::default();

        if self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.role.is_none()
        {
            violations.push(FieldViolation::new(
                "body",
                "at least one field must be provided",
            ));
        }

        if let Some(name) = &self.name {
            match fields::name(name) {
                Ok(v) => changes.name = Some(v),
                Err(e) => violations.push(e),
            }
        }
        if let Some(email) = &self.email {
            match fields::email(email) {
                Ok(v) => changes.email = Some(v),
                Err(e) => violations.push(e),
            }
        }
        if let Some(password) = self.password {
            match fields::password(&password) {
                Ok(()) => changes.password = Some(password),
                Err(e) => violations.push(e),
            }
        }
        if let Some(role) = &self.role {
            match fields::role(role) {
                Ok(v) => changes.role = Some(v),
                Err(e) => violations.push(e),
            }
        }

        if violations.is_empty() {
            Ok(changes)
        } else {
            Err(violations)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: &'static str,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListEnvelope {
    pub message: &'static str,
    pub users: Vec<UserResponse>,
    pub user_count: usize,
}

#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub message: &'static str,
}
