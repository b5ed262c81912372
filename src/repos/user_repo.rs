/*
 * Responsibility
 * - users テーブル向け SQLx 操作
 * - UserRepo trait で抽象化し、AppState には Arc<dyn UserRepo> を載せる (テストでは in-memory 実装)
 * - "not found" は Option / bool で返す。更新・削除は 1 クエリで完結させる (read-then-act をしない)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;
use crate::services::auth::password::PasswordHash;
use crate::services::authz::Role;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: PasswordHash,
    pub role: Role,
}

/// Partial update. `None` = do not touch the column.
///
/// The password can only arrive here already hashed.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub role: Option<Role>,
}

#[async_trait]
pub trait UserRepo: Send + Sync + 'static {
    async fn list(&self) -> RepoResult<Vec<UserRow>>;

    async fn get(&self, user_id: i64) -> RepoResult<Option<UserRow>>;

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>>;

    async fn create(&self, user: NewUser) -> RepoResult<UserRow>;

    // Returns None when no row matched.
    async fn update(&self, user_id: i64, changes: UserUpdate) -> RepoResult<Option<UserRow>>;

    // Returns false when no row matched.
    async fn delete(&self, user_id: i64) -> RepoResult<bool>;
}

#[derive(Clone, Debug)]
pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get(&self, user_id: i64) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, user_id: i64, changes: UserUpdate) -> RepoResult<Option<UserRow>> {
        // COALESCE: NULL のカラムは現在値のまま
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                updated_at = now()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.password_hash.as_ref().map(PasswordHash::as_str))
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete(&self, user_id: i64) -> RepoResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
