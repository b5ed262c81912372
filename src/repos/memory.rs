//! In-memory `UserRepo` used by router-level tests.
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::user_repo::{NewUser, UserRepo, UserRow, UserUpdate};
use crate::services::authz::Role;

#[derive(Debug, Default)]
pub struct InMemoryUserRepo {
    rows: Mutex<Vec<UserRow>>,
    calls: AtomicUsize,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing hashing. Returns the new id.
    pub fn seed(&self, name: &str, email: &str, role: Role) -> i64 {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let now = Utc::now();
        rows.push(UserRow {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role,
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Number of trait calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self, user_id: i64) -> Option<UserRow> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == user_id)
            .cloned()
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn list(&self) -> RepoResult<Vec<UserRow>> {
        self.touch();
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn get(&self, user_id: i64) -> RepoResult<Option<UserRow>> {
        self.touch();
        Ok(self.snapshot(user_id))
    }

    async fn find_by_email(&self, email: &str) -> RepoResult<Option<UserRow>> {
        self.touch();
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> RepoResult<UserRow> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| r.email == user.email) {
            return Err(RepoError::Conflict);
        }
        let now = Utc::now();
        let row = UserRow {
            id: rows.iter().map(|r| r.id).max().unwrap_or(0) + 1,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash.as_str().to_string(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, user_id: i64, changes: UserUpdate) -> RepoResult<Option<UserRow>> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        if !rows.iter().any(|r| r.id == user_id) {
            return Ok(None);
        }
        // UNIQUE(email) と同じ振る舞い
        if let Some(email) = &changes.email {
            if rows.iter().any(|r| r.id != user_id && &r.email == email) {
                return Err(RepoError::Conflict);
            }
        }
        let Some(row) = rows.iter_mut().find(|r| r.id == user_id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            row.name = name;
        }
        if let Some(email) = changes.email {
            row.email = email;
        }
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash.as_str().to_string();
        }
        if let Some(role) = changes.role {
            row.role = role;
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn delete(&self, user_id: i64) -> RepoResult<bool> {
        self.touch();
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.id != user_id);
        Ok(rows.len() != before)
    }
}
