/*
 * Responsibility
 * - ロール (user / admin) を閉じた enum として定義
 * - 認可ルールは文字列比較ではなく Capability で判定する
 * - 新しいロールを足すときは capabilities() だけを触れば良い
 */
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account role. Ordered by privilege (`User < Admin`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Modify records other than one's own.
    EditOthers,
    /// Change the `role` field of any record (including one's own).
    EditRole,
    /// Remove user records.
    DeleteUsers,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::User, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Role::User => &[],
            Role::Admin => &[
                Capability::EditOthers,
                Capability::EditRole,
                Capability::DeleteUsers,
            ],
        }
    }

    /// Every role that holds `capability`, in privilege order.
    pub fn holding(capability: Capability) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| role.has(capability))
            .collect()
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn can_edit_others(&self) -> bool {
        self.has(Capability::EditOthers)
    }

    pub fn can_edit_role(&self) -> bool {
        self.has(Capability::EditRole)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // 大文字小文字は区別する (DB/JWT 上の表記と一致させる)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

// sqlx の `#[sqlx(try_from = "String")]` 用
impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
