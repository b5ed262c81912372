/*
 * Responsibility
 * - 「自分自身 or admin のみ更新可」「role 変更は admin のみ」の判定
 * - IO なし・状態なしの純粋関数 (caller, target, changes) -> Decision
 * - ルールは上から順に評価し、最初に失敗したルールの理由を返す
 */
use serde::Serialize;

use crate::api::v1::extractors::AuthCtx;
use crate::services::authz::Role;

/// Why an update was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    ForbiddenNotSelfOrAdmin,
    ForbiddenRoleChangeNotAdmin,
}

impl DenyReason {
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::ForbiddenNotSelfOrAdmin => "forbidden_not_self_or_admin",
            DenyReason::ForbiddenRoleChangeNotAdmin => "forbidden_role_change_not_admin",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::ForbiddenNotSelfOrAdmin => "You can only update your own profile",
            DenyReason::ForbiddenRoleChangeNotAdmin => "Only admins can change user roles",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// The part of an update request the policy cares about.
pub trait ChangeSet {
    fn role(&self) -> Option<Role>;
}

pub fn check_update_permission(
    caller: &AuthCtx,
    target_id: i64,
    changes: &impl ChangeSet,
) -> Decision {
    if !caller.is_self(target_id) && !caller.role.can_edit_others() {
        return Decision::Deny(DenyReason::ForbiddenNotSelfOrAdmin);
    }

    if changes.role().is_some() && !caller.role.can_edit_role() {
        return Decision::Deny(DenyReason::ForbiddenRoleChangeNotAdmin);
    }

    Decision::Allow
}
