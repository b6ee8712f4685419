//! Workspace and membership records.
//!
//! # Responsibility
//! - Define the read-only directory shapes used by recipient resolution.
//!
//! # Invariants
//! - `Workspace.owner_user_id` is defined independently of membership rows,
//!   so the owner fallback works even when the owner's membership is
//!   inactive.
//! - Only `MembershipStatus::Active` members are eligible recipients.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user account managed outside this core.
pub type UserId = Uuid;

/// Stable identifier for a workspace (one law practice).
pub type WorkspaceId = Uuid;

/// A workspace record. Only the fields this core reads are modeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    /// Fallback recipient when resolution yields nobody.
    pub owner_user_id: UserId,
}

/// Fixed role vocabulary for workspace members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    Owner,
    Partner,
    /// Practising lawyer; "associate" is accepted as a legacy db alias.
    Lawyer,
    Staff,
}

/// Membership lifecycle state. Pending members never receive notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Active,
    Pending,
}

/// One user's membership in one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMember {
    pub workspace_id: WorkspaceId,
    pub user_id: UserId,
    pub role: MemberRole,
    /// Free-text job title, matched by exact string equality.
    pub designation: Option<String>,
    pub status: MembershipStatus,
}

impl WorkspaceMember {
    /// Returns whether this member may receive notifications.
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

pub(crate) fn member_role_to_db(role: MemberRole) -> &'static str {
    match role {
        MemberRole::Owner => "owner",
        MemberRole::Partner => "partner",
        MemberRole::Lawyer => "lawyer",
        MemberRole::Staff => "staff",
    }
}

pub(crate) fn parse_member_role(value: &str) -> Option<MemberRole> {
    match value {
        "owner" => Some(MemberRole::Owner),
        "partner" => Some(MemberRole::Partner),
        "lawyer" | "associate" => Some(MemberRole::Lawyer),
        "staff" => Some(MemberRole::Staff),
        _ => None,
    }
}

pub(crate) fn membership_status_to_db(status: MembershipStatus) -> &'static str {
    match status {
        MembershipStatus::Active => "active",
        MembershipStatus::Pending => "pending",
    }
}

pub(crate) fn parse_membership_status(value: &str) -> Option<MembershipStatus> {
    match value {
        "active" => Some(MembershipStatus::Active),
        "pending" => Some(MembershipStatus::Pending),
        _ => None,
    }
}
