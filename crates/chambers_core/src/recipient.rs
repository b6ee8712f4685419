//! Recipient resolution.
//!
//! # Responsibility
//! - Expand an abstract recipient specification into a deduplicated set
//!   of user IDs against one workspace's directory.
//!
//! # Invariants
//! - Only `active` memberships resolve; pending members never do, even
//!   when named by explicit ID.
//! - Designation matching is exact string equality, by contract.
//! - An empty resolution falls back to the workspace owner alone, so no
//!   event is silently undelivered.

use std::collections::BTreeSet;

use log::debug;

use crate::model::member::{MemberRole, UserId, WorkspaceId, WorkspaceMember};
use crate::repo::directory::Directory;
use crate::repo::RepoResult;

/// Abstract recipient specification. Variants combine with union
/// semantics: a member matching any clause is included once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientSpec {
    /// Every active member of the workspace.
    pub everyone: bool,
    /// Active members holding any of these roles.
    pub roles: Vec<MemberRole>,
    /// Active members whose designation equals one of these exactly.
    pub designations: Vec<String>,
    /// Explicitly named users (still subject to the active filter).
    pub user_ids: Vec<UserId>,
}

impl RecipientSpec {
    pub fn everyone() -> Self {
        Self {
            everyone: true,
            ..Self::default()
        }
    }

    pub fn for_roles(roles: impl Into<Vec<MemberRole>>) -> Self {
        Self {
            roles: roles.into(),
            ..Self::default()
        }
    }

    pub fn for_users(user_ids: impl Into<Vec<UserId>>) -> Self {
        Self {
            user_ids: user_ids.into(),
            ..Self::default()
        }
    }

    pub fn for_designations(designations: impl Into<Vec<String>>) -> Self {
        Self {
            designations: designations.into(),
            ..Self::default()
        }
    }

    fn matches(&self, member: &WorkspaceMember) -> bool {
        if self.everyone {
            return true;
        }
        if self.roles.contains(&member.role) {
            return true;
        }
        if self.user_ids.contains(&member.user_id) {
            return true;
        }
        match &member.designation {
            Some(designation) => self
                .designations
                .iter()
                .any(|wanted| wanted == designation),
            None => false,
        }
    }
}

/// Resolves a spec to a sorted, deduplicated list of user IDs.
///
/// Falls back to the workspace owner when nothing matches.
pub fn resolve(
    directory: &dyn Directory,
    spec: &RecipientSpec,
    workspace_id: WorkspaceId,
) -> RepoResult<Vec<UserId>> {
    let members = directory.members_of(workspace_id)?;

    let resolved: BTreeSet<UserId> = members
        .iter()
        .filter(|member| member.is_active())
        .filter(|member| spec.matches(member))
        .map(|member| member.user_id)
        .collect();

    if resolved.is_empty() {
        let owner = directory.workspace_owner(workspace_id)?;
        debug!(
            "event=recipient_resolve module=recipient status=fallback workspace={workspace_id} owner={owner}"
        );
        return Ok(vec![owner]);
    }

    Ok(resolved.into_iter().collect())
}
