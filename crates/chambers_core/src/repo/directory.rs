//! Workspace directory collaborator.
//!
//! # Responsibility
//! - Read-only membership queries used by recipient resolution.
//! - Seeding helpers for workspaces and memberships (used by tests and
//!   the surrounding system's provisioning path).
//!
//! # Invariants
//! - The [`Directory`] trait exposes reads only; recipient resolution
//!   never mutates the directory.
//! - `workspace_owner` is defined even when the owner holds no active
//!   membership row.

use rusqlite::{params, Connection, Row};

use crate::model::member::{
    member_role_to_db, membership_status_to_db, parse_member_role, parse_membership_status,
    UserId, Workspace, WorkspaceId, WorkspaceMember,
};
use crate::repo::{parse_uuid, RepoError, RepoResult};

/// Read-only membership directory used by recipient resolution.
pub trait Directory {
    fn members_of(&self, workspace_id: WorkspaceId) -> RepoResult<Vec<WorkspaceMember>>;
    fn workspace_owner(&self, workspace_id: WorkspaceId) -> RepoResult<UserId>;
}

/// SQLite-backed directory over `workspaces` and `workspace_members`.
pub struct SqliteDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts a workspace record.
    pub fn insert_workspace(&self, workspace: &Workspace) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO workspaces (id, name, owner_user_id) VALUES (?1, ?2, ?3);",
            params![
                workspace.id.to_string(),
                workspace.name.as_str(),
                workspace.owner_user_id.to_string(),
            ],
        )?;
        Ok(())
    }

    /// Inserts one membership row.
    pub fn insert_member(&self, member: &WorkspaceMember) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO workspace_members (workspace_id, user_id, role, designation, status)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                member.workspace_id.to_string(),
                member.user_id.to_string(),
                member_role_to_db(member.role),
                member.designation.as_deref(),
                membership_status_to_db(member.status),
            ],
        )?;
        Ok(())
    }
}

impl Directory for SqliteDirectory<'_> {
    fn members_of(&self, workspace_id: WorkspaceId) -> RepoResult<Vec<WorkspaceMember>> {
        let mut stmt = self.conn.prepare(
            "SELECT workspace_id, user_id, role, designation, status
             FROM workspace_members
             WHERE workspace_id = ?1
             ORDER BY user_id ASC;",
        )?;

        let mut rows = stmt.query(params![workspace_id.to_string()])?;
        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn workspace_owner(&self, workspace_id: WorkspaceId) -> RepoResult<UserId> {
        let mut stmt = self
            .conn
            .prepare("SELECT owner_user_id FROM workspaces WHERE id = ?1;")?;
        let mut rows = stmt.query(params![workspace_id.to_string()])?;

        match rows.next()? {
            Some(row) => {
                let owner_text: String = row.get(0)?;
                parse_uuid("workspaces.owner_user_id", &owner_text)
            }
            None => Err(RepoError::NotFound {
                entity: "workspace",
                id: workspace_id,
            }),
        }
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<WorkspaceMember> {
    let workspace_text: String = row.get("workspace_id")?;
    let user_text: String = row.get("user_id")?;

    let role_text: String = row.get("role")?;
    let role = parse_member_role(&role_text)
        .ok_or_else(|| RepoError::invalid("workspace_members.role", &role_text))?;

    let status_text: String = row.get("status")?;
    let status = parse_membership_status(&status_text)
        .ok_or_else(|| RepoError::invalid("workspace_members.status", &status_text))?;

    Ok(WorkspaceMember {
        workspace_id: parse_uuid("workspace_members.workspace_id", &workspace_text)?,
        user_id: parse_uuid("workspace_members.user_id", &user_text)?,
        role,
        designation: row.get("designation")?,
        status,
    })
}
