//! Obligation templates and compliance task persistence.
//!
//! # Responsibility
//! - CRUD over `obligations` and `compliance_tasks`.
//! - Provide the joined open-task listing the compliance sweep path
//!   re-evaluates every cycle.
//!
//! # Invariants
//! - Task status transitions to `concluded` are owned by external
//!   acknowledge/comply actions; the sweep never writes task rows.
//! - `create_task` surfaces the one-active-task constraint as a
//!   `RepoError::Db` unique violation; callers that seed use
//!   `active_task_exists` first.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::model::member::WorkspaceId;
use crate::model::obligation::{
    compliance_status_to_db, obligation_tier_to_db, parse_compliance_status,
    parse_obligation_tier, ComplianceTask, Obligation,
};
use crate::repo::{parse_uuid, RepoError, RepoResult};

const OBLIGATION_SELECT_SQL: &str = "SELECT
    id, tier, regulator, action_required, procedure, frequency, due_date_text, jurisdiction
FROM obligations";

/// Persistence contract for obligations and their tracked tasks.
pub trait ComplianceRepository {
    fn create_obligation(&self, obligation: &Obligation) -> RepoResult<Uuid>;
    fn list_obligations(&self) -> RepoResult<Vec<Obligation>>;
    fn create_task(&self, task: &ComplianceTask) -> RepoResult<Uuid>;
    fn active_task_exists(
        &self,
        obligation_id: Uuid,
        workspace_id: WorkspaceId,
    ) -> RepoResult<bool>;
    fn get_task(&self, id: Uuid) -> RepoResult<Option<ComplianceTask>>;
    /// All non-concluded tasks joined with their obligation, the input of
    /// the stateless compliance sweep path.
    fn list_open_tasks(&self) -> RepoResult<Vec<(ComplianceTask, Obligation)>>;
}

/// SQLite-backed compliance repository.
pub struct SqliteComplianceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteComplianceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ComplianceRepository for SqliteComplianceRepository<'_> {
    fn create_obligation(&self, obligation: &Obligation) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO obligations (
                id, tier, regulator, action_required, procedure, frequency,
                due_date_text, jurisdiction
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                obligation.id.to_string(),
                obligation_tier_to_db(obligation.tier),
                obligation.regulator.as_str(),
                obligation.action_required.as_str(),
                obligation.procedure.as_str(),
                obligation.frequency.as_str(),
                obligation.due_date_text.as_str(),
                obligation.jurisdiction.as_str(),
            ],
        )?;
        Ok(obligation.id)
    }

    fn list_obligations(&self) -> RepoResult<Vec<Obligation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OBLIGATION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut obligations = Vec::new();
        while let Some(row) = rows.next()? {
            obligations.push(parse_obligation_row(row)?);
        }
        Ok(obligations)
    }

    fn create_task(&self, task: &ComplianceTask) -> RepoResult<Uuid> {
        self.conn.execute(
            "INSERT INTO compliance_tasks (
                id, obligation_id, workspace_id, status, due_date,
                acknowledged_at, evidence_url, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                task.id.to_string(),
                task.obligation_id.to_string(),
                task.workspace_id.to_string(),
                compliance_status_to_db(task.status),
                task.due_date.map(|date| date.to_string()),
                task.acknowledged_at,
                task.evidence_url.as_deref(),
                task.created_at,
            ],
        )?;
        Ok(task.id)
    }

    fn active_task_exists(
        &self,
        obligation_id: Uuid,
        workspace_id: WorkspaceId,
    ) -> RepoResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM compliance_tasks
             WHERE obligation_id = ?1 AND workspace_id = ?2 AND status != 'concluded';",
            params![obligation_id.to_string(), workspace_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn get_task(&self, id: Uuid) -> RepoResult<Option<ComplianceTask>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, obligation_id, workspace_id, status, due_date,
                    acknowledged_at, evidence_url, created_at
             FROM compliance_tasks WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_open_tasks(&self) -> RepoResult<Vec<(ComplianceTask, Obligation)>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.id, t.obligation_id, t.workspace_id, t.status, t.due_date,
                t.acknowledged_at, t.evidence_url, t.created_at,
                o.id AS o_id, o.tier, o.regulator, o.action_required,
                o.procedure, o.frequency, o.due_date_text, o.jurisdiction
             FROM compliance_tasks t
             JOIN obligations o ON o.id = t.obligation_id
             WHERE t.status != 'concluded'
             ORDER BY t.created_at ASC, t.id ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut open = Vec::new();
        while let Some(row) = rows.next()? {
            open.push((parse_task_row(row)?, parse_obligation_row_aliased(row)?));
        }
        Ok(open)
    }
}

fn parse_obligation_row(row: &Row<'_>) -> RepoResult<Obligation> {
    let id_text: String = row.get("id")?;
    parse_obligation_fields(row, &id_text)
}

fn parse_obligation_row_aliased(row: &Row<'_>) -> RepoResult<Obligation> {
    let id_text: String = row.get("o_id")?;
    parse_obligation_fields(row, &id_text)
}

fn parse_obligation_fields(row: &Row<'_>, id_text: &str) -> RepoResult<Obligation> {
    let tier_text: String = row.get("tier")?;
    let tier = parse_obligation_tier(&tier_text)
        .ok_or_else(|| RepoError::invalid("obligations.tier", &tier_text))?;

    Ok(Obligation {
        id: parse_uuid("obligations.id", id_text)?,
        tier,
        regulator: row.get("regulator")?,
        action_required: row.get("action_required")?,
        procedure: row.get("procedure")?,
        frequency: row.get("frequency")?,
        due_date_text: row.get("due_date_text")?,
        jurisdiction: row.get("jurisdiction")?,
    })
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<ComplianceTask> {
    let id_text: String = row.get("id")?;
    let obligation_text: String = row.get("obligation_id")?;
    let workspace_text: String = row.get("workspace_id")?;

    let status_text: String = row.get("status")?;
    let status = parse_compliance_status(&status_text)
        .ok_or_else(|| RepoError::invalid("compliance_tasks.status", &status_text))?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(text) => Some(
            NaiveDate::parse_from_str(&text, "%Y-%m-%d")
                .map_err(|_| RepoError::invalid("compliance_tasks.due_date", &text))?,
        ),
        None => None,
    };

    Ok(ComplianceTask {
        id: parse_uuid("compliance_tasks.id", &id_text)?,
        obligation_id: parse_uuid("compliance_tasks.obligation_id", &obligation_text)?,
        workspace_id: parse_uuid("compliance_tasks.workspace_id", &workspace_text)?,
        status,
        due_date,
        acknowledged_at: row.get("acknowledged_at")?,
        evidence_url: row.get("evidence_url")?,
        created_at: row.get("created_at")?,
    })
}
