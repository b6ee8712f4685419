//! Reminder queue persistence.
//!
//! # Responsibility
//! - Enqueue, scan and claim `scheduled_notifications` rows.
//!
//! # Invariants
//! - `enqueue` is idempotent: a duplicate pending (source, tier,
//!   recipient) insert is absorbed by the partial unique index.
//! - `mark_sent` is an atomic conditional update; exactly one caller can
//!   ever observe `true` for a given row, which makes overlapping sweeps
//!   safe to run.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::model::queue::{
    court_tier_to_db, parse_court_tier, parse_queue_status, parse_source_kind,
    queue_status_to_db, source_kind_to_db, ScheduledNotification,
};
use crate::repo::{parse_uuid, RepoError, RepoResult};

const QUEUE_SELECT_SQL: &str = "SELECT
    id, source_type, source_id, tier, recipient_id, scheduled_for, status, sent_at, created_at
FROM scheduled_notifications";

/// Persistence contract for the queue-based reminder path.
pub trait ReminderQueue {
    /// Inserts a pending row. Returns `false` when an equivalent pending
    /// row already exists.
    fn enqueue(&self, row: &ScheduledNotification) -> RepoResult<bool>;

    /// Pending rows with `scheduled_for <= now_ms`, oldest first, capped
    /// at `limit`.
    fn due_batch(&self, now_ms: i64, limit: u32) -> RepoResult<Vec<ScheduledNotification>>;

    /// Flips one pending row to sent. Returns `false` when the row was
    /// already claimed (or does not exist).
    fn mark_sent(&self, id: Uuid, sent_at_ms: i64) -> RepoResult<bool>;

    fn get(&self, id: Uuid) -> RepoResult<Option<ScheduledNotification>>;
}

/// SQLite-backed reminder queue.
pub struct SqliteReminderQueue<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteReminderQueue<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ReminderQueue for SqliteReminderQueue<'_> {
    fn enqueue(&self, row: &ScheduledNotification) -> RepoResult<bool> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO scheduled_notifications (
                id, source_type, source_id, tier, recipient_id,
                scheduled_for, status, sent_at, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                row.id.to_string(),
                source_kind_to_db(row.source_kind),
                row.source_id.to_string(),
                court_tier_to_db(row.tier),
                row.recipient_id.to_string(),
                row.scheduled_for,
                queue_status_to_db(row.status),
                row.sent_at,
                row.created_at,
            ],
        )?;
        Ok(inserted > 0)
    }

    fn due_batch(&self, now_ms: i64, limit: u32) -> RepoResult<Vec<ScheduledNotification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{QUEUE_SELECT_SQL}
             WHERE status = 'pending' AND scheduled_for <= ?1
             ORDER BY scheduled_for ASC, id ASC
             LIMIT ?2;"
        ))?;

        let mut rows = stmt.query(params![now_ms, i64::from(limit)])?;
        let mut due = Vec::new();
        while let Some(row) = rows.next()? {
            due.push(parse_queue_row(row)?);
        }
        Ok(due)
    }

    fn mark_sent(&self, id: Uuid, sent_at_ms: i64) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE scheduled_notifications
             SET status = 'sent', sent_at = ?2
             WHERE id = ?1 AND status = 'pending';",
            params![id.to_string(), sent_at_ms],
        )?;
        Ok(changed > 0)
    }

    fn get(&self, id: Uuid) -> RepoResult<Option<ScheduledNotification>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{QUEUE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_queue_row(row)?)),
            None => Ok(None),
        }
    }
}

fn parse_queue_row(row: &Row<'_>) -> RepoResult<ScheduledNotification> {
    let id_text: String = row.get("id")?;
    let source_text: String = row.get("source_id")?;
    let recipient_text: String = row.get("recipient_id")?;

    let kind_text: String = row.get("source_type")?;
    let source_kind = parse_source_kind(&kind_text)
        .ok_or_else(|| RepoError::invalid("scheduled_notifications.source_type", &kind_text))?;

    let tier_text: String = row.get("tier")?;
    let tier = parse_court_tier(&tier_text)
        .ok_or_else(|| RepoError::invalid("scheduled_notifications.tier", &tier_text))?;

    let status_text: String = row.get("status")?;
    let status = parse_queue_status(&status_text)
        .ok_or_else(|| RepoError::invalid("scheduled_notifications.status", &status_text))?;

    Ok(ScheduledNotification {
        id: parse_uuid("scheduled_notifications.id", &id_text)?,
        source_kind,
        source_id: parse_uuid("scheduled_notifications.source_id", &source_text)?,
        tier,
        recipient_id: parse_uuid("scheduled_notifications.recipient_id", &recipient_text)?,
        scheduled_for: row.get("scheduled_for")?,
        status,
        sent_at: row.get("sent_at")?,
        created_at: row.get("created_at")?,
    })
}
