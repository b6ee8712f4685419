//! Delivered notification persistence.
//!
//! # Responsibility
//! - Batch-insert notification rows produced by the fan-out engine.
//! - Serve the in-app feed reads and the read transition.
//!
//! # Invariants
//! - `create_batch` is all-or-nothing: one transaction per due item, so a
//!   partial fan-out never becomes visible.
//! - `read_at` is set at most once; repeating `mark_read` is a no-op.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::model::member::UserId;
use crate::model::notification::{
    kind_to_db, notification_status_to_db, parse_kind, parse_notification_status,
    parse_priority, parse_related_kind, priority_to_db, related_kind_to_db, Notification,
    RelatedEntity,
};
use crate::repo::{parse_uuid, RepoError, RepoResult};

const NOTIFICATION_SELECT_SQL: &str = "SELECT
    id, recipient_id, title, message, priority, kind, related_type, related_id,
    status, channels, created_at, read_at
FROM notifications";

/// Persistence contract for the notification sink.
pub trait NotificationRepository {
    /// Inserts all rows in one transaction; returns the created count.
    fn create_batch(&self, notifications: &[Notification]) -> RepoResult<u32>;
    fn list_for_recipient(
        &self,
        recipient_id: UserId,
        include_read: bool,
    ) -> RepoResult<Vec<Notification>>;
    /// Marks a notification read. Terminal: `read_at` keeps its first value.
    fn mark_read(&self, id: Uuid, read_at_ms: i64) -> RepoResult<()>;
}

/// SQLite-backed notification repository.
pub struct SqliteNotificationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NotificationRepository for SqliteNotificationRepository<'_> {
    fn create_batch(&self, notifications: &[Notification]) -> RepoResult<u32> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO notifications (
                    id, recipient_id, title, message, priority, kind,
                    related_type, related_id, status, channels, created_at, read_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12);",
            )?;

            for notification in notifications {
                let channels = serde_json::to_string(&notification.channels).map_err(|err| {
                    RepoError::InvalidData(format!("unserializable channel list: {err}"))
                })?;
                stmt.execute(params![
                    notification.id.to_string(),
                    notification.recipient_id.to_string(),
                    notification.title.as_str(),
                    notification.message.as_str(),
                    priority_to_db(notification.priority),
                    kind_to_db(notification.kind),
                    notification.related.map(|r| related_kind_to_db(r.kind)),
                    notification.related.map(|r| r.id.to_string()),
                    notification_status_to_db(notification.status),
                    channels,
                    notification.created_at,
                    notification.read_at,
                ])?;
            }
        }
        tx.commit()?;

        Ok(notifications.len() as u32)
    }

    fn list_for_recipient(
        &self,
        recipient_id: UserId,
        include_read: bool,
    ) -> RepoResult<Vec<Notification>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTIFICATION_SELECT_SQL}
             WHERE recipient_id = ?1 AND (?2 = 1 OR status = 'unread')
             ORDER BY created_at DESC, id ASC;"
        ))?;

        let include_flag: i64 = if include_read { 1 } else { 0 };
        let mut rows = stmt.query(params![recipient_id.to_string(), include_flag])?;
        let mut notifications = Vec::new();
        while let Some(row) = rows.next()? {
            notifications.push(parse_notification_row(row)?);
        }
        Ok(notifications)
    }

    fn mark_read(&self, id: Uuid, read_at_ms: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notifications
             SET status = 'read', read_at = COALESCE(read_at, ?2)
             WHERE id = ?1;",
            params![id.to_string(), read_at_ms],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "notification",
                id,
            });
        }
        Ok(())
    }
}

fn parse_notification_row(row: &Row<'_>) -> RepoResult<Notification> {
    let id_text: String = row.get("id")?;
    let recipient_text: String = row.get("recipient_id")?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text)
        .ok_or_else(|| RepoError::invalid("notifications.priority", &priority_text))?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_kind(&kind_text)
        .ok_or_else(|| RepoError::invalid("notifications.kind", &kind_text))?;

    let status_text: String = row.get("status")?;
    let status = parse_notification_status(&status_text)
        .ok_or_else(|| RepoError::invalid("notifications.status", &status_text))?;

    let related = match (
        row.get::<_, Option<String>>("related_type")?,
        row.get::<_, Option<String>>("related_id")?,
    ) {
        (Some(kind_text), Some(id_text)) => {
            let related_kind = parse_related_kind(&kind_text)
                .ok_or_else(|| RepoError::invalid("notifications.related_type", &kind_text))?;
            Some(RelatedEntity {
                kind: related_kind,
                id: parse_uuid("notifications.related_id", &id_text)?,
            })
        }
        (None, None) => None,
        _ => {
            return Err(RepoError::InvalidData(
                "notifications.related_type and related_id must be set together".to_string(),
            ));
        }
    };

    let channels_text: String = row.get("channels")?;
    let channels: Vec<String> = serde_json::from_str(&channels_text)
        .map_err(|_| RepoError::invalid("notifications.channels", &channels_text))?;

    Ok(Notification {
        id: parse_uuid("notifications.id", &id_text)?,
        recipient_id: parse_uuid("notifications.recipient_id", &recipient_text)?,
        title: row.get("title")?,
        message: row.get("message")?,
        priority,
        kind,
        related,
        status,
        channels,
        created_at: row.get("created_at")?,
        read_at: row.get("read_at")?,
    })
}
