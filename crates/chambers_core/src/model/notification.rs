//! Delivered in-app notification records.
//!
//! # Responsibility
//! - Model the message rows the fan-out engine materializes.
//!
//! # Invariants
//! - This core only writes the `in_app` channel; email/SMS dispatch is a
//!   separate downstream path.
//! - `Read` is terminal; `read_at` is set at most once.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::member::UserId;

/// Delivery urgency, surfaced by the notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
    Critical,
}

/// What produced the notification. Keyed into the message template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CourtReminder,
    ComplianceReminder,
    ComplianceOverdue,
    ActionRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    Unread,
    Read,
}

/// Kind of entity a notification links back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelatedKind {
    ComplianceTask,
    CourtDate,
}

/// Reference from a notification back to its source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub kind: RelatedKind,
    pub id: Uuid,
}

/// One delivered message for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: UserId,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub kind: NotificationKind,
    pub related: Option<RelatedEntity>,
    pub status: NotificationStatus,
    /// Surfaces this row targets. This core always writes `["in_app"]`.
    pub channels: Vec<String>,
    /// Epoch ms.
    pub created_at: i64,
    pub read_at: Option<i64>,
}

impl Notification {
    /// Creates an unread in-app notification for one recipient.
    pub fn in_app(
        recipient_id: UserId,
        title: impl Into<String>,
        message: impl Into<String>,
        priority: NotificationPriority,
        kind: NotificationKind,
        related: Option<RelatedEntity>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            title: title.into(),
            message: message.into(),
            priority,
            kind,
            related,
            status: NotificationStatus::Unread,
            channels: vec!["in_app".to_string()],
            created_at,
            read_at: None,
        }
    }
}

pub(crate) fn priority_to_db(priority: NotificationPriority) -> &'static str {
    match priority {
        NotificationPriority::Low => "low",
        NotificationPriority::Normal => "normal",
        NotificationPriority::High => "high",
        NotificationPriority::Critical => "critical",
    }
}

pub(crate) fn parse_priority(value: &str) -> Option<NotificationPriority> {
    match value {
        "low" => Some(NotificationPriority::Low),
        "normal" => Some(NotificationPriority::Normal),
        "high" => Some(NotificationPriority::High),
        "critical" => Some(NotificationPriority::Critical),
        _ => None,
    }
}

pub(crate) fn kind_to_db(kind: NotificationKind) -> &'static str {
    match kind {
        NotificationKind::CourtReminder => "court_reminder",
        NotificationKind::ComplianceReminder => "compliance_reminder",
        NotificationKind::ComplianceOverdue => "compliance_overdue",
        NotificationKind::ActionRequired => "action_required",
    }
}

pub(crate) fn parse_kind(value: &str) -> Option<NotificationKind> {
    match value {
        "court_reminder" => Some(NotificationKind::CourtReminder),
        "compliance_reminder" => Some(NotificationKind::ComplianceReminder),
        "compliance_overdue" => Some(NotificationKind::ComplianceOverdue),
        "action_required" => Some(NotificationKind::ActionRequired),
        _ => None,
    }
}

pub(crate) fn notification_status_to_db(status: NotificationStatus) -> &'static str {
    match status {
        NotificationStatus::Unread => "unread",
        NotificationStatus::Read => "read",
    }
}

pub(crate) fn parse_notification_status(value: &str) -> Option<NotificationStatus> {
    match value {
        "unread" => Some(NotificationStatus::Unread),
        "read" => Some(NotificationStatus::Read),
        _ => None,
    }
}

pub(crate) fn related_kind_to_db(kind: RelatedKind) -> &'static str {
    match kind {
        RelatedKind::ComplianceTask => "compliance_task",
        RelatedKind::CourtDate => "court_date",
    }
}

pub(crate) fn parse_related_kind(value: &str) -> Option<RelatedKind> {
    match value {
        "compliance_task" => Some(RelatedKind::ComplianceTask),
        "court_date" => Some(RelatedKind::CourtDate),
        _ => None,
    }
}
