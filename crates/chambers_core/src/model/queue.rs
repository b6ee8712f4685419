//! Persisted reminder queue rows.
//!
//! # Responsibility
//! - Model one pending reminder keyed to (source entity, tier, recipient).
//!
//! # Invariants
//! - At most one `Pending` row exists per (source, tier, recipient); the
//!   schema enforces this with a partial unique index, making enqueue
//!   idempotent.
//! - `Sent` is terminal; a sent row is never re-delivered.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::member::UserId;
use crate::model::notification::NotificationPriority;

/// Named offset from a court event date. Controls message wording and
/// priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourtTier {
    SevenDay,
    ThreeDay,
    OneDay,
    DayOf,
}

impl CourtTier {
    /// The full ladder scheduled for every appearance, farthest first.
    pub const LADDER: [CourtTier; 4] = [
        CourtTier::SevenDay,
        CourtTier::ThreeDay,
        CourtTier::OneDay,
        CourtTier::DayOf,
    ];

    /// Days before the event this tier fires.
    pub fn offset_days(self) -> i64 {
        match self {
            Self::SevenDay => 7,
            Self::ThreeDay => 3,
            Self::OneDay => 1,
            Self::DayOf => 0,
        }
    }

    pub fn priority(self) -> NotificationPriority {
        match self {
            Self::SevenDay => NotificationPriority::Normal,
            Self::ThreeDay | Self::OneDay => NotificationPriority::High,
            Self::DayOf => NotificationPriority::Critical,
        }
    }
}

/// Kind of entity a queue row points back at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderSourceKind {
    CourtDate,
}

/// Queue row lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Pending,
    Sent,
}

/// One pending reminder in the persisted queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
    pub id: Uuid,
    pub source_kind: ReminderSourceKind,
    pub source_id: Uuid,
    pub tier: CourtTier,
    pub recipient_id: UserId,
    /// Instant this row becomes due, epoch ms.
    pub scheduled_for: i64,
    pub status: QueueStatus,
    /// Set exactly once, by the conditional sent-mark.
    pub sent_at: Option<i64>,
    pub created_at: i64,
}

impl ScheduledNotification {
    /// Creates a pending row for one court-date tier and recipient.
    pub fn for_court_date(
        court_date_id: Uuid,
        tier: CourtTier,
        recipient_id: UserId,
        scheduled_for: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_kind: ReminderSourceKind::CourtDate,
            source_id: court_date_id,
            tier,
            recipient_id,
            scheduled_for,
            status: QueueStatus::Pending,
            sent_at: None,
            created_at,
        }
    }
}

pub(crate) fn court_tier_to_db(tier: CourtTier) -> &'static str {
    match tier {
        CourtTier::SevenDay => "court_7_day",
        CourtTier::ThreeDay => "court_3_day",
        CourtTier::OneDay => "court_1_day",
        CourtTier::DayOf => "court_day_of",
    }
}

pub(crate) fn parse_court_tier(value: &str) -> Option<CourtTier> {
    match value {
        "court_7_day" => Some(CourtTier::SevenDay),
        "court_3_day" => Some(CourtTier::ThreeDay),
        "court_1_day" => Some(CourtTier::OneDay),
        "court_day_of" => Some(CourtTier::DayOf),
        _ => None,
    }
}

pub(crate) fn source_kind_to_db(kind: ReminderSourceKind) -> &'static str {
    match kind {
        ReminderSourceKind::CourtDate => "court_date",
    }
}

pub(crate) fn parse_source_kind(value: &str) -> Option<ReminderSourceKind> {
    match value {
        "court_date" => Some(ReminderSourceKind::CourtDate),
        _ => None,
    }
}

pub(crate) fn queue_status_to_db(status: QueueStatus) -> &'static str {
    match status {
        QueueStatus::Pending => "pending",
        QueueStatus::Sent => "sent",
    }
}

pub(crate) fn parse_queue_status(value: &str) -> Option<QueueStatus> {
    match value {
        "pending" => Some(QueueStatus::Pending),
        "sent" => Some(QueueStatus::Sent),
        _ => None,
    }
}
