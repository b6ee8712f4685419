//! Delivery fan-out engine.
//!
//! # Responsibility
//! - Turn one due item into rendered notification rows, one per resolved
//!   recipient, written as a single batch.
//!
//! # Invariants
//! - The batch insert is one transaction: a recipient set is delivered
//!   whole or not at all.
//! - The engine never marks queue rows sent; that claim belongs to the
//!   sweep, after this engine's batch write succeeds.

use chrono::{TimeZone, Utc};
use log::info;

use crate::clock::Clock;
use crate::model::court::CourtDate;
use crate::model::member::{MemberRole, UserId, WorkspaceId};
use crate::model::notification::{
    Notification, NotificationKind, NotificationPriority, RelatedEntity, RelatedKind,
};
use crate::model::obligation::{ComplianceTask, ComplianceTier, Obligation};
use crate::model::queue::CourtTier;
use crate::recipient::{self, RecipientSpec};
use crate::repo::directory::Directory;
use crate::repo::notification_repo::NotificationRepository;
use crate::repo::RepoResult;

/// One item the sweep found due, carrying everything rendering needs.
#[derive(Debug, Clone)]
pub enum DueItem {
    /// A claimed-to-be-due queue row for one court appearance tier.
    Court {
        court_date: CourtDate,
        tier: CourtTier,
        recipient_id: UserId,
    },
    /// A compliance task whose tier rules matched this cycle.
    Compliance {
        task: ComplianceTask,
        obligation: Obligation,
        tier: ComplianceTier,
        days_until_due: Option<i64>,
    },
}

impl DueItem {
    fn workspace_id(&self) -> WorkspaceId {
        match self {
            Self::Court { court_date, .. } => court_date.workspace_id,
            Self::Compliance { task, .. } => task.workspace_id,
        }
    }
}

/// Outcome of one fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Notification rows created.
    pub created: u32,
}

struct Rendered {
    title: String,
    message: String,
    priority: NotificationPriority,
    kind: NotificationKind,
    related: RelatedEntity,
}

/// Renders, resolves and writes notifications for due items.
pub struct DeliveryEngine<'a> {
    directory: &'a dyn Directory,
    notifications: &'a dyn NotificationRepository,
    clock: &'a dyn Clock,
}

impl<'a> DeliveryEngine<'a> {
    pub fn new(
        directory: &'a dyn Directory,
        notifications: &'a dyn NotificationRepository,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            directory,
            notifications,
            clock,
        }
    }

    /// Delivers one due item to all resolved recipients.
    pub fn deliver(&self, item: &DueItem) -> RepoResult<DeliveryReceipt> {
        let rendered = render(item);
        let spec = recipient_spec(item);
        let recipients = recipient::resolve(self.directory, &spec, item.workspace_id())?;

        let created_at = self.clock.now_ms();
        let rows: Vec<Notification> = recipients
            .iter()
            .map(|recipient_id| {
                Notification::in_app(
                    *recipient_id,
                    rendered.title.clone(),
                    rendered.message.clone(),
                    rendered.priority,
                    rendered.kind,
                    Some(rendered.related),
                    created_at,
                )
            })
            .collect();

        let created = self.notifications.create_batch(&rows)?;
        info!(
            "event=deliver module=delivery status=ok kind={:?} related={} created={created}",
            rendered.kind, rendered.related.id
        );

        Ok(DeliveryReceipt { created })
    }
}

fn recipient_spec(item: &DueItem) -> RecipientSpec {
    match item {
        DueItem::Court { recipient_id, .. } => RecipientSpec::for_users([*recipient_id]),
        DueItem::Compliance { tier, .. } => match tier {
            // Escalations widen to the whole workspace; routine reminders
            // and the nudge stay with the principals.
            ComplianceTier::Overdue => RecipientSpec::everyone(),
            _ => RecipientSpec::for_roles([MemberRole::Owner, MemberRole::Partner]),
        },
    }
}

fn render(item: &DueItem) -> Rendered {
    match item {
        DueItem::Court {
            court_date, tier, ..
        } => render_court(court_date, *tier),
        DueItem::Compliance {
            task,
            obligation,
            tier,
            days_until_due,
        } => render_compliance(task, obligation, *tier, *days_until_due),
    }
}

fn render_court(court_date: &CourtDate, tier: CourtTier) -> Rendered {
    let when = format_event_date(court_date.event_at);
    let title = match tier {
        CourtTier::SevenDay => format!("Court date in 7 days: {}", court_date.matter),
        CourtTier::ThreeDay => format!("Court date in 3 days: {}", court_date.matter),
        CourtTier::OneDay => format!("Court date tomorrow: {}", court_date.matter),
        CourtTier::DayOf => format!("Court appearance today: {}", court_date.matter),
    };
    let message = format!(
        "You are listed to appear in {} on {when}.",
        court_date.matter
    );

    Rendered {
        title,
        message,
        priority: tier.priority(),
        kind: NotificationKind::CourtReminder,
        related: RelatedEntity {
            kind: RelatedKind::CourtDate,
            id: court_date.id,
        },
    }
}

fn render_compliance(
    task: &ComplianceTask,
    obligation: &Obligation,
    tier: ComplianceTier,
    days_until_due: Option<i64>,
) -> Rendered {
    let action = obligation.action_required.as_str();
    let regulator = obligation.regulator.as_str();
    let due_text = task
        .due_date
        .map(|date| date.format("%d %B %Y").to_string())
        .unwrap_or_else(|| "an unknown date".to_string());

    let (title, message, kind) = match tier {
        ComplianceTier::SevenDay | ComplianceTier::ThreeDay => {
            let days = days_until_due.unwrap_or_default();
            (
                format!("Compliance due in {days} days: {action}"),
                format!("{action} for {regulator} is due on {due_text}."),
                NotificationKind::ComplianceReminder,
            )
        }
        ComplianceTier::DayOf => (
            format!("Compliance due today: {action}"),
            format!("{action} for {regulator} is due today ({due_text})."),
            NotificationKind::ComplianceReminder,
        ),
        ComplianceTier::Overdue => {
            let days_over = days_until_due.map(|days| -days).unwrap_or_default();
            (
                format!("OVERDUE: {action}"),
                format!(
                    "{action} for {regulator} was due on {due_text} and is now {days_over} day(s) overdue. Immediate attention required."
                ),
                NotificationKind::ComplianceOverdue,
            )
        }
        ComplianceTier::ActionRequired => (
            format!("Action required: {action}"),
            format!(
                "{action} for {regulator} has no interpretable due date (\"{}\"). Review the requirement and acknowledge it.",
                obligation.due_date_text
            ),
            NotificationKind::ActionRequired,
        ),
    };

    Rendered {
        title,
        message,
        priority: tier.priority(),
        kind,
        related: RelatedEntity {
            kind: RelatedKind::ComplianceTask,
            id: task.id,
        },
    }
}

fn format_event_date(event_at_ms: i64) -> String {
    match Utc.timestamp_millis_opt(event_at_ms).single() {
        Some(at) => at.format("%d %B %Y").to_string(),
        None => "an unknown date".to_string(),
    }
}
