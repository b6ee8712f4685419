//! Core domain logic for the Chambers reminder engine.
//!
//! Turns regulatory obligations and court dates into concrete due dates,
//! decides which reminder tier is due now, resolves recipients and
//! materializes in-app notifications, isolating per-item failures.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod recipient;
pub mod recurrence;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::court::CourtDate;
pub use model::member::{
    MemberRole, MembershipStatus, UserId, Workspace, WorkspaceId, WorkspaceMember,
};
pub use model::notification::{
    Notification, NotificationKind, NotificationPriority, NotificationStatus, RelatedEntity,
    RelatedKind,
};
pub use model::obligation::{
    compliance_tier_for, days_until_due, ComplianceStatus, ComplianceTask, ComplianceTier,
    Obligation, ObligationTier,
};
pub use model::queue::{CourtTier, QueueStatus, ReminderSourceKind, ScheduledNotification};
pub use recipient::{resolve, RecipientSpec};
pub use recurrence::interpret;
pub use repo::compliance_repo::{ComplianceRepository, SqliteComplianceRepository};
pub use repo::court_repo::{CourtDateRepository, SqliteCourtDateRepository};
pub use repo::directory::{Directory, SqliteDirectory};
pub use repo::notification_repo::{NotificationRepository, SqliteNotificationRepository};
pub use repo::queue_repo::{ReminderQueue, SqliteReminderQueue};
pub use repo::{RepoError, RepoResult};
pub use service::delivery::{DeliveryEngine, DeliveryReceipt, DueItem};
pub use service::seed_service::SeedService;
pub use service::sweep_service::{SweepOutcome, SweepService, QUEUE_BATCH_SIZE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
