//! Obligation templates and per-workspace compliance tasks.
//!
//! # Responsibility
//! - Define the immutable obligation reference record and its tracked
//!   workspace instance.
//! - Provide the day-count and reminder-stage rules applied by the sweep.
//!
//! # Invariants
//! - `Obligation` rows are never mutated by this core.
//! - At most one non-concluded `ComplianceTask` exists per
//!   (obligation, workspace); the schema enforces this with a partial
//!   unique index.
//! - `ComplianceStatus::Concluded` is terminal and owned by external
//!   acknowledge/comply actions, not by the sweep.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::member::WorkspaceId;
use crate::model::notification::NotificationPriority;

/// Regulatory level an obligation originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationTier {
    Federal,
    State,
    Local,
}

/// Immutable regulatory requirement template, shared across workspaces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    pub id: Uuid,
    pub tier: ObligationTier,
    pub regulator: String,
    pub action_required: String,
    pub procedure: String,
    pub frequency: String,
    /// Free-text due-date description, interpreted by [`crate::recurrence`].
    pub due_date_text: String,
    pub jurisdiction: String,
}

/// Lifecycle state of a tracked compliance task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Pending,
    DueSoon,
    Overdue,
    Concluded,
}

/// One workspace's tracked instance of an [`Obligation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceTask {
    pub id: Uuid,
    pub obligation_id: Uuid,
    pub workspace_id: WorkspaceId,
    pub status: ComplianceStatus,
    /// Derived from the obligation's due-date text; `None` when the text
    /// was not interpretable.
    pub due_date: Option<NaiveDate>,
    /// Epoch ms of external acknowledgement, if any.
    pub acknowledged_at: Option<i64>,
    pub evidence_url: Option<String>,
    /// Epoch ms.
    pub created_at: i64,
}

impl ComplianceTask {
    /// Creates a pending task for an obligation in a workspace.
    pub fn new(
        obligation_id: Uuid,
        workspace_id: WorkspaceId,
        due_date: Option<NaiveDate>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            obligation_id,
            workspace_id,
            status: ComplianceStatus::Pending,
            due_date,
            acknowledged_at: None,
            evidence_url: None,
            created_at,
        }
    }

    /// Returns whether the sweep should still evaluate this task.
    pub fn is_open(&self) -> bool {
        self.status != ComplianceStatus::Concluded
    }
}

/// Reminder stage the compliance path is in for one task, "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplianceTier {
    SevenDay,
    ThreeDay,
    DayOf,
    Overdue,
    /// Dateless and never acknowledged: generic nudge, re-sent every cycle.
    ActionRequired,
}

impl ComplianceTier {
    pub fn priority(self) -> NotificationPriority {
        match self {
            Self::SevenDay | Self::ThreeDay => NotificationPriority::High,
            Self::DayOf | Self::Overdue => NotificationPriority::Critical,
            Self::ActionRequired => NotificationPriority::Normal,
        }
    }
}

/// Ceiling day count between `now` and midnight UTC of `due`.
///
/// A task due at midnight tonight counts as 0 all of today; a task whose
/// due midnight passed two days ago counts as -2.
pub fn days_until_due(due: NaiveDate, now: DateTime<Utc>) -> i64 {
    let due_at = Utc.from_utc_datetime(&due.and_time(NaiveTime::MIN));
    let secs = (due_at - now).num_seconds();
    // Integer ceiling that stays correct for negative spans.
    let days = secs.div_euclid(86_400);
    if secs.rem_euclid(86_400) > 0 {
        days + 1
    } else {
        days
    }
}

/// Applies the tier rules to one open task. `None` means nothing is due
/// this cycle.
pub fn compliance_tier_for(
    days_until_due: Option<i64>,
    acknowledged: bool,
) -> Option<ComplianceTier> {
    match days_until_due {
        Some(0) => Some(ComplianceTier::DayOf),
        Some(3) => Some(ComplianceTier::ThreeDay),
        Some(7) => Some(ComplianceTier::SevenDay),
        Some(days) if days < 0 => Some(ComplianceTier::Overdue),
        Some(_) => None,
        None if !acknowledged => Some(ComplianceTier::ActionRequired),
        None => None,
    }
}

pub(crate) fn obligation_tier_to_db(tier: ObligationTier) -> &'static str {
    match tier {
        ObligationTier::Federal => "federal",
        ObligationTier::State => "state",
        ObligationTier::Local => "local",
    }
}

pub(crate) fn parse_obligation_tier(value: &str) -> Option<ObligationTier> {
    match value {
        "federal" => Some(ObligationTier::Federal),
        "state" => Some(ObligationTier::State),
        "local" => Some(ObligationTier::Local),
        _ => None,
    }
}

pub(crate) fn compliance_status_to_db(status: ComplianceStatus) -> &'static str {
    match status {
        ComplianceStatus::Pending => "pending",
        ComplianceStatus::DueSoon => "due_soon",
        ComplianceStatus::Overdue => "overdue",
        ComplianceStatus::Concluded => "concluded",
    }
}

pub(crate) fn parse_compliance_status(value: &str) -> Option<ComplianceStatus> {
    match value {
        "pending" => Some(ComplianceStatus::Pending),
        "due_soon" => Some(ComplianceStatus::DueSoon),
        "overdue" => Some(ComplianceStatus::Overdue),
        "concluded" => Some(ComplianceStatus::Concluded),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{compliance_tier_for, days_until_due, ComplianceTier};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn due_midnight_already_passed_today_counts_as_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2025, 3, 10), now), 0);
    }

    #[test]
    fn due_in_three_days_counts_as_three() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2025, 3, 13), now), 3);
    }

    #[test]
    fn overdue_by_two_days_counts_as_minus_two() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 10, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2025, 3, 8), now), -2);
    }

    #[test]
    fn exact_midnight_boundary_is_a_whole_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(days_until_due(date(2025, 3, 11), now), 1);
        assert_eq!(days_until_due(date(2025, 3, 10), now), 0);
    }

    #[test]
    fn tier_rules_match_day_counts() {
        assert_eq!(
            compliance_tier_for(Some(7), false),
            Some(ComplianceTier::SevenDay)
        );
        assert_eq!(
            compliance_tier_for(Some(3), true),
            Some(ComplianceTier::ThreeDay)
        );
        assert_eq!(
            compliance_tier_for(Some(0), false),
            Some(ComplianceTier::DayOf)
        );
        assert_eq!(
            compliance_tier_for(Some(-2), true),
            Some(ComplianceTier::Overdue)
        );
        assert_eq!(compliance_tier_for(Some(5), false), None);
        assert_eq!(compliance_tier_for(Some(1), false), None);
    }

    #[test]
    fn dateless_task_nudges_only_before_acknowledgement() {
        assert_eq!(
            compliance_tier_for(None, false),
            Some(ComplianceTier::ActionRequired)
        );
        assert_eq!(compliance_tier_for(None, true), None);
    }
}
