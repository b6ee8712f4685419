//! Task seeding and court reminder scheduling.
//!
//! # Responsibility
//! - Materialize pending compliance tasks per (obligation, workspace),
//!   deriving due dates from obligation due-date text.
//! - Enqueue the court reminder tier ladder for a court date's assigned
//!   lawyers.
//!
//! # Invariants
//! - Seeding never creates a second active task for the same
//!   (obligation, workspace).
//! - Court enqueueing is idempotent: re-running absorbs duplicates into
//!   the pending-row unique index.

use log::info;
use rusqlite::Connection;
use uuid::Uuid;

use crate::clock::Clock;
use crate::model::member::WorkspaceId;
use crate::model::obligation::ComplianceTask;
use crate::model::queue::{CourtTier, ScheduledNotification};
use crate::recurrence;
use crate::repo::compliance_repo::{ComplianceRepository, SqliteComplianceRepository};
use crate::repo::court_repo::{CourtDateRepository, SqliteCourtDateRepository};
use crate::repo::queue_repo::{ReminderQueue, SqliteReminderQueue};
use crate::repo::{RepoError, RepoResult};

const DAY_MS: i64 = 86_400_000;

/// Seeds tracked tasks and reminder queue rows.
pub struct SeedService<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> SeedService<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Creates one pending task per obligation that has no active task in
    /// the workspace yet. Returns the number created.
    ///
    /// Obligations whose due-date text is not interpretable produce
    /// dateless tasks; those only ever receive the action-required nudge.
    pub fn seed_workspace_tasks(
        &self,
        workspace_id: WorkspaceId,
        reference_year: i32,
    ) -> RepoResult<u32> {
        let compliance = SqliteComplianceRepository::new(self.conn);
        let today = self.clock.today();
        let now_ms = self.clock.now_ms();

        let mut created: u32 = 0;
        for obligation in compliance.list_obligations()? {
            if compliance.active_task_exists(obligation.id, workspace_id)? {
                continue;
            }

            let due_date = recurrence::interpret(&obligation.due_date_text, reference_year, today);
            let task = ComplianceTask::new(obligation.id, workspace_id, due_date, now_ms);
            compliance.create_task(&task)?;
            created += 1;
        }

        info!(
            "event=seed_tasks module=seed status=ok workspace={workspace_id} created={created}"
        );
        Ok(created)
    }

    /// Enqueues the full reminder tier ladder for every lawyer assigned to
    /// the court date. Returns the number of rows actually inserted.
    ///
    /// Tiers whose instant is already past are still enqueued; the next
    /// sweep delivers them immediately.
    pub fn schedule_court_reminders(&self, court_date_id: Uuid) -> RepoResult<u32> {
        let courts = SqliteCourtDateRepository::new(self.conn);
        let queue = SqliteReminderQueue::new(self.conn);

        let court_date = courts
            .get_court_date(court_date_id)?
            .ok_or(RepoError::NotFound {
                entity: "court_date",
                id: court_date_id,
            })?;

        let now_ms = self.clock.now_ms();
        let mut enqueued: u32 = 0;
        for recipient_id in &court_date.appearances {
            for tier in CourtTier::LADDER {
                let scheduled_for = court_date.event_at - tier.offset_days() * DAY_MS;
                let row = ScheduledNotification::for_court_date(
                    court_date.id,
                    tier,
                    *recipient_id,
                    scheduled_for,
                    now_ms,
                );
                if queue.enqueue(&row)? {
                    enqueued += 1;
                }
            }
        }

        info!(
            "event=schedule_court module=seed status=ok court_date={court_date_id} enqueued={enqueued}"
        );
        Ok(enqueued)
    }
}
