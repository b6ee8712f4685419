//! The reminder sweep.
//!
//! # Responsibility
//! - Single periodic entry point: find due reminders on both paths and
//!   hand each to the fan-out engine.
//!
//! # Invariants
//! - The two paths stay distinct: the court path consumes a persisted
//!   queue with a sent-once claim; the compliance path is stateless
//!   re-evaluation with no sent marker.
//! - No per-item error escapes the sweep; failures are logged, counted
//!   and skipped.
//! - The queue claim is an atomic conditional update, so overlapping
//!   invocations cannot both mark one row sent. Both may still deliver
//!   it: at-least-once, never silent loss.
//! - A store failure before the scans complete aborts the whole sweep
//!   with `success=false` and nothing attempted.

use std::time::Instant;

use log::{error, info, warn};
use rusqlite::Connection;
use serde::Serialize;

use crate::clock::Clock;
use crate::model::obligation::{compliance_tier_for, days_until_due};
use crate::model::queue::ScheduledNotification;
use crate::repo::compliance_repo::{ComplianceRepository, SqliteComplianceRepository};
use crate::repo::court_repo::{CourtDateRepository, SqliteCourtDateRepository};
use crate::repo::directory::SqliteDirectory;
use crate::repo::notification_repo::SqliteNotificationRepository;
use crate::repo::queue_repo::{ReminderQueue, SqliteReminderQueue};
use crate::repo::{RepoError, RepoResult};
use crate::service::delivery::{DeliveryEngine, DueItem};

/// Queue rows consumed per cycle; the remainder waits for the next one.
pub const QUEUE_BATCH_SIZE: u32 = 100;

/// Result body of one sweep, returned to the trigger surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepOutcome {
    pub success: bool,
    pub processed: u32,
    pub failed: u32,
}

/// One-shot sweep runner over a single connection.
pub struct SweepService<'a> {
    conn: &'a Connection,
    clock: &'a dyn Clock,
}

impl<'a> SweepService<'a> {
    pub fn new(conn: &'a Connection, clock: &'a dyn Clock) -> Self {
        Self { conn, clock }
    }

    /// Runs one sweep cycle. Safe to call repeatedly.
    pub fn run(&self) -> SweepOutcome {
        let started_at = Instant::now();
        info!("event=sweep module=sweep status=start");

        let queue = SqliteReminderQueue::new(self.conn);
        let courts = SqliteCourtDateRepository::new(self.conn);
        let compliance = SqliteComplianceRepository::new(self.conn);
        let directory = SqliteDirectory::new(self.conn);
        let notifications = SqliteNotificationRepository::new(self.conn);
        let engine = DeliveryEngine::new(&directory, &notifications, self.clock);

        // Both scans happen before any delivery: a store failure here
        // means nothing was attempted and the sweep reports a clean abort.
        let due_rows = match queue.due_batch(self.clock.now_ms(), QUEUE_BATCH_SIZE) {
            Ok(rows) => rows,
            Err(err) => return aborted("queue_scan_failed", &err, started_at),
        };
        let open_tasks = match compliance.list_open_tasks() {
            Ok(tasks) => tasks,
            Err(err) => return aborted("task_scan_failed", &err, started_at),
        };

        let mut processed: u32 = 0;
        let mut failed: u32 = 0;

        for row in due_rows {
            match self.process_queue_row(&engine, &queue, &courts, &row) {
                Ok(()) => processed += 1,
                Err(err) => {
                    warn!(
                        "event=sweep_item module=sweep status=error path=queue item={} error={err}",
                        row.id
                    );
                    failed += 1;
                }
            }
        }

        let now = self.clock.now();
        for (task, obligation) in open_tasks {
            let day_count = task.due_date.map(|due| days_until_due(due, now));
            let Some(tier) = compliance_tier_for(day_count, task.acknowledged_at.is_some())
            else {
                continue;
            };

            let task_id = task.id;
            let item = DueItem::Compliance {
                task,
                obligation,
                tier,
                days_until_due: day_count,
            };
            match engine.deliver(&item) {
                Ok(_) => processed += 1,
                Err(err) => {
                    warn!(
                        "event=sweep_item module=sweep status=error path=compliance item={task_id} error={err}"
                    );
                    failed += 1;
                }
            }
        }

        info!(
            "event=sweep module=sweep status=ok processed={processed} failed={failed} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        SweepOutcome {
            success: true,
            processed,
            failed,
        }
    }

    fn process_queue_row(
        &self,
        engine: &DeliveryEngine<'_>,
        queue: &dyn ReminderQueue,
        courts: &dyn CourtDateRepository,
        row: &ScheduledNotification,
    ) -> RepoResult<()> {
        let court_date =
            courts
                .get_court_date(row.source_id)?
                .ok_or(RepoError::NotFound {
                    entity: "court_date",
                    id: row.source_id,
                })?;

        let item = DueItem::Court {
            court_date,
            tier: row.tier,
            recipient_id: row.recipient_id,
        };
        engine.deliver(&item)?;

        // Claim after the batch write. A failed delivery above leaves the
        // row pending, and the past scheduled_for re-surfaces it next
        // cycle.
        let claimed = queue.mark_sent(row.id, self.clock.now_ms())?;
        if !claimed {
            info!(
                "event=sweep_item module=sweep status=already_claimed item={}",
                row.id
            );
        }
        Ok(())
    }
}

fn aborted(code: &str, err: &RepoError, started_at: Instant) -> SweepOutcome {
    error!(
        "event=sweep module=sweep status=error error_code={code} error={err} duration_ms={}",
        started_at.elapsed().as_millis()
    );
    SweepOutcome {
        success: false,
        processed: 0,
        failed: 0,
    }
}
