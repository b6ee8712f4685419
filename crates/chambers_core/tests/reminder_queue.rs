use chambers_core::db::open_db_in_memory;
use chambers_core::{
    CourtTier, QueueStatus, ReminderQueue, ScheduledNotification, SqliteReminderQueue,
};
use uuid::Uuid;

fn pending_row(scheduled_for: i64) -> ScheduledNotification {
    ScheduledNotification::for_court_date(
        Uuid::new_v4(),
        CourtTier::ThreeDay,
        Uuid::new_v4(),
        scheduled_for,
        1_000,
    )
}

#[test]
fn enqueue_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    let row = pending_row(5_000);
    assert!(queue.enqueue(&row).unwrap());

    let loaded = queue.get(row.id).unwrap().unwrap();
    assert_eq!(loaded, row);
    assert_eq!(loaded.status, QueueStatus::Pending);
    assert!(loaded.sent_at.is_none());
}

#[test]
fn duplicate_pending_row_is_absorbed() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    let row = pending_row(5_000);
    assert!(queue.enqueue(&row).unwrap());

    // Same (source, tier, recipient), different row id.
    let duplicate = ScheduledNotification {
        id: Uuid::new_v4(),
        ..row.clone()
    };
    assert!(!queue.enqueue(&duplicate).unwrap());

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM scheduled_notifications;", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn sent_row_allows_a_new_pending_row_for_the_same_key() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    let row = pending_row(5_000);
    queue.enqueue(&row).unwrap();
    assert!(queue.mark_sent(row.id, 6_000).unwrap());

    let replacement = ScheduledNotification {
        id: Uuid::new_v4(),
        ..row.clone()
    };
    assert!(queue.enqueue(&replacement).unwrap());
}

#[test]
fn due_batch_returns_only_due_pending_rows_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    let due_late = pending_row(9_000);
    let due_early = pending_row(1_000);
    let not_due = pending_row(20_000);
    let sent = pending_row(2_000);
    for row in [&due_late, &due_early, &not_due, &sent] {
        queue.enqueue(row).unwrap();
    }
    queue.mark_sent(sent.id, 3_000).unwrap();

    let due = queue.due_batch(10_000, 100).unwrap();
    let ids: Vec<_> = due.iter().map(|row| row.id).collect();
    assert_eq!(ids, vec![due_early.id, due_late.id]);
}

#[test]
fn due_batch_respects_the_limit() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    for offset in 0..5 {
        queue.enqueue(&pending_row(1_000 + offset)).unwrap();
    }

    let due = queue.due_batch(10_000, 3).unwrap();
    assert_eq!(due.len(), 3);
}

#[test]
fn mark_sent_claims_exactly_once() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);

    let row = pending_row(1_000);
    queue.enqueue(&row).unwrap();

    assert!(queue.mark_sent(row.id, 2_000).unwrap());
    // A second claim observes the row as already sent.
    assert!(!queue.mark_sent(row.id, 3_000).unwrap());

    let loaded = queue.get(row.id).unwrap().unwrap();
    assert_eq!(loaded.status, QueueStatus::Sent);
    assert_eq!(loaded.sent_at, Some(2_000));
}

#[test]
fn mark_sent_on_unknown_row_claims_nothing() {
    let conn = open_db_in_memory().unwrap();
    let queue = SqliteReminderQueue::new(&conn);
    assert!(!queue.mark_sent(Uuid::new_v4(), 1_000).unwrap());
}
