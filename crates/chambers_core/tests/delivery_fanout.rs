use chambers_core::db::open_db_in_memory;
use chambers_core::{
    Clock, ComplianceTask, ComplianceTier, CourtDate, CourtTier, DeliveryEngine, DueItem,
    FixedClock,
    MemberRole, MembershipStatus, NotificationRepository, NotificationStatus, Obligation,
    ObligationTier, RepoError, SqliteDirectory, SqliteNotificationRepository, UserId, Workspace,
    WorkspaceId, WorkspaceMember,
};
use chrono::{NaiveDate, TimeZone, Utc};
use rusqlite::Connection;
use uuid::Uuid;

fn clock() -> FixedClock {
    FixedClock::at(Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap())
}

fn insert_workspace(conn: &Connection, owner: UserId) -> WorkspaceId {
    let directory = SqliteDirectory::new(conn);
    let workspace_id = Uuid::new_v4();
    directory
        .insert_workspace(&Workspace {
            id: workspace_id,
            name: "Quay Chambers".to_string(),
            owner_user_id: owner,
        })
        .unwrap();
    workspace_id
}

fn insert_member(
    conn: &Connection,
    workspace_id: WorkspaceId,
    role: MemberRole,
    status: MembershipStatus,
) -> UserId {
    let directory = SqliteDirectory::new(conn);
    let user_id = Uuid::new_v4();
    directory
        .insert_member(&WorkspaceMember {
            workspace_id,
            user_id,
            role,
            designation: None,
            status,
        })
        .unwrap();
    user_id
}

fn compliance_item(workspace_id: WorkspaceId, tier: ComplianceTier) -> DueItem {
    let obligation = Obligation {
        id: Uuid::new_v4(),
        tier: ObligationTier::Local,
        regulator: "City Council".to_string(),
        action_required: "Premises licence renewal".to_string(),
        procedure: "Renew at the counter".to_string(),
        frequency: "annual".to_string(),
        due_date_text: "31st March".to_string(),
        jurisdiction: "Sydney".to_string(),
    };
    let task = ComplianceTask::new(
        obligation.id,
        workspace_id,
        Some(NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()),
        1_000,
    );
    let days_until_due = match tier {
        ComplianceTier::Overdue => Some(-2),
        ComplianceTier::DayOf => Some(0),
        ComplianceTier::ThreeDay => Some(3),
        ComplianceTier::SevenDay => Some(7),
        ComplianceTier::ActionRequired => None,
    };
    DueItem::Compliance {
        task,
        obligation,
        tier,
        days_until_due,
    }
}

#[test]
fn court_item_delivers_to_the_named_recipient_only() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let owner = Uuid::new_v4();
    let workspace_id = insert_workspace(&conn, owner);
    insert_member(&conn, workspace_id, MemberRole::Owner, MembershipStatus::Active);
    let lawyer = insert_member(
        &conn,
        workspace_id,
        MemberRole::Lawyer,
        MembershipStatus::Active,
    );

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);

    let item = DueItem::Court {
        court_date: CourtDate::new(
            workspace_id,
            "Rex v Mallard",
            clock.now().timestamp_millis() + 86_400_000,
            vec![lawyer],
        ),
        tier: CourtTier::DayOf,
        recipient_id: lawyer,
    };

    let receipt = engine.deliver(&item).unwrap();
    assert_eq!(receipt.created, 1);

    let feed = notifications.list_for_recipient(lawyer, true).unwrap();
    assert_eq!(feed.len(), 1);
    assert!(feed[0].title.starts_with("Court appearance today"));
    assert_eq!(feed[0].channels, vec!["in_app".to_string()]);
    assert_eq!(feed[0].status, NotificationStatus::Unread);
}

#[test]
fn overdue_escalation_fans_out_to_every_active_member() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let owner_user = Uuid::new_v4();
    let workspace_id = insert_workspace(&conn, owner_user);
    insert_member(&conn, workspace_id, MemberRole::Owner, MembershipStatus::Active);
    insert_member(&conn, workspace_id, MemberRole::Partner, MembershipStatus::Active);
    insert_member(&conn, workspace_id, MemberRole::Staff, MembershipStatus::Active);
    insert_member(&conn, workspace_id, MemberRole::Lawyer, MembershipStatus::Pending);

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);

    let receipt = engine
        .deliver(&compliance_item(workspace_id, ComplianceTier::Overdue))
        .unwrap();
    // Three active members; the pending lawyer is excluded.
    assert_eq!(receipt.created, 3);
}

#[test]
fn routine_reminder_goes_to_owner_and_partner_roles() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let owner_user = Uuid::new_v4();
    let workspace_id = insert_workspace(&conn, owner_user);
    insert_member(&conn, workspace_id, MemberRole::Owner, MembershipStatus::Active);
    insert_member(&conn, workspace_id, MemberRole::Partner, MembershipStatus::Active);
    insert_member(&conn, workspace_id, MemberRole::Staff, MembershipStatus::Active);

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);

    let receipt = engine
        .deliver(&compliance_item(workspace_id, ComplianceTier::ThreeDay))
        .unwrap();
    assert_eq!(receipt.created, 2);
}

#[test]
fn empty_resolution_falls_back_to_the_workspace_owner() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let owner_user = Uuid::new_v4();
    // Workspace with no membership rows at all.
    let workspace_id = insert_workspace(&conn, owner_user);

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);

    let receipt = engine
        .deliver(&compliance_item(workspace_id, ComplianceTier::SevenDay))
        .unwrap();
    assert_eq!(receipt.created, 1);

    let feed = notifications.list_for_recipient(owner_user, true).unwrap();
    assert_eq!(feed.len(), 1);
}

#[test]
fn unknown_workspace_surfaces_not_found() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);

    let err = engine
        .deliver(&compliance_item(Uuid::new_v4(), ComplianceTier::SevenDay))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "workspace", .. }));
}

#[test]
fn mark_read_is_terminal_and_keeps_the_first_read_instant() {
    let conn = open_db_in_memory().unwrap();
    let clock = clock();
    let owner_user = Uuid::new_v4();
    let workspace_id = insert_workspace(&conn, owner_user);

    let directory = SqliteDirectory::new(&conn);
    let notifications = SqliteNotificationRepository::new(&conn);
    let engine = DeliveryEngine::new(&directory, &notifications, &clock);
    engine
        .deliver(&compliance_item(workspace_id, ComplianceTier::DayOf))
        .unwrap();

    let feed = notifications.list_for_recipient(owner_user, true).unwrap();
    let id = feed[0].id;

    notifications.mark_read(id, 9_000).unwrap();
    notifications.mark_read(id, 10_000).unwrap();

    let read = notifications
        .list_for_recipient(owner_user, true)
        .unwrap()
        .remove(0);
    assert_eq!(read.status, NotificationStatus::Read);
    assert_eq!(read.read_at, Some(9_000));

    // Unread-only listing no longer returns it.
    assert!(notifications
        .list_for_recipient(owner_user, false)
        .unwrap()
        .is_empty());

    let err = notifications.mark_read(Uuid::new_v4(), 1_000).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}
