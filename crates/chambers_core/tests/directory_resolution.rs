use chambers_core::db::open_db_in_memory;
use chambers_core::{
    resolve, Directory, MemberRole, MembershipStatus, RecipientSpec, RepoError, SqliteDirectory,
    UserId, Workspace, WorkspaceId, WorkspaceMember,
};
use rusqlite::Connection;
use uuid::Uuid;

fn insert_workspace(conn: &Connection) -> (WorkspaceId, UserId) {
    let directory = SqliteDirectory::new(conn);
    let workspace_id = Uuid::new_v4();
    let owner = Uuid::new_v4();
    directory
        .insert_workspace(&Workspace {
            id: workspace_id,
            name: "Pier Chambers".to_string(),
            owner_user_id: owner,
        })
        .unwrap();
    (workspace_id, owner)
}

fn insert_member(
    conn: &Connection,
    workspace_id: WorkspaceId,
    role: MemberRole,
    status: MembershipStatus,
    designation: Option<&str>,
) -> UserId {
    let directory = SqliteDirectory::new(conn);
    let user_id = Uuid::new_v4();
    directory
        .insert_member(&WorkspaceMember {
            workspace_id,
            user_id,
            role,
            designation: designation.map(str::to_string),
            status,
        })
        .unwrap();
    user_id
}

#[test]
fn role_resolution_selects_owner_and_partner() {
    let conn = open_db_in_memory().unwrap();
    let (workspace_id, _) = insert_workspace(&conn);
    let owner = insert_member(
        &conn,
        workspace_id,
        MemberRole::Owner,
        MembershipStatus::Active,
        None,
    );
    let partner = insert_member(
        &conn,
        workspace_id,
        MemberRole::Partner,
        MembershipStatus::Active,
        None,
    );
    insert_member(
        &conn,
        workspace_id,
        MemberRole::Staff,
        MembershipStatus::Active,
        None,
    );

    let directory = SqliteDirectory::new(&conn);
    let spec = RecipientSpec::for_roles([MemberRole::Owner, MemberRole::Partner]);
    let mut expected = vec![owner, partner];
    expected.sort();

    assert_eq!(resolve(&directory, &spec, workspace_id).unwrap(), expected);
}

#[test]
fn inactive_owner_and_partner_fall_back_to_the_workspace_owner() {
    let conn = open_db_in_memory().unwrap();
    let (workspace_id, owner_user) = insert_workspace(&conn);
    insert_member(
        &conn,
        workspace_id,
        MemberRole::Owner,
        MembershipStatus::Pending,
        None,
    );
    insert_member(
        &conn,
        workspace_id,
        MemberRole::Partner,
        MembershipStatus::Pending,
        None,
    );

    let directory = SqliteDirectory::new(&conn);
    let spec = RecipientSpec::for_roles([MemberRole::Owner, MemberRole::Partner]);
    assert_eq!(
        resolve(&directory, &spec, workspace_id).unwrap(),
        vec![owner_user]
    );
}

#[test]
fn designation_resolution_is_exact_match_only() {
    let conn = open_db_in_memory().unwrap();
    let (workspace_id, _) = insert_workspace(&conn);
    let clerk = insert_member(
        &conn,
        workspace_id,
        MemberRole::Staff,
        MembershipStatus::Active,
        Some("Senior Clerk"),
    );
    insert_member(
        &conn,
        workspace_id,
        MemberRole::Staff,
        MembershipStatus::Active,
        Some("senior clerk"),
    );

    let directory = SqliteDirectory::new(&conn);
    let spec = RecipientSpec::for_designations(vec!["Senior Clerk".to_string()]);
    assert_eq!(
        resolve(&directory, &spec, workspace_id).unwrap(),
        vec![clerk]
    );
}

#[test]
fn legacy_associate_role_loads_as_lawyer() {
    let conn = open_db_in_memory().unwrap();
    let (workspace_id, _) = insert_workspace(&conn);
    let user_id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO workspace_members (workspace_id, user_id, role, designation, status)
         VALUES (?1, ?2, 'associate', NULL, 'active');",
        [workspace_id.to_string(), user_id.to_string()],
    )
    .unwrap();

    let directory = SqliteDirectory::new(&conn);
    let members = directory.members_of(workspace_id).unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, MemberRole::Lawyer);
}

#[test]
fn corrupt_role_value_is_rejected_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let (workspace_id, _) = insert_workspace(&conn);
    conn.execute(
        "INSERT INTO workspace_members (workspace_id, user_id, role, designation, status)
         VALUES (?1, ?2, 'intern', NULL, 'active');",
        [workspace_id.to_string(), Uuid::new_v4().to_string()],
    )
    .unwrap();

    let directory = SqliteDirectory::new(&conn);
    let err = directory.members_of(workspace_id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn owner_lookup_for_unknown_workspace_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let directory = SqliteDirectory::new(&conn);
    let err = directory.workspace_owner(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "workspace", .. }));
}
