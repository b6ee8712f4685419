//! Court date persistence.
//!
//! # Responsibility
//! - Insert and load court dates with their assigned appearances.
//!
//! # Invariants
//! - Court dates are read-only to the sweep; insertion exists for the
//!   surrounding system's calendaring path and for tests.

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::model::court::CourtDate;
use crate::repo::{parse_uuid, RepoResult};

/// Persistence contract for court dates.
pub trait CourtDateRepository {
    fn create_court_date(&self, court_date: &CourtDate) -> RepoResult<Uuid>;
    fn get_court_date(&self, id: Uuid) -> RepoResult<Option<CourtDate>>;
}

/// SQLite-backed court date repository.
pub struct SqliteCourtDateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCourtDateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CourtDateRepository for SqliteCourtDateRepository<'_> {
    fn create_court_date(&self, court_date: &CourtDate) -> RepoResult<Uuid> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO court_dates (id, workspace_id, matter, event_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                court_date.id.to_string(),
                court_date.workspace_id.to_string(),
                court_date.matter.as_str(),
                court_date.event_at,
            ],
        )?;

        for user_id in &court_date.appearances {
            tx.execute(
                "INSERT INTO court_date_appearances (court_date_id, user_id)
                 VALUES (?1, ?2);",
                params![court_date.id.to_string(), user_id.to_string()],
            )?;
        }

        tx.commit()?;
        Ok(court_date.id)
    }

    fn get_court_date(&self, id: Uuid) -> RepoResult<Option<CourtDate>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workspace_id, matter, event_at FROM court_dates WHERE id = ?1;",
        )?;
        let mut rows = stmt.query(params![id.to_string()])?;

        let Some(row) = rows.next()? else {
            return Ok(None);
        };

        let id_text: String = row.get("id")?;
        let workspace_text: String = row.get("workspace_id")?;
        let mut court_date = CourtDate {
            id: parse_uuid("court_dates.id", &id_text)?,
            workspace_id: parse_uuid("court_dates.workspace_id", &workspace_text)?,
            matter: row.get("matter")?,
            event_at: row.get("event_at")?,
            appearances: Vec::new(),
        };

        let mut appearance_stmt = self.conn.prepare(
            "SELECT user_id FROM court_date_appearances
             WHERE court_date_id = ?1 ORDER BY user_id ASC;",
        )?;
        let mut appearance_rows = appearance_stmt.query(params![court_date.id.to_string()])?;
        while let Some(appearance) = appearance_rows.next()? {
            let user_text: String = appearance.get(0)?;
            court_date
                .appearances
                .push(parse_uuid("court_date_appearances.user_id", &user_text)?);
        }

        Ok(Some(court_date))
    }
}
