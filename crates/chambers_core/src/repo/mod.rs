//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for the sweep and
//!   its collaborators.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   DB transport errors.
//! - Row parsing rejects invalid persisted state instead of masking it.

use std::error::Error;
use std::fmt::{Display, Formatter};

use uuid::Uuid;

use crate::db::DbError;

pub mod compliance_repo;
pub mod court_repo;
pub mod directory;
pub mod notification_repo;
pub mod queue_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Shared error type for all repositories in this crate.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound { entity: &'static str, id: Uuid },
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn invalid<T: Display>(column: &str, value: T) -> Self {
        Self::InvalidData(format!("invalid value `{value}` in {column}"))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(column: &str, value: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| RepoError::invalid(column, value))
}
