//! Court date records.
//!
//! # Responsibility
//! - Model scheduled matter events and their assigned lawyers
//!   ("appearances").
//!
//! # Invariants
//! - Court dates are read-only input to the sweep; this core never
//!   mutates them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::member::{UserId, WorkspaceId};

/// A scheduled matter event with assigned lawyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtDate {
    pub id: Uuid,
    pub workspace_id: WorkspaceId,
    /// Matter title shown in reminder messages.
    pub matter: String,
    /// Event instant, epoch ms.
    pub event_at: i64,
    /// Lawyers assigned to appear.
    pub appearances: Vec<UserId>,
}

impl CourtDate {
    pub fn new(
        workspace_id: WorkspaceId,
        matter: impl Into<String>,
        event_at: i64,
        appearances: Vec<UserId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            matter: matter.into(),
            event_at,
            appearances,
        }
    }
}
