//! Domain records for the reminder engine.
//!
//! # Responsibility
//! - Define the canonical data structures shared by repositories and
//!   the sweep/delivery services.
//! - Keep db-tag round-trips (`*_to_db` / `parse_*`) next to the enums
//!   they encode.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Instants are epoch milliseconds (`i64`); calendar dates are
//!   `chrono::NaiveDate`.

pub mod court;
pub mod member;
pub mod notification;
pub mod obligation;
pub mod queue;
