//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the sweep, fan-out and seeding
//!   entry points.
//! - Keep the CLI/trigger layer decoupled from storage details.

pub mod delivery;
pub mod seed_service;
pub mod sweep_service;
