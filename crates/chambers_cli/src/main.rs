//! Sweep trigger surface.
//!
//! # Responsibility
//! - Provide the invocable entry point an external scheduler (cron) calls.
//! - Open the database, run exactly one sweep, print the JSON outcome.
//!
//! Safe to call repeatedly; exit code 0 means the sweep itself ran
//! (per-item failures are reported in the body), 1 means it aborted.

use std::process::ExitCode;

use chambers_core::db::open_db;
use chambers_core::{core_version, default_log_level, init_logging, SweepService, SystemClock};
use log::error;

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let Some(db_path) = args.next().or_else(|| std::env::var("CHAMBERS_DB").ok()) else {
        eprintln!("usage: chambers-sweep <db-path> [log-dir]");
        eprintln!("       (db path may also come from CHAMBERS_DB)");
        return ExitCode::from(2);
    };

    if let Some(log_dir) = args.next() {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("chambers-sweep {}: logging unavailable: {err}", core_version());
        }
    }

    let conn = match open_db(&db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=trigger module=cli status=error error={err}");
            eprintln!("failed to open database `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };

    let clock = SystemClock;
    let outcome = SweepService::new(&conn, &clock).run();

    match serde_json::to_string(&outcome) {
        Ok(body) => println!("{body}"),
        Err(err) => {
            eprintln!("failed to encode sweep outcome: {err}");
            return ExitCode::FAILURE;
        }
    }

    if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
