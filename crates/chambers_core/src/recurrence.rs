//! Free-text due-date interpretation.
//!
//! # Responsibility
//! - Turn an obligation's due-date description into a concrete calendar
//!   date, or `None` when the text matches no known pattern.
//!
//! # Invariants
//! - [`interpret`] is total: it never panics and never errors, for any
//!   input text.
//! - Matching is case-insensitive; the first matching rule wins, in the
//!   order listed below.
//!
//! Rules:
//! 1. `"<day><ordinal?> <MonthName>"`: that day/month in the reference
//!    year, independent of today.
//! 2. `"<day><ordinal?> of every month"`: next occurrence at or after
//!    today, rolling into the next month once passed.
//! 3. contains `"salary payment"`: day 7 of the month after the current
//!    one.
//! 4. contains `"last day of month"`: last calendar day of the current
//!    month.
//! 5. contains `"first quarter"`: March 31 of the reference year.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static DAY_OF_EVERY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+of\s+every\s+month\b")
        .expect("day-of-every-month pattern must compile")
});

static DAY_AND_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(january|february|march|april|may|june|july|august|september|october|november|december)\b",
    )
    .expect("day-and-month pattern must compile")
});

/// Interprets a due-date description against a reference year and today's
/// date. Returns `None` for unrecognized text and calendar-impossible
/// dates (e.g. "31st February").
pub fn interpret(description: &str, reference_year: i32, today: NaiveDate) -> Option<NaiveDate> {
    let text = description.trim();
    if text.is_empty() {
        return None;
    }
    let lowered = text.to_lowercase();

    // "21st of every month" never reaches this rule: it requires a month
    // name immediately after the day.
    if let Some(captures) = DAY_AND_MONTH.captures(text) {
        let day: u32 = captures.get(1)?.as_str().parse().ok()?;
        let month = month_number(captures.get(2)?.as_str())?;
        return NaiveDate::from_ymd_opt(reference_year, month, day);
    }

    if let Some(captures) = DAY_OF_EVERY_MONTH.captures(text) {
        let day: u32 = captures.get(1)?.as_str().parse().ok()?;
        return next_day_of_month(day, today);
    }

    if lowered.contains("salary payment") {
        let next_month = first_of_next_month(today);
        return NaiveDate::from_ymd_opt(next_month.year(), next_month.month(), 7);
    }

    if lowered.contains("last day of month") {
        return first_of_next_month(today).pred_opt();
    }

    if lowered.contains("first quarter") {
        return NaiveDate::from_ymd_opt(reference_year, 3, 31);
    }

    None
}

/// Next occurrence of `day` as a day-of-month, at or after `today`.
/// Months without that day (e.g. the 31st in April) are skipped.
fn next_day_of_month(day: u32, today: NaiveDate) -> Option<NaiveDate> {
    if let Some(date) = NaiveDate::from_ymd_opt(today.year(), today.month(), day) {
        if date >= today {
            return Some(date);
        }
    }

    let mut cursor = first_of_next_month(today);
    // 12 iterations is enough: any day 1..=31 exists at least once per year.
    for _ in 0..12 {
        if let Some(date) = NaiveDate::from_ymd_opt(cursor.year(), cursor.month(), day) {
            return Some(date);
        }
        cursor = first_of_next_month(cursor);
    }
    None
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of a month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn month_number(name: &str) -> Option<u32> {
    match name.to_lowercase().as_str() {
        "january" => Some(1),
        "february" => Some(2),
        "march" => Some(3),
        "april" => Some(4),
        "may" => Some(5),
        "june" => Some(6),
        "july" => Some(7),
        "august" => Some(8),
        "september" => Some(9),
        "october" => Some(10),
        "november" => Some(11),
        "december" => Some(12),
        _ => None,
    }
}
