//! Field rules for attendance records and account credentials.
//!
//! Every rule of a field runs; the first failure in field order is reported.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AppError, Result};
use crate::model::attendance_record::RecordDraft;

type Check = Option<&'static str>;

fn first_failure(checks: impl IntoIterator<Item = Check>) -> Result<()> {
    match checks.into_iter().flatten().next() {
        Some(reason) => Err(AppError::Validation(reason.to_string())),
        None => Ok(()),
    }
}

fn clock_in_checks(record: &RecordDraft, now: DateTime<Utc>) -> [Check; 2] {
    let clock_in = record.clock_in_time;

    [
        clock_in.is_none().then_some("clock-in time is required"),
        clock_in
            .filter(|t| *t > now)
            .map(|_| "clock-in time cannot be in the future"),
    ]
}

fn clock_out_checks(record: &RecordDraft, now: DateTime<Utc>) -> [Check; 3] {
    let clock_out = record.clock_out_time;

    [
        clock_out.is_none().then_some("clock-out time is required"),
        clock_out
            .filter(|t| *t > now)
            .map(|_| "clock-out time cannot be in the future"),
        clock_out
            .zip(record.clock_in_time)
            .filter(|(out, clock_in)| out < clock_in)
            .map(|_| "clock-out time cannot be before clock-in time"),
    ]
}

pub fn validate_clock_in(record: &RecordDraft, now: DateTime<Utc>) -> Result<()> {
    first_failure(clock_in_checks(record, now))
}

/// Checks the clock-out against the draft's own clock-in, whatever the
/// caller put there.
pub fn validate_clock_out(record: &RecordDraft, now: DateTime<Utc>) -> Result<()> {
    first_failure(clock_out_checks(record, now))
}

/// Both fields, clock-in first.
pub fn validate_record(record: &RecordDraft, now: DateTime<Utc>) -> Result<()> {
    first_failure(
        clock_in_checks(record, now)
            .into_iter()
            .chain(clock_out_checks(record, now)),
    )
}

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

pub fn validate_credentials(email: &str, password: &str) -> Result<()> {
    let email_len = email.chars().count();
    let password_len = password.chars().count();

    first_failure([
        email.is_empty().then_some("email is required"),
        (email_len > 100).then_some("email must be between 1 and 100 characters long"),
        (!email.is_empty() && !EMAIL_RE.is_match(email)).then_some("invalid email format"),
        password.is_empty().then_some("password is required"),
        (!password.is_empty() && !(6..=50).contains(&password_len))
            .then_some("password must be between 6 and 50 characters long"),
    ])
}
