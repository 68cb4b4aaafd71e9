use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::Result;
use crate::model::{
    attendance_record::{AttendanceRecord, NewRecord, RecordPatch, RecordWithUser},
    user::{NewUser, User, UserPatch},
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Persistence for attendance records. Every call is scoped by the ids the
/// caller passes in; nothing is inferred from ambient state.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, record: NewRecord) -> Result<AttendanceRecord>;

    /// First record of `user_id` whose clock-in falls on the day of `date`.
    async fn get_by_date(&self, user_id: u64, date: DateTime<FixedOffset>)
    -> Result<AttendanceRecord>;

    async fn get_by_id(&self, user_id: u64, record_id: u64) -> Result<AttendanceRecord>;

    /// Ordered by creation time, oldest first.
    async fn get_all(&self, user_id: u64) -> Result<Vec<AttendanceRecord>>;

    async fn get_all_by_date(&self, date: DateTime<FixedOffset>) -> Result<Vec<RecordWithUser>>;

    async fn get_all_by_department(&self, department: &str) -> Result<Vec<RecordWithUser>>;

    async fn get_all_by_date_and_department(
        &self,
        date: DateTime<FixedOffset>,
        department: &str,
    ) -> Result<Vec<RecordWithUser>>;

    /// Ordered by id.
    async fn get_all_users(&self) -> Result<Vec<User>>;

    /// Only touches the row matching both `record_id` and `user_id`.
    async fn update(
        &self,
        patch: RecordPatch,
        user_id: u64,
        record_id: u64,
    ) -> Result<AttendanceRecord>;

    async fn delete(&self, user_id: u64, record_id: u64) -> Result<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Conflict when the email is already registered.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    async fn get_user_by_email(&self, email: &str) -> Result<User>;

    async fn get_user_by_id(&self, user_id: u64) -> Result<User>;

    async fn update_user(&self, user_id: u64, patch: UserPatch) -> Result<User>;

    /// Removes the user and every record it owns.
    async fn delete_user(&self, user_id: u64) -> Result<()>;
}

/// Half-open `[start, end)` interval covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DayWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

/// The day `at` falls on, measured at midnight in `at`'s own offset.
pub fn day_window(at: DateTime<FixedOffset>) -> DayWindow {
    let midnight = at.date_naive().and_time(NaiveTime::MIN);
    let start = midnight - Duration::seconds(i64::from(at.offset().local_minus_utc()));
    let start = Utc.from_utc_datetime(&start);

    DayWindow {
        start,
        end: start + Duration::hours(24),
    }
}

/// A bare calendar date, anchored at UTC midnight.
pub fn date_at_utc_midnight(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}
