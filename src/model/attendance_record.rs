use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{User, UserResponse};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub user_id: u64,
    pub clock_in_time: DateTime<Utc>,
    /// Unset while the record is open
    pub clock_out_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Working copy of a record before it reaches the store. Both times are
/// optional so the validator can report a missing one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordDraft {
    pub user_id: u64,
    pub clock_in_time: Option<DateTime<Utc>>,
    pub clock_out_time: Option<DateTime<Utc>>,
}

impl RecordDraft {
    pub fn clock_in(user_id: u64, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            clock_in_time: Some(at),
            clock_out_time: None,
        }
    }
}

impl From<&AttendanceRecord> for RecordDraft {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            user_id: record.user_id,
            clock_in_time: Some(record.clock_in_time),
            clock_out_time: record.clock_out_time,
        }
    }
}

/// Record ready for insertion, after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub user_id: u64,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub clock_in_time: Option<DateTime<Utc>>,
    pub clock_out_time: Option<DateTime<Utc>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.clock_in_time.is_none() && self.clock_out_time.is_none()
    }

    /// Overlay the patch on a stored record.
    pub fn merged_onto(&self, record: &AttendanceRecord) -> RecordDraft {
        RecordDraft {
            user_id: record.user_id,
            clock_in_time: self.clock_in_time.or(Some(record.clock_in_time)),
            clock_out_time: self.clock_out_time.or(record.clock_out_time),
        }
    }
}

/// A record joined with its owning user, as returned by the admin queries.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordWithUser {
    pub record: AttendanceRecord,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 7,
    "user_id": 1,
    "clock_in_time": "2024-01-05T09:00:00Z",
    "clock_out_time": "2024-01-05T17:00:00Z",
    "created_at": "2024-01-05T09:00:01Z",
    "updated_at": "2024-01-05T17:00:02Z"
}))]
pub struct AttendanceRecordResponse {
    pub id: u64,
    pub user_id: u64,
    #[schema(value_type = String, format = "date-time")]
    pub clock_in_time: DateTime<Utc>,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub clock_out_time: Option<DateTime<Utc>>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
    /// Present on admin queries only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserResponse>,
}

impl From<AttendanceRecord> for AttendanceRecordResponse {
    fn from(record: AttendanceRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            clock_in_time: record.clock_in_time,
            clock_out_time: record.clock_out_time,
            created_at: record.created_at,
            updated_at: record.updated_at,
            user: None,
        }
    }
}

impl From<RecordWithUser> for AttendanceRecordResponse {
    fn from(joined: RecordWithUser) -> Self {
        Self {
            user: Some(joined.user.into()),
            ..joined.record.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> AttendanceRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 5, 9, 0, 0).unwrap();
        AttendanceRecord {
            id: 3,
            user_id: 1,
            clock_in_time: at,
            clock_out_time: None,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn patch_keeps_stored_values_it_does_not_touch() {
        let out = Utc.with_ymd_and_hms(2024, 1, 5, 17, 0, 0).unwrap();
        let patch = RecordPatch {
            clock_in_time: None,
            clock_out_time: Some(out),
        };

        let merged = patch.merged_onto(&record());
        assert_eq!(merged.clock_in_time, Some(record().clock_in_time));
        assert_eq!(merged.clock_out_time, Some(out));
    }

    #[test]
    fn user_scoped_projection_omits_user() {
        let json = serde_json::to_value(AttendanceRecordResponse::from(record())).unwrap();
        assert!(json.get("user").is_none());
        assert!(json["clock_out_time"].is_null());
    }
}
