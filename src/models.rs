use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::model::{attendance_record::RecordPatch, role::Role};

#[derive(Deserialize, ToSchema)]
pub struct SignUpReq {
    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,
    #[schema(example = "hunter22")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "engineering")]
    pub department: String,
    #[serde(default)]
    #[schema(example = "Jane Doe")]
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "jane@example.com", format = "email")]
    pub email: String,
    #[schema(example = "hunter22")]
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockInReq {
    #[schema(example = "2024-01-05T09:00:00+09:00", value_type = Option<String>, format = "date-time")]
    pub clock_in_time: Option<DateTime<FixedOffset>>,
}

#[derive(Deserialize, ToSchema)]
pub struct ClockOutReq {
    #[schema(example = "2024-01-05T17:00:00+09:00", value_type = Option<String>, format = "date-time")]
    pub clock_out_time: Option<DateTime<FixedOffset>>,
}

/// Body for direct create and update of a record
#[derive(Deserialize, ToSchema)]
pub struct RecordReq {
    #[schema(example = "2024-01-05T09:00:00Z", value_type = Option<String>, format = "date-time")]
    pub clock_in_time: Option<DateTime<FixedOffset>>,
    #[schema(example = "2024-01-05T17:00:00Z", value_type = Option<String>, format = "date-time")]
    pub clock_out_time: Option<DateTime<FixedOffset>>,
}

impl RecordReq {
    pub fn into_patch(self) -> RecordPatch {
        RecordPatch {
            clock_in_time: self.clock_in_time.map(|t| t.with_timezone(&Utc)),
            clock_out_time: self.clock_out_time.map(|t| t.with_timezone(&Utc)),
        }
    }
}

#[derive(Deserialize, IntoParams)]
pub struct DateQuery {
    /// Day in YYYY-MM-DD
    pub date: String,
}

#[derive(Deserialize, IntoParams)]
pub struct DepartmentQuery {
    pub department: String,
}

#[derive(Deserialize, IntoParams)]
pub struct DateDepartmentQuery {
    /// Day in YYYY-MM-DD
    pub date: String,
    pub department: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
