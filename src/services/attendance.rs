use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use tracing::{debug, info, instrument};

use crate::{
    error::{AppError, Result},
    model::{
        attendance_record::{
            AttendanceRecordResponse, NewRecord, RecordDraft, RecordPatch, RecordWithUser,
        },
        user::UserResponse,
    },
    store::RecordStore,
    validator::{validate_clock_in, validate_clock_out, validate_record},
};

fn project_joined(rows: Vec<RecordWithUser>) -> Vec<AttendanceRecordResponse> {
    rows.into_iter().map(AttendanceRecordResponse::from).collect()
}

/// Attendance rules on top of a [`RecordStore`]. Owner-scoped methods take the
/// acting user's id; admin queries take none and rely on the route guard.
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Fails with `Conflict` when the user already has a record on the day
    /// `time` falls on, other than `except`.
    async fn ensure_day_free(
        &self,
        user_id: u64,
        time: DateTime<FixedOffset>,
        except: Option<u64>,
    ) -> Result<()> {
        match self.store.get_by_date(user_id, time).await {
            Ok(existing) if Some(existing.id) != except => {
                info!(record_id = existing.id, "Day already has a record");
                Err(AppError::Conflict("already clocked in for this day".to_string()))
            }
            Ok(_) | Err(AppError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Opens today's record. A second clock-in on the same day conflicts.
    #[instrument(skip(self))]
    pub async fn clock_in(
        &self,
        user_id: u64,
        time: Option<DateTime<FixedOffset>>,
    ) -> Result<AttendanceRecordResponse> {
        let Some(time) = time else {
            return Err(AppError::Validation("clock-in time is required".to_string()));
        };
        let draft = RecordDraft::clock_in(user_id, time.with_timezone(&Utc));
        validate_clock_in(&draft, Utc::now())?;

        self.ensure_day_free(user_id, time, None).await?;

        let record = self
            .store
            .create(NewRecord {
                user_id,
                clock_in_time: time.with_timezone(&Utc),
                clock_out_time: None,
            })
            .await?;

        info!(record_id = record.id, "Clocked in");
        Ok(record.into())
    }

    /// Closes the open record of the day `time` falls on.
    #[instrument(skip(self))]
    pub async fn clock_out(
        &self,
        user_id: u64,
        time: Option<DateTime<FixedOffset>>,
    ) -> Result<AttendanceRecordResponse> {
        let Some(time) = time else {
            return Err(AppError::Validation("clock-out time is required".to_string()));
        };

        let open = self.store.get_by_date(user_id, time).await?;
        if open.clock_out_time.is_some() {
            return Err(AppError::NotFound(
                "no open attendance record for this day".to_string(),
            ));
        }

        let mut draft = RecordDraft::from(&open);
        draft.clock_out_time = Some(time.with_timezone(&Utc));
        validate_clock_out(&draft, Utc::now())?;

        let patch = RecordPatch {
            clock_in_time: None,
            clock_out_time: draft.clock_out_time,
        };
        let record = self.store.update(patch, user_id, open.id).await?;

        info!(record_id = record.id, "Clocked out");
        Ok(record.into())
    }

    /// Direct insert. A supplied clock-out is held to the clock-out rules.
    #[instrument(skip(self, draft))]
    pub async fn create_record(&self, draft: RecordDraft) -> Result<AttendanceRecordResponse> {
        let now = Utc::now();
        if draft.clock_out_time.is_some() {
            validate_record(&draft, now)?;
        } else {
            validate_clock_in(&draft, now)?;
        }

        let Some(clock_in_time) = draft.clock_in_time else {
            return Err(AppError::Validation("clock-in time is required".to_string()));
        };
        self.ensure_day_free(draft.user_id, clock_in_time.fixed_offset(), None).await?;

        let record = self
            .store
            .create(NewRecord {
                user_id: draft.user_id,
                clock_in_time,
                clock_out_time: draft.clock_out_time,
            })
            .await?;

        Ok(record.into())
    }

    pub async fn get_record(&self, user_id: u64, record_id: u64) -> Result<AttendanceRecordResponse> {
        Ok(self.store.get_by_id(user_id, record_id).await?.into())
    }

    pub async fn get_record_by_date(
        &self,
        user_id: u64,
        date: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecordResponse> {
        Ok(self.store.get_by_date(user_id, date).await?.into())
    }

    pub async fn get_all_records(&self, user_id: u64) -> Result<Vec<AttendanceRecordResponse>> {
        let records = self.store.get_all(user_id).await?;
        Ok(records.into_iter().map(AttendanceRecordResponse::from).collect())
    }

    pub async fn get_records_by_date(
        &self,
        date: DateTime<FixedOffset>,
    ) -> Result<Vec<AttendanceRecordResponse>> {
        Ok(project_joined(self.store.get_all_by_date(date).await?))
    }

    pub async fn get_records_by_department(
        &self,
        department: &str,
    ) -> Result<Vec<AttendanceRecordResponse>> {
        Ok(project_joined(
            self.store.get_all_by_department(department).await?,
        ))
    }

    pub async fn get_records_by_date_and_department(
        &self,
        date: DateTime<FixedOffset>,
        department: &str,
    ) -> Result<Vec<AttendanceRecordResponse>> {
        Ok(project_joined(
            self.store
                .get_all_by_date_and_department(date, department)
                .await?,
        ))
    }

    pub async fn get_all_users(&self) -> Result<Vec<UserResponse>> {
        let users = self.store.get_all_users().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Merges the patch onto the stored record and validates the result, so
    /// the clock-out is always checked against the clock-in that will be
    /// persisted.
    #[instrument(skip(self, patch))]
    pub async fn update_record(
        &self,
        patch: RecordPatch,
        user_id: u64,
        record_id: u64,
    ) -> Result<AttendanceRecordResponse> {
        if patch.is_empty() {
            return Err(AppError::BadRequest("no fields provided for update".to_string()));
        }

        let stored = self.store.get_by_id(user_id, record_id).await?;
        let merged = patch.merged_onto(&stored);
        debug!(?merged, "Validating merged record");

        let now = Utc::now();
        if let Some(clock_in_time) = patch.clock_in_time {
            validate_clock_in(&merged, now)?;
            self.ensure_day_free(user_id, clock_in_time.fixed_offset(), Some(record_id))
                .await?;
        }
        validate_clock_out(&merged, now)?;

        let record = self.store.update(patch, user_id, record_id).await?;
        Ok(record.into())
    }

    #[instrument(skip(self))]
    pub async fn delete_record(&self, user_id: u64, record_id: u64) -> Result<()> {
        self.store.delete(user_id, record_id).await?;
        info!("Attendance record deleted");
        Ok(())
    }
}
