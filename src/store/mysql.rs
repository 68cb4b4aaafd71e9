use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};
use tracing::{debug, instrument};

use super::{RecordStore, UserStore, day_window};
use crate::error::{AppError, Result};
use crate::model::{
    attendance_record::{AttendanceRecord, NewRecord, RecordPatch, RecordWithUser},
    role::Role,
    user::{NewUser, User, UserPatch},
};

const RECORD_COLUMNS: &str = "id, user_id, clock_in_time, clock_out_time, created_at, updated_at";

const USER_COLUMNS: &str = "id, email, password, department, name, role, created_at, updated_at";

const JOINED_SELECT: &str = r#"
    SELECT
        r.id, r.user_id, r.clock_in_time, r.clock_out_time, r.created_at, r.updated_at,
        u.email AS user_email,
        u.password AS user_password,
        u.department AS user_department,
        u.name AS user_name,
        u.role AS user_role,
        u.created_at AS user_created_at,
        u.updated_at AS user_updated_at
    FROM attendance_records r
    JOIN users u ON u.id = r.user_id
"#;

/// Flat row of the record/user join, split back into its two halves.
#[derive(FromRow)]
struct JoinedRow {
    id: u64,
    user_id: u64,
    clock_in_time: DateTime<Utc>,
    clock_out_time: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    user_email: String,
    user_password: String,
    user_department: String,
    user_name: String,
    #[sqlx(try_from = "String")]
    user_role: Role,
    user_created_at: DateTime<Utc>,
    user_updated_at: DateTime<Utc>,
}

impl From<JoinedRow> for RecordWithUser {
    fn from(row: JoinedRow) -> Self {
        Self {
            record: AttendanceRecord {
                id: row.id,
                user_id: row.user_id,
                clock_in_time: row.clock_in_time,
                clock_out_time: row.clock_out_time,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            user: User {
                id: row.user_id,
                email: row.user_email,
                password: row.user_password,
                department: row.user_department,
                name: row.user_name,
                role: row.user_role,
                created_at: row.user_created_at,
                updated_at: row.user_updated_at,
            },
        }
    }
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_joined(
        &self,
        builder: &mut QueryBuilder<'_, MySql>,
    ) -> Result<Vec<RecordWithUser>> {
        debug!(sql = %builder.sql(), "Fetching joined records");

        let rows = builder
            .build_query_as::<JoinedRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(RecordWithUser::from).collect())
    }
}

#[async_trait]
impl RecordStore for MySqlStore {
    #[instrument(skip(self, record), fields(user_id = record.user_id))]
    async fn create(&self, record: NewRecord) -> Result<AttendanceRecord> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (user_id, clock_in_time, clock_out_time, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.user_id)
        .bind(record.clock_in_time)
        .bind(record.clock_out_time)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(record.user_id, result.last_insert_id()).await
    }

    async fn get_by_date(
        &self,
        user_id: u64,
        date: DateTime<FixedOffset>,
    ) -> Result<AttendanceRecord> {
        let window = day_window(date);

        sqlx::query_as::<_, AttendanceRecord>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM attendance_records
            WHERE user_id = ? AND clock_in_time >= ? AND clock_in_time < ?
            ORDER BY id
            LIMIT 1
            "#
        ))
        .bind(user_id)
        .bind(window.start)
        .bind(window.end)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("attendance record"))
    }

    async fn get_by_id(&self, user_id: u64, record_id: u64) -> Result<AttendanceRecord> {
        sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE user_id = ? AND id = ?"
        ))
        .bind(user_id)
        .bind(record_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("attendance record"))
    }

    async fn get_all(&self, user_id: u64) -> Result<Vec<AttendanceRecord>> {
        let records = sqlx::query_as::<_, AttendanceRecord>(&format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records WHERE user_id = ? ORDER BY created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn get_all_by_date(&self, date: DateTime<FixedOffset>) -> Result<Vec<RecordWithUser>> {
        let window = day_window(date);

        let mut builder = QueryBuilder::<MySql>::new(JOINED_SELECT);
        builder
            .push(" WHERE r.clock_in_time >= ")
            .push_bind(window.start)
            .push(" AND r.clock_in_time < ")
            .push_bind(window.end)
            .push(" ORDER BY r.id");

        self.fetch_joined(&mut builder).await
    }

    async fn get_all_by_department(&self, department: &str) -> Result<Vec<RecordWithUser>> {
        let mut builder = QueryBuilder::<MySql>::new(JOINED_SELECT);
        builder
            .push(" WHERE u.department = ")
            .push_bind(department.to_string())
            .push(" ORDER BY r.id");

        self.fetch_joined(&mut builder).await
    }

    async fn get_all_by_date_and_department(
        &self,
        date: DateTime<FixedOffset>,
        department: &str,
    ) -> Result<Vec<RecordWithUser>> {
        let window = day_window(date);

        let mut builder = QueryBuilder::<MySql>::new(JOINED_SELECT);
        builder
            .push(" WHERE r.clock_in_time >= ")
            .push_bind(window.start)
            .push(" AND r.clock_in_time < ")
            .push_bind(window.end)
            .push(" AND u.department = ")
            .push_bind(department.to_string())
            .push(" ORDER BY r.id");

        self.fetch_joined(&mut builder).await
    }

    async fn get_all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        patch: RecordPatch,
        user_id: u64,
        record_id: u64,
    ) -> Result<AttendanceRecord> {
        let mut builder = QueryBuilder::<MySql>::new("UPDATE attendance_records SET ");
        let mut set = builder.separated(", ");

        if let Some(clock_in_time) = patch.clock_in_time {
            set.push("clock_in_time = ").push_bind_unseparated(clock_in_time);
        }
        if let Some(clock_out_time) = patch.clock_out_time {
            set.push("clock_out_time = ").push_bind_unseparated(clock_out_time);
        }
        // always touched, so a matching row is never reported as unaffected
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        builder
            .push(" WHERE id = ")
            .push_bind(record_id)
            .push(" AND user_id = ")
            .push_bind(user_id);

        debug!(sql = %builder.sql(), "Updating attendance record");

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("attendance record"));
        }

        self.get_by_id(user_id, record_id).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: u64, record_id: u64) -> Result<()> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE id = ? AND user_id = ?")
            .bind(record_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("attendance record"));
        }

        Ok(())
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password, department, name, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.department)
        .bind(&user.name)
        .bind(user.role.as_ref())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict("email is already in use".to_string()),
            other => other,
        })?;

        self.get_user_by_id(result.last_insert_id()).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    async fn get_user_by_id(&self, user_id: u64) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("user"))
    }

    #[instrument(skip(self, patch))]
    async fn update_user(&self, user_id: u64, patch: UserPatch) -> Result<User> {
        let mut builder = QueryBuilder::<MySql>::new("UPDATE users SET ");
        let mut set = builder.separated(", ");

        if let Some(department) = patch.department {
            set.push("department = ").push_bind_unseparated(department);
        }
        if let Some(name) = patch.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        set.push("updated_at = ").push_bind_unseparated(Utc::now());

        builder.push(" WHERE id = ").push_bind(user_id);

        let result = builder.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user"));
        }

        self.get_user_by_id(user_id).await
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, user_id: u64) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM attendance_records WHERE user_id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(AppError::not_found("user"));
        }

        tx.commit().await?;
        Ok(())
    }
}
