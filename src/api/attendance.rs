use crate::{
    auth::auth::AuthUser,
    error::AppError,
    model::attendance_record::{AttendanceRecordResponse, RecordDraft},
    models::{ClockInReq, ClockOutReq, RecordReq},
    services::attendance::RecordService,
    utils::date::parse_day,
};
use actix_web::{HttpResponse, web};

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/attendance-records/clock-in",
    request_body = ClockInReq,
    responses(
        (status = 201, description = "Clocked in", body = AttendanceRecordResponse),
        (status = 400, description = "Missing or future clock-in time", body = String,
            example = json!("clock-in time cannot be in the future")),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Already clocked in for this day")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    records: web::Data<RecordService>,
    payload: web::Json<ClockInReq>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .clock_in(auth.user_id(), payload.into_inner().clock_in_time)
        .await?;
    Ok(HttpResponse::Created().json(record))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/attendance-records/clock-out",
    request_body = ClockOutReq,
    responses(
        (status = 200, description = "Clocked out", body = AttendanceRecordResponse),
        (status = 400, description = "Missing, future or out-of-order clock-out time", body = String,
            example = json!("clock-out time cannot be before clock-in time")),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No open record for that day")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    records: web::Data<RecordService>,
    payload: web::Json<ClockOutReq>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .clock_out(auth.user_id(), payload.into_inner().clock_out_time)
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

/// Create a record directly
#[utoipa::path(
    post,
    path = "/attendance-records",
    request_body = RecordReq,
    responses(
        (status = 201, description = "Record created", body = AttendanceRecordResponse),
        (status = 400, description = "Invalid times"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn create_record(
    auth: AuthUser,
    records: web::Data<RecordService>,
    payload: web::Json<RecordReq>,
) -> Result<HttpResponse, AppError> {
    let patch = payload.into_inner().into_patch();
    let draft = RecordDraft {
        user_id: auth.user_id(),
        clock_in_time: patch.clock_in_time,
        clock_out_time: patch.clock_out_time,
    };

    let record = records.create_record(draft).await?;
    Ok(HttpResponse::Created().json(record))
}

/// All records of the caller, oldest first
#[utoipa::path(
    get,
    path = "/attendance-records",
    responses(
        (status = 200, description = "Own records", body = [AttendanceRecordResponse]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_records(
    auth: AuthUser,
    records: web::Data<RecordService>,
) -> Result<HttpResponse, AppError> {
    let all = records.get_all_records(auth.user_id()).await?;
    Ok(HttpResponse::Ok().json(all))
}

#[utoipa::path(
    get,
    path = "/attendance-records/{record_id}",
    params(("record_id" = u64, Path, description = "Record ID")),
    responses(
        (status = 200, description = "Record found", body = AttendanceRecordResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such record owned by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_record(
    auth: AuthUser,
    records: web::Data<RecordService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let record = records.get_record(auth.user_id(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    get,
    path = "/attendance-records/date/{date}",
    params(("date" = String, Path, description = "Day in YYYY-MM-DD")),
    responses(
        (status = 200, description = "Record for that day", body = AttendanceRecordResponse),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No record that day")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn get_record_by_date(
    auth: AuthUser,
    records: web::Data<RecordService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let date = parse_day(&path)?;
    let record = records.get_record_by_date(auth.user_id(), date).await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    put,
    path = "/attendance-records/{record_id}",
    params(("record_id" = u64, Path, description = "Record ID")),
    request_body = RecordReq,
    responses(
        (status = 200, description = "Record updated", body = AttendanceRecordResponse),
        (status = 400, description = "Invalid times or empty body"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such record owned by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn update_record(
    auth: AuthUser,
    records: web::Data<RecordService>,
    path: web::Path<u64>,
    payload: web::Json<RecordReq>,
) -> Result<HttpResponse, AppError> {
    let record = records
        .update_record(
            payload.into_inner().into_patch(),
            auth.user_id(),
            path.into_inner(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(record))
}

#[utoipa::path(
    delete,
    path = "/attendance-records/{record_id}",
    params(("record_id" = u64, Path, description = "Record ID")),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No such record owned by the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    records: web::Data<RecordService>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    records
        .delete_record(auth.user_id(), path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
