use crate::{
    error::AppError,
    model::{attendance_record::AttendanceRecordResponse, user::UserResponse},
    models::{DateDepartmentQuery, DateQuery, DepartmentQuery},
    services::attendance::RecordService,
    utils::date::parse_day,
};
use actix_web::{HttpResponse, web};
use tracing::debug;

/// Records of every user clocked in on a day
#[utoipa::path(
    get,
    path = "/adminrecords/date",
    params(DateQuery),
    responses(
        (status = 200, description = "Records with their owners", body = [AttendanceRecordResponse]),
        (status = 400, description = "Malformed date", body = String,
            example = json!("invalid date format, expected YYYY-MM-DD")),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn records_by_date(
    records: web::Data<RecordService>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_day(&query.date)?;
    let found = records.get_records_by_date(date).await?;

    debug!(date = %query.date, count = found.len(), "Admin records by date");
    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/adminrecords/department",
    params(DepartmentQuery),
    responses(
        (status = 200, description = "Records of a department", body = [AttendanceRecordResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn records_by_department(
    records: web::Data<RecordService>,
    query: web::Query<DepartmentQuery>,
) -> Result<HttpResponse, AppError> {
    let found = records.get_records_by_department(&query.department).await?;

    debug!(department = %query.department, count = found.len(), "Admin records by department");
    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/adminrecords/date-department",
    params(DateDepartmentQuery),
    responses(
        (status = 200, description = "Records of a department on a day", body = [AttendanceRecordResponse]),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn records_by_date_and_department(
    records: web::Data<RecordService>,
    query: web::Query<DateDepartmentQuery>,
) -> Result<HttpResponse, AppError> {
    let date = parse_day(&query.date)?;
    let found = records
        .get_records_by_date_and_department(date, &query.department)
        .await?;

    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    get,
    path = "/adminrecords/users",
    responses(
        (status = 200, description = "All users by id", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(records: web::Data<RecordService>) -> Result<HttpResponse, AppError> {
    let users = records.get_all_users().await?;
    Ok(HttpResponse::Ok().json(users))
}
