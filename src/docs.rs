use crate::model::{
    attendance_record::AttendanceRecordResponse,
    role::Role,
    user::{UserPatch, UserResponse},
};
use crate::models::{ClockInReq, ClockOutReq, LoginReqDto, LoginResponse, RecordReq, SignUpReq};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance API",
        version = "0.1.0",
        description = r#"
## Attendance tracking

Users clock in and out once per calendar day; administrators query records across users.

### Features
- **Clock-in / clock-out** with temporal checks (no future times, clock-out not before clock-in)
- **Own records**: list, fetch by id or by day, update, delete
- **Admin queries** by day, by department, or both, plus the user directory

### Security
Protected endpoints take a JWT, either as `Authorization: Bearer <token>` or the `token` cookie set at login.
Admin endpoints additionally require the `admin` role.

### Errors
Error bodies are JSON strings: 400 bad input, 401 unauthenticated, 403 not admin,
404 not found, 409 conflict, 500 internal.
"#,
    ),
    paths(
        crate::auth::handlers::sign_up,
        crate::auth::handlers::login,
        crate::auth::handlers::logout,
        crate::auth::handlers::update_me,
        crate::auth::handlers::delete_me,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::create_record,
        crate::api::attendance::list_records,
        crate::api::attendance::get_record,
        crate::api::attendance::get_record_by_date,
        crate::api::attendance::update_record,
        crate::api::attendance::delete_record,

        crate::api::admin::records_by_date,
        crate::api::admin::records_by_department,
        crate::api::admin::records_by_date_and_department,
        crate::api::admin::list_users
    ),
    components(
        schemas(
            SignUpReq,
            LoginReqDto,
            LoginResponse,
            UserPatch,
            UserResponse,
            Role,
            ClockInReq,
            ClockOutReq,
            RecordReq,
            AttendanceRecordResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Sign-up, login and account APIs"),
        (name = "Attendance", description = "Own attendance record APIs"),
        (name = "Admin", description = "Cross-user attendance queries"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();

        for expected in [
            "/auth/login",
            "/attendance-records/clock-in",
            "/attendance-records/date/{date}",
            "/adminrecords/date-department",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }
}
