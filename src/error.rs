use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use tracing::error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Error taxonomy shared by the store, the services and the HTTP boundary.
#[derive(Debug, Display, PartialEq, Eq)]
pub enum AppError {
    /// Malformed input that never reached the service layer (bad date, bad id).
    #[display(fmt = "{}", _0)]
    BadRequest(String),

    /// A temporal or field invariant was violated.
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    NotFound(String),

    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// Missing, invalid or expired credential.
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Persistence failure. The detail is logged, never sent to the client.
    #[display(fmt = "store error: {}", _0)]
    Store(String),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Store(detail) => {
                error!(error = %detail, "Store failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

/// MySQL `ER_DUP_ENTRY`. SQLSTATE 23000 alone also covers FK and NOT NULL failures.
const ER_DUP_ENTRY: u16 = 1062;

fn from_mysql_error(number: u16, message: &str) -> AppError {
    match number {
        ER_DUP_ENTRY => AppError::Conflict("record already exists".to_string()),
        _ => AppError::Store(format!("mysql error {number}: {message}")),
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::not_found("record"),
            sqlx::Error::Database(db_err) => {
                match db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
                    Some(mysql_err) => from_mysql_error(mysql_err.number(), mysql_err.message()),
                    None => AppError::Store(e.to_string()),
                }
            }
            _ => AppError::Store(e.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        AppError::Unauthorized(format!("invalid or expired token: {e}"))
    }
}
