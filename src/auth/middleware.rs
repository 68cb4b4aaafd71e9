use crate::auth::auth::AuthUser;
use crate::auth::service::AuthService;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::AUTHORIZATION,
    web::Data,
};
use tracing::debug;

pub const TOKEN_COOKIE: &str = "token";

/// Bearer header first, then the session cookie.
fn credential(req: &ServiceRequest) -> Result<String, AppError> {
    if let Some(value) = req.headers().get(AUTHORIZATION) {
        let value = value.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;

        return value
            .strip_prefix("Bearer ")
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::Unauthorized("Authorization header must start with Bearer".to_string())
            });
    }

    req.cookie(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing credential".to_string()))
}

fn reject(req: ServiceRequest, err: AppError) -> Result<ServiceResponse<BoxBody>, Error> {
    debug!(error = %err, path = %req.path(), "Request rejected");
    Ok(req.into_response(err.error_response()))
}

pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let Some(auth) = req.app_data::<Data<AuthService>>().cloned() else {
        return Err(actix_web::error::ErrorInternalServerError(
            "Auth service missing",
        ));
    };

    let identity = match credential(&req).and_then(|token| auth.resolve_identity(&token)) {
        Ok(identity) => identity,
        Err(err) => return reject(req, err),
    };

    req.extensions_mut().insert(AuthUser(identity));

    next.call(req).await
}

/// Must run after [`auth_middleware`].
pub async fn admin_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let is_admin = req
        .extensions()
        .get::<AuthUser>()
        .map(|user| user.0.is_admin());

    match is_admin {
        Some(true) => next.call(req).await,
        Some(false) => reject(req, AppError::Forbidden("Admin only".to_string())),
        None => reject(req, AppError::Unauthorized("Missing credential".to_string())),
    }
}
