use crate::{
    auth::{auth::AuthUser, middleware::TOKEN_COOKIE, service::AuthService},
    config::Config,
    error::AppError,
    model::user::{UserPatch, UserResponse},
    models::{LoginReqDto, LoginResponse, SignUpReq},
};
use actix_web::{
    HttpResponse,
    cookie::{Cookie, SameSite, time::Duration},
    web,
};
use tracing::info;

fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, value)
        .path("/")
        .secure(config.cookie_secure)
        .http_only(true)
        .same_site(if config.cookie_secure {
            SameSite::None
        } else {
            SameSite::Lax
        })
        .max_age(Duration::seconds(config.token_ttl as i64))
        .finish();

    if let Some(domain) = &config.api_domain {
        cookie.set_domain(domain.clone());
    }

    cookie
}

/// User registration handler
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpReq,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid email or password"),
        (status = 409, description = "Email already in use")
    ),
    tag = "Auth"
)]
pub async fn sign_up(
    auth: web::Data<AuthService>,
    payload: web::Json<SignUpReq>,
) -> Result<HttpResponse, AppError> {
    let user = auth.sign_up(payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Issues a session token, both in the body and as the `token` cookie
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Invalid email or password format"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    auth: web::Data<AuthService>,
    payload: web::Json<LoginReqDto>,
) -> Result<HttpResponse, AppError> {
    let token = auth.log_in(payload.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(auth.config(), token.clone()))
        .json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout(auth: web::Data<AuthService>) -> HttpResponse {
    let mut cookie = session_cookie(auth.config(), String::new());
    cookie.make_removal();

    HttpResponse::Ok().cookie(cookie).finish()
}

#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UserPatch,
    responses(
        (status = 200, description = "Account updated", body = UserResponse),
        (status = 400, description = "Nothing to update"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_me(
    user: AuthUser,
    auth: web::Data<AuthService>,
    payload: web::Json<UserPatch>,
) -> Result<HttpResponse, AppError> {
    let updated = auth
        .update_account(user.user_id(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes the account and every attendance record it owns
#[utoipa::path(
    delete,
    path = "/users/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn delete_me(
    user: AuthUser,
    auth: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    auth.delete_account(user.user_id()).await?;
    info!(user_id = user.user_id(), "Account removed");

    let mut cookie = session_cookie(auth.config(), String::new());
    cookie.make_removal();

    Ok(HttpResponse::NoContent().cookie(cookie).finish())
}
