use crate::{
    api::{admin, attendance},
    auth::{
        handlers,
        middleware::{admin_middleware, auth_middleware},
    },
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{
    middleware::{Condition, from_fn},
    web,
};
use tracing::warn;

type Limiter = Condition<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Replenish interval for one request. Governor rejects a zero period.
fn replenish_period_ms(per_min: u32) -> u64 {
    (60_000 / u64::from(per_min.max(1))).max(1)
}

/// Per-IP limiter; a rate of 0 switches it off.
fn build_limiter(requests_per_min: u32) -> Limiter {
    let per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(replenish_period_ms(per_min))
        .burst_size(per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Invalid rate limit, using governor defaults");
            GovernorConfig::default()
        });

    Condition::new(requests_per_min > 0, Governor::new(&cfg))
}

fn bad_request(err: impl std::fmt::Display) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // extractor failures surface as 400 with a JSON string body
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _| bad_request(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _| bad_request(err)));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .wrap(build_limiter(config.rate_auth_per_min))
            .route("/signup", web::post().to(handlers::sign_up))
            .route("/login", web::post().to(handlers::login))
            .route("/logout", web::post().to(handlers::logout)),
    );

    // Protected routes
    cfg.service(
        web::scope("/users")
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::resource("/me")
                    .route(web::put().to(handlers::update_me))
                    .route(web::delete().to(handlers::delete_me)),
            ),
    );

    cfg.service(
        web::scope("/attendance-records")
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_protected_per_min))
            // /attendance-records
            .service(
                web::resource("")
                    .route(web::get().to(attendance::list_records))
                    .route(web::post().to(attendance::create_record)),
            )
            .service(web::resource("/clock-in").route(web::post().to(attendance::clock_in)))
            .service(web::resource("/clock-out").route(web::post().to(attendance::clock_out)))
            // /attendance-records/date/{date}
            .service(
                web::resource("/date/{date}").route(web::get().to(attendance::get_record_by_date)),
            )
            // /attendance-records/{record_id}
            .service(
                web::resource("/{record_id}")
                    .route(web::get().to(attendance::get_record))
                    .route(web::put().to(attendance::update_record))
                    .route(web::delete().to(attendance::delete_record)),
            ),
    );

    // Admin routes, identity first then role
    cfg.service(
        web::scope("/adminrecords")
            .wrap(from_fn(admin_middleware))
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_protected_per_min))
            .route("/date", web::get().to(admin::records_by_date))
            .route("/department", web::get().to(admin::records_by_department))
            .route(
                "/date-department",
                web::get().to(admin::records_by_date_and_department),
            )
            .route("/users", web::get().to(admin::list_users)),
    );
}

// LOGIN
//  └─ token (TOKEN_TTL, default 12h), returned in the body and as the `token` cookie

// API REQUEST
//  └─ Authorization: Bearer <token>  or  Cookie: token=<token>

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replenish_period_never_reaches_zero() {
        assert_eq!(replenish_period_ms(60), 1_000);
        assert_eq!(replenish_period_ms(1_000), 60);
        assert_eq!(replenish_period_ms(60_000), 1);
        assert_eq!(replenish_period_ms(120_000), 1);
        assert_eq!(replenish_period_ms(0), 60_000);
    }

    #[test]
    fn high_rates_still_build_a_config() {
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(replenish_period_ms(120_000))
            .burst_size(120_000)
            .key_extractor(PeerIpKeyExtractor)
            .finish();
        assert!(cfg.is_some());
    }
}
