use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use std::sync::Arc;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod services;
mod store;
mod utils;
mod validator;


use crate::auth::service::AuthService;
use crate::docs::ApiDoc;
use crate::services::attendance::RecordService;
use crate::store::{RecordStore, mysql::MySqlStore};
use config::Config;
use db::init_db;

use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Arc::new(Config::from_env()?);

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let store = Arc::new(MySqlStore::new(
        init_db(&config.database_url, config.db_max_connections).await?,
    ));

    let auth = Data::new(AuthService::new(store.clone(), config.clone()));
    let records = Data::new(RecordService::new(store.clone()));

    let auth_for_warmup = auth.clone();
    actix_web::rt::spawn(async move {
        match store.get_all_users().await {
            Ok(users) => auth_for_warmup.warmup(&users).await,
            Err(e) => error!(error = %e, "Failed to warm up email registry"),
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(auth.clone())
            .app_data(records.clone())
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
