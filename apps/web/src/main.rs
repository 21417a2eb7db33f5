//! # Yatube Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use yatube_core::ports::{PasswordHasher, SessionTokens};
use yatube_infra::{Argon2Hasher, JwtSessionTokens};

mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let telemetry_config = TelemetryConfig::from_env();
    init_telemetry(&telemetry_config);

    let config = AppConfig::from_env();

    tracing::info!(
        "Starting {} on {}:{}",
        telemetry_config.service_name,
        config.host,
        config.port
    );

    let state = AppState::new(config.database.as_ref()).await;

    let tokens: Arc<dyn SessionTokens> = Arc::new(JwtSessionTokens::new(config.jwt.clone()));
    let passwords: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());
    let session = config.session.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .wrap(RequestIdMiddleware)
            .app_data(web::Data::new(state.clone()))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(web::Data::new(passwords.clone()))
            .app_data(web::Data::new(session.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
