//! Health check endpoint.

use actix_web::{HttpResponse, web};
use yatube_infra::DatabaseConnections;

use crate::state::AppState;

/// Health check endpoint - reports server status and storage backend.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let storage = match &state.db {
        Some(db) => storage_status(db).await,
        None => "in-memory",
    };

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(feature = "postgres")]
async fn storage_status(db: &DatabaseConnections) -> &'static str {
    if db.ping().await {
        "postgres"
    } else {
        "postgres-unreachable"
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_status(_db: &DatabaseConnections) -> &'static str {
    "postgres-unreachable"
}
