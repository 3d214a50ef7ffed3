// ABOUTME: Health check endpoint
// ABOUTME: Reports service status and verifies the database answers

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::warn;

use crate::db::DbState;

pub async fn health_check(State(db): State<DbState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&db.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!("Database health check failed: {}", e);
            "unavailable"
        }
    };

    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().timestamp(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "docuapp",
        "database": database
    }))
}
