use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use super::AppState;
use crate::database::DatabaseManager;
use crate::report::JURISDICTIONS;

pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let jurisdictions: Vec<&str> = JURISDICTIONS.iter().map(|policy| policy.code).collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "SprayLog API",
            "version": version,
            "description": "Pesticide application compliance reporting",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "reports": "/api/reports/:jurisdiction/pdf?date_from&date_to[&customer_id][&applicator_id] (protected)",
            },
            "jurisdictions": jurisdictions,
        }
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    if !state.database_enabled {
        return (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "disabled"
                }
            })),
        );
    }

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
