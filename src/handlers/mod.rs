// Route table
//
// Public:    GET /, GET /health
// Protected: GET /api/reports/:jurisdiction/pdf (JWT required)

pub mod reports;
pub mod system;

use std::sync::Arc;

use axum::{http::HeaderValue, middleware, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::middleware::jwt_auth_middleware;
use crate::report::ReportGenerator;

#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportGenerator>,
    /// False when records come from memory rather than Postgres
    pub database_enabled: bool,
}

impl AppState {
    pub fn new(reports: ReportGenerator, database_enabled: bool) -> Self {
        Self {
            reports: Arc::new(reports),
            database_enabled,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/reports/:jurisdiction/pdf", get(reports::report_pdf))
        .route_layer(middleware::from_fn(jwt_auth_middleware));

    let app = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(protected)
        .with_state(state)
        .layer(cors_layer());

    if config::config().api.enable_request_logging {
        app.layer(TraceLayer::new_for_http())
    } else {
        app
    }
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new().allow_origin(origins)
}
