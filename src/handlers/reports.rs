use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Extension,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::AppState;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::report::ReportRequest;

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub applicator_id: Option<Uuid>,
}

/// GET /api/reports/:jurisdiction/pdf
///
/// Tenant comes from the token, never from the query string.
pub async fn report_pdf(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(jurisdiction): Path<String>,
    params: Result<Query<ReportParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let request = ReportRequest {
        jurisdiction,
        date_from: params.date_from,
        date_to: params.date_to,
        customer_id: params.customer_id,
        applicator_id: params.applicator_id,
    };

    let report = state
        .reports
        .generate(user.tenant_id, &request, Utc::now())
        .await?;

    tracing::info!(
        "User {} downloaded {} ({} pages, {} records)",
        user.user_id,
        report.filename,
        report.page_count(),
        report.record_count
    );

    let disposition = format!("attachment; filename=\"{}\"", report.filename);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, report.bytes.len())
        .body(Body::from(report.bytes))
        .map_err(|e| ApiError::internal_server_error(e.to_string()))
}
