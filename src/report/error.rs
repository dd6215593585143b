use chrono::NaiveDate;
use thiserror::Error;

use crate::database::DatabaseError;

/// Failures of a single report request. Validation variants are raised
/// before any rendering starts.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("date_to ({to}) must not precede date_from ({from})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Source(#[from] DatabaseError),

    #[error("failed to render PDF: {0}")]
    Render(String),
}

impl ReportError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ReportError::InvalidRange { .. } => "INVALID_RANGE",
            ReportError::UnknownJurisdiction(_) => "UNKNOWN_JURISDICTION",
            ReportError::NotFound(_) => "NOT_FOUND",
            ReportError::Source(_) => "SOURCE_ERROR",
            ReportError::Render(_) => "RENDER_ERROR",
        }
    }
}
