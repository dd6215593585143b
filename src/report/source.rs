use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{ApplicationRecord, ApplicationStatus};
use crate::database::DatabaseError;

/// Tenant-scoped fetch parameters. Dates are inclusive calendar days in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    pub tenant_id: Uuid,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub applicator_id: Option<Uuid>,
    pub status: ApplicationStatus,
}

impl ReportQuery {
    /// Half-open timestamp window `[date_from 00:00, date_to + 1 day 00:00)`.
    /// The end is `None` when `date_to` is the last representable day.
    pub fn window(&self) -> (DateTime<Utc>, Option<DateTime<Utc>>) {
        let start = self.date_from.and_time(NaiveTime::MIN).and_utc();
        let end = self
            .date_to
            .succ_opt()
            .map(|next| next.and_time(NaiveTime::MIN).and_utc());
        (start, end)
    }

    pub fn matches(&self, tenant_id: Uuid, status: ApplicationStatus, record: &ApplicationRecord) -> bool {
        let (start, end) = self.window();
        tenant_id == self.tenant_id
            && status == self.status
            && record.applied_at >= start
            && end.map_or(true, |end| record.applied_at < end)
            && self.customer_id.map_or(true, |id| record.customer.id == id)
            && self.applicator_id.map_or(true, |id| record.applicator.id == id)
    }
}

/// Where report data comes from. Implementations must scope every call to
/// the given tenant and return applications ordered by timestamp descending.
#[async_trait]
pub trait ApplicationSource: Send + Sync {
    async fn fetch_applications(&self, query: &ReportQuery) -> Result<Vec<ApplicationRecord>, DatabaseError>;

    async fn customer_exists(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError>;

    async fn applicator_exists(&self, tenant_id: Uuid, applicator_id: Uuid) -> Result<bool, DatabaseError>;
}

/// Application row as held by [`MemoryApplicationSource`], with the
/// ownership and status columns the report itself never sees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredApplication {
    pub tenant_id: Uuid,
    pub status: ApplicationStatus,
    #[serde(flatten)]
    pub record: ApplicationRecord,
}

/// In-process source used by the CLI and tests.
#[derive(Debug, Default)]
pub struct MemoryApplicationSource {
    rows: RwLock<Vec<StoredApplication>>,
}

impl MemoryApplicationSource {
    pub fn new(rows: Vec<StoredApplication>) -> Self {
        Self { rows: RwLock::new(rows) }
    }

    pub fn insert(&self, row: StoredApplication) -> Result<(), DatabaseError> {
        self.rows.write().map_err(|_| poisoned())?.push(row);
        Ok(())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<StoredApplication>>, DatabaseError> {
        self.rows.read().map_err(|_| poisoned())
    }
}

fn poisoned() -> DatabaseError {
    DatabaseError::QueryError("in-memory store poisoned".to_string())
}

#[async_trait]
impl ApplicationSource for MemoryApplicationSource {
    async fn fetch_applications(&self, query: &ReportQuery) -> Result<Vec<ApplicationRecord>, DatabaseError> {
        let rows = self.read()?;
        let mut records: Vec<ApplicationRecord> = rows
            .iter()
            .filter(|row| query.matches(row.tenant_id, row.status, &row.record))
            .map(|row| row.record.clone())
            .collect();
        records.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
        Ok(records)
    }

    async fn customer_exists(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<bool, DatabaseError> {
        let rows = self.read()?;
        Ok(rows
            .iter()
            .any(|row| row.tenant_id == tenant_id && row.record.customer.id == customer_id))
    }

    async fn applicator_exists(&self, tenant_id: Uuid, applicator_id: Uuid) -> Result<bool, DatabaseError> {
        let rows = self.read()?;
        Ok(rows
            .iter()
            .any(|row| row.tenant_id == tenant_id && row.record.applicator.id == applicator_id))
    }
}
