use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::ReportError;
use super::format::{format_address, format_date_range, format_date_time, format_long_date};
use super::group::{group_records, GroupKey, GroupingStrategy};
use super::layout::{LayoutEngine, PageGeometry, RenderedReport, ReportMeta};
use super::model::{ApplicationRecord, ApplicationStatus};
use super::pdf::write_pdf;
use super::policy::{self, JurisdictionPolicy};
use super::source::{ApplicationSource, ReportQuery};
use crate::config::ReportConfig;

/// Caller-supplied report parameters. The tenant is supplied separately.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub jurisdiction: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub customer_id: Option<Uuid>,
    pub applicator_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub title: String,
    pub empty_message: String,
    pub geometry: PageGeometry,
}

impl ReportSettings {
    pub fn from_config(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            empty_message: config.empty_message.clone(),
            geometry: PageGeometry::default(),
        }
    }
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from_config(&ReportConfig::default())
    }
}

#[derive(Debug)]
pub struct GeneratedReport {
    pub jurisdiction: &'static str,
    pub filename: String,
    pub bytes: Vec<u8>,
    pub record_count: usize,
    pub layout: RenderedReport,
}

impl GeneratedReport {
    pub fn page_count(&self) -> usize {
        self.layout.page_count()
    }
}

pub struct ReportGenerator {
    source: Arc<dyn ApplicationSource>,
    settings: ReportSettings,
}

impl ReportGenerator {
    pub fn new(source: Arc<dyn ApplicationSource>, settings: ReportSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Validate, fetch, lay out and serialize one report for `tenant_id`.
    pub async fn generate(
        &self,
        tenant_id: Uuid,
        request: &ReportRequest,
        generated_at: DateTime<Utc>,
    ) -> Result<GeneratedReport, ReportError> {
        let policy = validate(request)?;

        if let Some(customer_id) = request.customer_id {
            if !self.source.customer_exists(tenant_id, customer_id).await? {
                return Err(ReportError::NotFound(format!("customer {}", customer_id)));
            }
        }
        if let Some(applicator_id) = request.applicator_id {
            if !self.source.applicator_exists(tenant_id, applicator_id).await? {
                return Err(ReportError::NotFound(format!("applicator {}", applicator_id)));
            }
        }

        // Voided applications never appear, even when filtered by id.
        let query = ReportQuery {
            tenant_id,
            date_from: request.date_from,
            date_to: request.date_to,
            customer_id: request.customer_id,
            applicator_id: request.applicator_id,
            status: ApplicationStatus::Completed,
        };
        let records = self.source.fetch_applications(&query).await?;
        debug!("Fetched {} applications for {} report", records.len(), policy.code);

        let meta = report_meta(&self.settings, policy, request, generated_at);
        let layout = render(&records, policy, &meta, &self.settings);
        let bytes = write_pdf(&layout, &meta.title)?;

        info!(
            jurisdiction = policy.code,
            records = records.len(),
            pages = layout.page_count(),
            bytes = bytes.len(),
            "Generated compliance report"
        );

        Ok(GeneratedReport {
            jurisdiction: policy.code,
            filename: report_filename(policy.code, generated_at),
            bytes,
            record_count: records.len(),
            layout,
        })
    }
}

/// Checks that need no data access: date order, then jurisdiction.
pub fn validate(request: &ReportRequest) -> Result<&'static JurisdictionPolicy, ReportError> {
    if request.date_to < request.date_from {
        return Err(ReportError::InvalidRange {
            from: request.date_from,
            to: request.date_to,
        });
    }
    policy::lookup(&request.jurisdiction)
        .ok_or_else(|| ReportError::UnknownJurisdiction(request.jurisdiction.clone()))
}

/// Lay out `records` (timestamp descending) under `policy`.
pub fn render(
    records: &[ApplicationRecord],
    policy: &JurisdictionPolicy,
    meta: &ReportMeta,
    settings: &ReportSettings,
) -> RenderedReport {
    let mut engine = LayoutEngine::new(settings.geometry);
    engine.place_header(meta);

    if records.is_empty() {
        engine.place_placeholder(&settings.empty_message);
        return engine.finalize();
    }

    let include_location = policy.grouping == GroupingStrategy::ByDate;
    for group in group_records(policy.grouping, records) {
        match &group.key {
            GroupKey::Customer(customer) => {
                let address = format_address(customer);
                engine.place_group_header(&customer.name, Some(address.as_str()));
            }
            GroupKey::Day(day) => {
                let count = match group.records.len() {
                    1 => "1 application".to_string(),
                    n => format!("{} applications", n),
                };
                engine.place_group_header(&format_long_date(day), Some(count.as_str()));
            }
        }
        for record in &group.records {
            engine.place_entry(record, policy, include_location);
        }
    }

    engine.finalize()
}

pub fn report_meta(
    settings: &ReportSettings,
    policy: &JurisdictionPolicy,
    request: &ReportRequest,
    generated_at: DateTime<Utc>,
) -> ReportMeta {
    ReportMeta {
        title: settings.title.clone(),
        subtitle: policy.form_title.to_string(),
        jurisdiction_label: format!("Jurisdiction: {} ({})", policy.name, policy.code),
        date_range: format!(
            "Reporting Period: {}",
            format_date_range(&request.date_from, &request.date_to)
        ),
        generated_at: format!("Generated: {}", format_date_time(&generated_at)),
    }
}

/// `report-{CODE}-{epoch millis}.pdf`
pub fn report_filename(code: &str, generated_at: DateTime<Utc>) -> String {
    format!("report-{}-{}.pdf", code, generated_at.timestamp_millis())
}
