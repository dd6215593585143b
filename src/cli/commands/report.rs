use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{NaiveDate, Utc};
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;
use crate::report::{MemoryApplicationSource, ReportGenerator, ReportRequest, ReportSettings, StoredApplication};

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[arg(long, help = "JSON array of application records")]
    pub input: PathBuf,

    #[arg(long, help = "Jurisdiction code (CA, TX, FL)")]
    pub jurisdiction: String,

    #[arg(long, help = "First day of the period (YYYY-MM-DD)")]
    pub from: NaiveDate,

    #[arg(long, help = "Last day of the period, inclusive (YYYY-MM-DD)")]
    pub to: NaiveDate,

    #[arg(long, help = "Only this customer's applications")]
    pub customer: Option<Uuid>,

    #[arg(long, help = "Only this applicator's applications")]
    pub applicator: Option<Uuid>,

    #[arg(long, help = "Tenant to report on (required when the input mixes tenants)")]
    pub tenant: Option<Uuid>,

    #[arg(long, help = "Output path (defaults to the generated filename)")]
    pub out: Option<PathBuf>,
}

pub async fn handle(args: ReportArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = tokio::fs::read(&args.input)
        .await
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let rows: Vec<StoredApplication> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} is not a JSON array of applications", args.input.display()))?;

    let tenant_id = resolve_tenant(args.tenant, &rows)?;
    tracing::debug!("Loaded {} rows for tenant {}", rows.len(), tenant_id);

    let settings = ReportSettings::from_config(&config::config().report);
    let generator = ReportGenerator::new(Arc::new(MemoryApplicationSource::new(rows)), settings);

    let request = ReportRequest {
        jurisdiction: args.jurisdiction,
        date_from: args.from,
        date_to: args.to,
        customer_id: args.customer,
        applicator_id: args.applicator,
    };
    let report = generator.generate(tenant_id, &request, Utc::now()).await?;

    let out = args.out.unwrap_or_else(|| PathBuf::from(&report.filename));
    tokio::fs::write(&out, &report.bytes)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;

    output_success(
        output_format,
        &format!(
            "Wrote {} ({} records, {} pages)",
            out.display(),
            report.record_count,
            report.page_count()
        ),
        Some(json!({
            "path": out,
            "jurisdiction": report.jurisdiction,
            "records": report.record_count,
            "pages": report.page_count(),
        })),
    )
}

/// An explicit tenant wins; otherwise the input must hold exactly one.
fn resolve_tenant(explicit: Option<Uuid>, rows: &[StoredApplication]) -> anyhow::Result<Uuid> {
    if let Some(tenant) = explicit {
        return Ok(tenant);
    }

    let tenants: BTreeSet<Uuid> = rows.iter().map(|row| row.tenant_id).collect();
    let mut iter = tenants.iter();
    match (iter.next(), iter.next()) {
        (Some(tenant), None) => Ok(*tenant),
        (None, _) => bail!("input has no records; pass --tenant to render an empty report"),
        (Some(_), Some(_)) => bail!("input holds {} tenants; pass --tenant to choose one", tenants.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::group::tests::{applicator, customer, record};
    use crate::report::ApplicationStatus;
    use chrono::TimeZone;

    fn row(tenant_id: Uuid) -> StoredApplication {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
        StoredApplication {
            tenant_id,
            status: ApplicationStatus::Completed,
            record: record(&customer("Acme"), &applicator(), at),
        }
    }

    #[test]
    fn single_tenant_input_needs_no_flag() {
        let tenant = Uuid::new_v4();
        assert_eq!(resolve_tenant(None, &[row(tenant), row(tenant)]).unwrap(), tenant);
    }

    #[test]
    fn mixed_input_requires_explicit_tenant() {
        let rows = [row(Uuid::new_v4()), row(Uuid::new_v4())];
        assert!(resolve_tenant(None, &rows).is_err());

        let chosen = rows[1].tenant_id;
        assert_eq!(resolve_tenant(Some(chosen), &rows).unwrap(), chosen);
    }

    #[test]
    fn empty_input_requires_explicit_tenant() {
        assert!(resolve_tenant(None, &[]).is_err());
    }
}
