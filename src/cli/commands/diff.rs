use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::Utc;
use clap::Args;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::audit::{AuditEntry, ChangeType};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct DiffArgs {
    #[arg(help = "JSON object holding the record before the edit")]
    pub old: PathBuf,

    #[arg(help = "JSON object holding the record after the edit")]
    pub new: PathBuf,

    #[arg(long, help = "User who made the edit")]
    pub user: Uuid,

    #[arg(long, help = "Record id (defaults to the old record's \"id\" field)")]
    pub record: Option<Uuid>,
}

pub async fn handle(args: DiffArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let old = read_object(&args.old).await?;
    let new = read_object(&args.new).await?;
    let record_id = match args.record {
        Some(id) => id,
        None => record_id(&old)?,
    };

    let Some(entry) = AuditEntry::from_update(record_id, args.user, &old, &new, Utc::now()) else {
        return output_success(output_format, "No changes", Some(json!({ "changes": [] })));
    };

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputFormat::Text => {
            println!("Record {} changed by {}", entry.record_id, entry.user_id);
            for change in &entry.changes {
                println!("{}", describe(change.change_type, &change.field, &change.old_value, &change.new_value));
            }
        }
    }
    Ok(())
}

async fn read_object(path: &Path) -> anyhow::Result<Map<String, Value>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    match serde_json::from_slice(&raw).with_context(|| format!("{} is not JSON", path.display()))? {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must hold a JSON object", path.display()),
    }
}

fn record_id(record: &Map<String, Value>) -> anyhow::Result<Uuid> {
    let Some(id) = record.get("id").and_then(Value::as_str) else {
        bail!("old record has no \"id\"; pass --record");
    };
    Uuid::parse_str(id).with_context(|| format!("record id {} is not a UUID", id))
}

fn describe(change_type: ChangeType, field: &str, old: &Option<Value>, new: &Option<Value>) -> String {
    let show = |v: &Option<Value>| v.as_ref().map(Value::to_string).unwrap_or_default();
    match change_type {
        ChangeType::Added => format!("+ {}: {}", field, show(new)),
        ChangeType::Removed => format!("- {}: {}", field, show(old)),
        ChangeType::Modified => format!("~ {}: {} -> {}", field, show(old), show(new)),
    }
}
