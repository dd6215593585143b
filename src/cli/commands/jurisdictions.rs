use crate::cli::utils::output_list;
use crate::cli::OutputFormat;
use crate::report::JURISDICTIONS;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    output_list(output_format, "jurisdictions", JURISDICTIONS, |policy| {
        let fields: Vec<&str> = policy.optional_fields.iter().map(|f| f.label()).collect();
        format!(
            "{:<3} {:<11} {:<45} {:?} [{}]",
            policy.code,
            policy.name,
            policy.form_title,
            policy.grouping,
            fields.join(", ")
        )
    })
}
