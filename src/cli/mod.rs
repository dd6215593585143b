pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "spraylog")]
#[command(about = "SprayLog CLI - offline compliance reports and development tokens")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Render a jurisdiction report from a JSON records file")]
    Report(commands::report::ReportArgs),

    #[command(about = "Show the field-level audit trail between two versions of a record")]
    Diff(commands::diff::DiffArgs),

    #[command(about = "List supported jurisdictions")]
    Jurisdictions,

    #[command(about = "Mint a JWT for local development")]
    Token(commands::token::TokenArgs),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Report(args) => commands::report::handle(args, output_format).await,
        Commands::Diff(args) => commands::diff::handle(args, output_format).await,
        Commands::Jurisdictions => commands::jurisdictions::handle(output_format),
        Commands::Token(args) => commands::token::handle(args, output_format),
    }
}
