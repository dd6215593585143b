use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Tenant (company) id the token is scoped to")]
    pub tenant: Uuid,

    #[arg(long, help = "User id placed in the subject claim")]
    pub user: Uuid,

    #[arg(long, default_value = "user", help = "Role claim")]
    pub role: String,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    if crate::is_production!() {
        anyhow::bail!("refusing to mint development tokens with APP_ENV=production");
    }

    let claims = Claims::new(args.user, args.tenant, args.role);
    let token = generate_jwt(&claims).context("failed to sign token")?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            output_format,
            "Token issued",
            Some(json!({ "token": token, "expires_at": claims.exp })),
        )?,
    }
    Ok(())
}
