use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::context::Roles;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Tenant id placed in the tenantId claim")]
    pub tenant: String,

    #[arg(long, help = "User id placed in the sub claim")]
    pub user: String,

    #[arg(long, help = "Comma-separated roles, e.g. ADMIN,AGENT")]
    pub roles: Option<String>,

    #[arg(long, help = "Email placed in the email claim")]
    pub email: Option<String>,

    #[arg(long, help = "Signing secret (defaults to JWT_SECRET / configured secret)")]
    pub secret: Option<String>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let settings = config::config();
    let secret = args.secret.unwrap_or_else(|| settings.security.jwt_secret.clone());
    let roles = Roles::parse_csv(args.roles.as_deref().unwrap_or_default());

    let claims = Claims::new(
        args.user,
        args.tenant,
        args.email,
        &roles,
        settings.security.jwt_expiry_hours,
    )?;
    let token = generate_jwt(&claims, &secret)?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => utils::output_success(
            output_format,
            "Token generated",
            json!({
                "token": token,
                "tenantId": claims.tenant_id,
                "sub": claims.sub,
                "roles": roles,
                "exp": claims.exp,
            }),
        )?,
    }
    Ok(())
}
