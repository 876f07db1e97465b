use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Args;
use serde_json::Value;

use crate::cli::{utils, OutputFormat};

#[derive(Args, Debug)]
pub struct WhoamiArgs {
    #[arg(long, default_value = "http://localhost:8080", help = "Base URL of the service")]
    pub url: String,

    #[arg(long, help = "Bearer token sent in the Authorization header")]
    pub token: Option<String>,

    #[arg(long, help = "Tenant id sent in the X-Tenant-ID header")]
    pub tenant: Option<String>,
}

pub async fn handle(args: WhoamiArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = reqwest::Client::new();
    let url = format!("{}/api/context/whoami", args.url.trim_end_matches('/'));

    let mut request = client.get(&url).timeout(Duration::from_secs(10));
    if let Some(token) = &args.token {
        request = request.bearer_auth(token);
    }
    if let Some(tenant) = &args.tenant {
        request = request.header("X-Tenant-ID", tenant);
    }

    let response = request.send().await.with_context(|| format!("request to {} failed", url))?;
    let status = response.status();
    let body: Value = response.json().await.context("response was not JSON")?;

    if !status.is_success() {
        let message = body["message"].as_str().unwrap_or("request failed");
        return Err(anyhow!("{} ({})", message, status));
    }

    utils::output_success(output_format, "Tenant context resolved", body["data"].clone())
}
