//! `dsg verify <url>` – submit one download's metadata for a verdict.

use anyhow::{Context, Result};
use dsg_core::config::GateConfig;
use dsg_core::verify::{Verifier, VerifyClient, VerifyRequest};

pub async fn run_verify(
    cfg: &GateConfig,
    url: &str,
    filename: &str,
    mime: Option<String>,
    id: i64,
) -> Result<()> {
    let client = VerifyClient::new(&cfg.verifier);
    let request = VerifyRequest {
        id,
        url: url.to_string(),
        filename: filename.to_string(),
        mime,
    };
    let verdict = client
        .verify(&request)
        .await
        .context("verification failed")?;

    println!("safe: {}", if verdict.safe { "yes" } else { "no" });
    if let Some(fetch_url) = verdict.fetch_url {
        println!("fetch url: {fetch_url}");
    }
    Ok(())
}
