//! Verification exchange with the safety authority.
//!
//! POSTs download metadata as JSON and reads back a verdict. Transport
//! failures, non-2xx statuses, and malformed bodies are all retried under
//! the configured policy; exhaustion surfaces the last error so the caller
//! fails closed. An error is never interpreted as a verdict.

mod error;
mod wire;

pub use error::VerifyError;
pub use wire::{Verdict, VerifyRequest, VerifyResponse};

use std::time::Duration;

use crate::config::VerifierConfig;
use crate::retry::{run_with_retry, RetryPolicy};

/// Verdict source. Lets the coordinator run against a scripted authority
/// in tests.
#[async_trait::async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, req: &VerifyRequest) -> Result<Verdict, VerifyError>;
}

/// HTTP client for the verification endpoint.
#[derive(Debug, Clone)]
pub struct VerifyClient {
    endpoint: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    policy: RetryPolicy,
}

impl VerifyClient {
    pub fn new(cfg: &VerifierConfig) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            connect_timeout: cfg.connect_timeout(),
            request_timeout: cfg.request_timeout(),
            policy: cfg.policy(),
        }
    }
}

#[async_trait::async_trait]
impl Verifier for VerifyClient {
    async fn verify(&self, req: &VerifyRequest) -> Result<Verdict, VerifyError> {
        let body = serde_json::to_vec(req).map_err(VerifyError::Encode)?;
        run_with_retry(&self.policy, || {
            let endpoint = self.endpoint.clone();
            let body = body.clone();
            let connect = self.connect_timeout;
            let total = self.request_timeout;
            async move {
                let raw =
                    tokio::task::spawn_blocking(move || post_json(&endpoint, &body, connect, total))
                        .await
                        .map_err(VerifyError::Worker)??;
                let resp: VerifyResponse =
                    serde_json::from_slice(&raw).map_err(VerifyError::Malformed)?;
                Ok(Verdict::from(resp))
            }
        })
        .await
    }
}

/// Single POST of a JSON document, returning the raw response body.
/// Runs on the current thread; call from `spawn_blocking` in async code.
fn post_json(
    endpoint: &str,
    body: &[u8],
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<Vec<u8>, VerifyError> {
    let mut out = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(endpoint)?;
    easy.post(true)?;
    easy.post_fields_copy(body)?;
    easy.connect_timeout(connect_timeout)?;
    easy.timeout(request_timeout)?;

    let mut headers = curl::easy::List::new();
    headers.append("Content-Type: application/json")?;
    easy.http_headers(headers)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            out.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(VerifyError::Http(code));
    }
    Ok(out)
}
