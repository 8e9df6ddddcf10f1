//! Wire contract with the verification authority.

use serde::{Deserialize, Serialize};

use crate::host::DownloadId;

/// Metadata submitted for a verdict.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    pub id: DownloadId,
    pub url: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime: Option<String>,
}

/// Verdict document as the authority sends it.
#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "isSafe")]
    pub is_safe: bool,
    /// Replacement URL to download instead. The authority sends an empty
    /// string when there is none.
    #[serde(default, rename = "proxyUrl")]
    pub proxy_url: Option<String>,
}

/// The authority's verdict, normalized for callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub safe: bool,
    /// URL to fetch instead of the original, when the authority provides one.
    pub fetch_url: Option<String>,
}

impl From<VerifyResponse> for Verdict {
    fn from(resp: VerifyResponse) -> Self {
        Self {
            safe: resp.is_safe,
            fetch_url: resp.proxy_url.filter(|u| !u.is_empty()),
        }
    }
}
