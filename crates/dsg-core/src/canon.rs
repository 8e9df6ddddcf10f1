//! Canonical URL form for idempotency checks.
//!
//! Presigned links carry volatile query parameters (signatures, expiry
//! stamps) that change on every issue while still naming the same object.
//! Stripping them yields a stable key for the intercept registries.

use std::fmt;

/// Query parameters that vary between issues of the same link.
/// Must stay in sync with the verification authority's skip-checks.
const VOLATILE_PARAMS: [&str; 9] = [
    "X-Amz-Signature",
    "X-Amz-Expires",
    "X-Amz-Credential",
    "X-Amz-Date",
    "X-Amz-Security-Token",
    "Expires",
    "Signature",
    "AWSAccessKeyId",
    "response-content-disposition",
];

/// Canonical form of a download URL.
///
/// Only ever used as a registry key; never dereferenced into a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalizes a URL for registry membership.
///
/// Drops the volatile query parameters (preserving the order of the rest)
/// and relies on the parser to lowercase scheme and host. Input that does
/// not parse is returned unchanged so repeated lookups still agree.
/// Idempotent: canonicalizing a canonical URL is a no-op.
pub fn canonicalize(raw: &str) -> CanonicalUrl {
    let mut parsed = match url::Url::parse(raw) {
        Ok(u) => u,
        Err(_) => return CanonicalUrl(raw.to_string()),
    };

    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !VOLATILE_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        // No '?' left behind when every parameter was volatile.
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(&kept);
    }

    CanonicalUrl(parsed.to_string())
}
