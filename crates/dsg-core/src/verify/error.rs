//! Verification exchange error type.

use std::fmt;

/// Error from a single verification attempt (curl failure, HTTP error, or
/// an unusable body). All of these are retryable; none is ever a verdict.
#[derive(Debug)]
pub enum VerifyError {
    /// Curl reported an error (timeout, connection, TLS, etc.).
    Transport(curl::Error),
    /// Authority answered with a non-2xx status.
    Http(u32),
    /// Request could not be encoded.
    Encode(serde_json::Error),
    /// Response body was not a valid verdict document.
    Malformed(serde_json::Error),
    /// The blocking transfer task failed to run.
    Worker(tokio::task::JoinError),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::Transport(e) => write!(f, "{}", e),
            VerifyError::Http(code) => write!(f, "HTTP {}", code),
            VerifyError::Encode(e) => write!(f, "encode request: {}", e),
            VerifyError::Malformed(e) => write!(f, "malformed response: {}", e),
            VerifyError::Worker(e) => write!(f, "transfer task: {}", e),
        }
    }
}

impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VerifyError::Transport(e) => Some(e),
            VerifyError::Encode(e) | VerifyError::Malformed(e) => Some(e),
            VerifyError::Worker(e) => Some(e),
            VerifyError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for VerifyError {
    fn from(e: curl::Error) -> Self {
        VerifyError::Transport(e)
    }
}
