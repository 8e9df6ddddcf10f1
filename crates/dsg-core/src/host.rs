//! Browser host boundary: download records, lifecycle events, and the
//! operations the gateway drives against the host.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Ephemeral download identifier assigned by the host. Only unique while
/// the download exists; released ids may be reused.
pub type DownloadId = i64;

/// Snapshot of a download as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRecord {
    pub id: DownloadId,
    pub url: String,
    /// URL after redirects, when the host knows it.
    #[serde(default)]
    pub final_url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime: Option<String>,
}

impl DownloadRecord {
    /// Post-redirect URL when present, the original otherwise.
    pub fn effective_url(&self) -> &str {
        self.final_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(&self.url)
    }
}

/// Transfer lifecycle as the host reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferState {
    InProgress,
    Complete,
    Interrupted,
}

impl TransferState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TransferState::InProgress)
    }
}

/// What the host should do when the target filename already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    #[default]
    Uniquify,
    Overwrite,
    Prompt,
}

/// Reply to a pending filename determination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSuggestion {
    pub filename: String,
    pub conflict: ConflictPolicy,
    pub cancel: bool,
}

impl NameSuggestion {
    /// Let the download proceed under `filename`.
    pub fn keep(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            conflict: ConflictPolicy::Uniquify,
            cancel: false,
        }
    }

    /// Report `filename` but cancel the download.
    pub fn suppress(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            conflict: ConflictPolicy::Uniquify,
            cancel: true,
        }
    }
}

/// One-shot reply channel for a pending filename determination. Dropping
/// it without responding counts as "no opinion" on the host side.
pub struct NameSuggester(oneshot::Sender<NameSuggestion>);

impl NameSuggester {
    pub fn new(tx: oneshot::Sender<NameSuggestion>) -> Self {
        Self(tx)
    }

    /// Sends the suggestion. Quietly dropped when the host side is gone.
    pub fn respond(self, suggestion: NameSuggestion) {
        let _ = self.0.send(suggestion);
    }
}

impl fmt::Debug for NameSuggester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NameSuggester")
    }
}

/// Host-side notifications driving the gateway.
#[derive(Debug)]
pub enum HostEvent {
    /// The host is determining a filename (primary capture hook). Carries
    /// a reply channel when the host expects a suggestion back.
    NameDetermining {
        record: DownloadRecord,
        suggest: Option<NameSuggester>,
    },
    /// A download sprang into existence (backup capture hook).
    Created { record: DownloadRecord },
    /// A download's transfer state changed.
    StateChanged { id: DownloadId, state: TransferState },
}

/// Errors from host operations.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The host answered but refused the operation.
    #[error("host rejected: {0}")]
    Rejected(String),
    /// No reply within the bridge timeout.
    #[error("timed out waiting for host reply")]
    Timeout,
    /// The host connection is gone.
    #[error("host connection closed")]
    Closed,
}

/// Request to issue a fresh download.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub filename: Option<String>,
    pub conflict: ConflictPolicy,
}

/// Operations the gateway drives against the browser host.
#[async_trait::async_trait]
pub trait DownloadHost: Send + Sync {
    /// Stops an in-flight download.
    async fn cancel(&self, id: DownloadId) -> Result<(), HostError>;
    /// Removes a download from the host's history.
    async fn erase(&self, id: DownloadId) -> Result<(), HostError>;
    /// Pauses a download; suppression fallback when cancel is refused.
    async fn pause(&self, id: DownloadId) -> Result<(), HostError>;
    /// Starts a new download; returns the id the host assigned.
    async fn start_download(&self, req: &DownloadRequest) -> Result<DownloadId, HostError>;
    /// Looks up a download by id.
    async fn search(&self, id: DownloadId) -> Result<Option<DownloadRecord>, HostError>;
}
