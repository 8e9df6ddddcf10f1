//! Per-download pipeline: suppress, resolve a name, verify, re-issue.

use std::fmt;
use std::sync::Arc;

use crate::canon;
use crate::host::{ConflictPolicy, DownloadId, DownloadRecord, DownloadRequest, NameSuggester, NameSuggestion};
use crate::notify::{Notice, NoticeKind};
use crate::retry::run_with_retry;
use crate::verify::VerifyRequest;

use super::Coordinator;

/// Pipeline position of one captured download.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Captured,
    Resolving,
    Verifying,
    Redownloading,
    Monitoring,
    Allowed,
    Blocked,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Captured => "captured",
            Stage::Resolving => "resolving",
            Stage::Verifying => "verifying",
            Stage::Redownloading => "redownloading",
            Stage::Monitoring => "monitoring",
            Stage::Allowed => "allowed",
            Stage::Blocked => "blocked",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

fn advance(id: DownloadId, stage: &mut Stage, next: Stage) {
    tracing::debug!(id, from = %stage, to = %next, "stage change");
    *stage = next;
}

/// Drives one claimed download from suppression to a verdict. Spawned per
/// capture; the id stays claimed when the download ends up blocked.
pub(super) async fn intercept(
    coord: Arc<Coordinator>,
    record: DownloadRecord,
    suggest: Option<NameSuggester>,
) {
    let id = record.id;
    let mut stage = Stage::Captured;

    suppress(coord.as_ref(), id).await;

    advance(id, &mut stage, Stage::Resolving);
    let filename = crate::filename::resolve(coord.host.as_ref(), &record, &coord.cfg.polling).await;
    if let Some(suggest) = suggest {
        suggest.respond(NameSuggestion::suppress(filename.clone()));
    }

    advance(id, &mut stage, Stage::Verifying);
    let request = VerifyRequest {
        id,
        url: record.effective_url().to_string(),
        filename: filename.clone(),
        mime: record.mime.clone(),
    };
    match coord.verifier.verify(&request).await {
        Ok(verdict) if verdict.safe => {
            advance(id, &mut stage, Stage::Redownloading);
            let target = verdict.fetch_url.unwrap_or_else(|| request.url.clone());
            reissue(&coord, id, &filename, target, &mut stage).await;
        }
        Ok(_) => {
            tracing::warn!(id, filename = %filename, "unsafe verdict, download stays suppressed");
            coord.notifier.notify(Notice {
                kind: NoticeKind::Blocked,
                message: format!("The file \"{filename}\" was blocked as it was deemed unsafe."),
            });
            advance(id, &mut stage, Stage::Blocked);
        }
        Err(err) => {
            tracing::warn!(id, %err, "verification failed, failing closed");
            coord.notifier.notify(Notice {
                kind: NoticeKind::VerifyFailed,
                message: format!("Failed to verify safety of \"{filename}\". Download canceled."),
            });
            advance(id, &mut stage, Stage::Blocked);
        }
    }
}

/// Cancels the download so nothing lands on disk, then erases it from the
/// host's history. A refused cancel degrades to pausing.
async fn suppress(coord: &Coordinator, id: DownloadId) {
    match coord.host.cancel(id).await {
        Ok(()) => {
            if let Err(err) = coord.host.erase(id).await {
                tracing::debug!(id, %err, "erase after cancel failed");
            }
        }
        Err(err) => {
            tracing::warn!(id, %err, "cancel refused, pausing instead");
            if let Err(err) = coord.host.pause(id).await {
                tracing::warn!(id, %err, "pause failed, download left to the host");
            }
        }
    }
}

/// Marks the target safe, starts the replacement download, and registers the
/// new id for monitoring. The safe mark goes in first so the re-issued
/// download passes the capture hooks untouched.
async fn reissue(
    coord: &Arc<Coordinator>,
    original: DownloadId,
    filename: &str,
    target: String,
    stage: &mut Stage,
) {
    let canon_safe = canon::canonicalize(&target);
    coord.registry.mark_safe(&canon_safe);

    let request = DownloadRequest {
        url: target.clone(),
        filename: Some(filename.to_string()),
        conflict: ConflictPolicy::Uniquify,
    };
    let policy = coord.cfg.redownload.policy();
    let host = Arc::clone(&coord.host);
    let started = run_with_retry(&policy, || {
        let host = Arc::clone(&host);
        let request = request.clone();
        async move { host.start_download(&request).await }
    })
    .await;

    match started {
        Ok(new_id) => {
            coord.registry.release(original);
            coord
                .monitors
                .lock()
                .unwrap()
                .insert(new_id, canon_safe);
            tracing::info!(original, new_id, url = %target, "safe download re-issued");
            advance(original, stage, Stage::Monitoring);
        }
        Err(err) => {
            coord.registry.unmark_safe(&canon_safe);
            tracing::error!(original, %err, "could not re-issue safe download");
            coord.notifier.notify(Notice {
                kind: NoticeKind::RedownloadFailed,
                message: format!("Failed to start download for \"{filename}\". Error: {err}"),
            });
            advance(original, stage, Stage::Blocked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Captured.to_string(), "captured");
        assert_eq!(Stage::Redownloading.to_string(), "redownloading");
        assert_eq!(Stage::Done.to_string(), "done");
    }
}
