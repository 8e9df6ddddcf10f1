//! Filename resolution for captured downloads.
//!
//! The browser host often has no final name at capture time. Resolution
//! tries the download item itself, then polls the host while the name is
//! being determined, then synthesizes a usable fallback from the URL and
//! MIME type. A `response-content-disposition` query parameter overrides
//! whatever the other sources produced.

mod disposition;

pub use disposition::{filename_from_url, filename_in};

use crate::config::PollingConfig;
use crate::host::{DownloadHost, DownloadId, DownloadRecord};

/// Resolves the filename to report for a captured download. Never fails;
/// the worst case is a synthesized `download_<millis><ext>` name.
pub async fn resolve(
    host: &dyn DownloadHost,
    record: &DownloadRecord,
    polling: &PollingConfig,
) -> String {
    let url = record.effective_url();

    let immediate = record.filename.as_deref().and_then(base_name);
    let resolved = match immediate {
        Some(name) => name,
        None => {
            tracing::debug!(id = record.id, "no filename at capture, polling host");
            let polled = poll_for_name(host, record.id, polling).await;
            polled
                .as_deref()
                .and_then(base_name)
                .unwrap_or_else(|| fallback_name(url, record.mime.as_deref()))
        }
    };

    // A disposition parameter on the URL names the file authoritatively.
    disposition::filename_from_url(url).unwrap_or(resolved)
}

/// Name to suggest when letting a download through untouched.
pub fn pass_through_name(record: &DownloadRecord) -> String {
    record
        .filename
        .as_deref()
        .and_then(base_name)
        .unwrap_or_else(|| fallback_name(record.effective_url(), record.mime.as_deref()))
}

async fn poll_for_name(
    host: &dyn DownloadHost,
    id: DownloadId,
    polling: &PollingConfig,
) -> Option<String> {
    for attempt in 1..=polling.max_attempts {
        tokio::time::sleep(polling.interval()).await;
        match host.search(id).await {
            Ok(Some(rec)) => {
                if let Some(name) = rec.filename.filter(|f| !f.is_empty()) {
                    tracing::debug!(id, attempt, "filename appeared while polling");
                    return Some(name);
                }
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(id, attempt, error = %e, "search failed while polling"),
        }
    }
    tracing::warn!(id, "filename polling exhausted");
    None
}

/// Last component of a path-ish name, splitting on both separator styles.
pub fn base_name(path: &str) -> Option<String> {
    path.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// File extension for common MIME types; unknown types get `.bin`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime.trim().to_ascii_lowercase().as_str() {
        "application/pdf" => ".pdf",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "text/plain" => ".txt",
        "application/zip" => ".zip",
        "application/x-rar-compressed" => ".rar",
        "application/x-tar" => ".tar",
        "application/x-7z-compressed" => ".7z",
        "video/mp4" => ".mp4",
        "audio/mpeg" => ".mp3",
        _ => ".bin",
    }
}

/// Fallback name with the current wall clock stamped in.
pub fn fallback_name(url: &str, mime: Option<&str>) -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    synthesized(url, mime, millis)
}

/// Pure fallback synthesis; `now_millis` keeps it testable.
///
/// Order: disposition parameter, then the URL path's last segment when it
/// carries an extension, then `download_<millis><ext>` from the MIME table.
pub fn synthesized(url: &str, mime: Option<&str>, now_millis: u64) -> String {
    let ext = mime.map(extension_for_mime).unwrap_or(".bin");

    let Ok(parsed) = url::Url::parse(url) else {
        return format!("download_{now_millis}{ext}");
    };

    let dispo = parsed
        .query_pairs()
        .find(|(k, _)| k == "response-content-disposition")
        .map(|(_, v)| v.into_owned());
    if let Some(name) = dispo.as_deref().and_then(disposition::filename_in) {
        return name;
    }

    let last = parsed.path().rsplit('/').next().unwrap_or("");
    if !last.is_empty() && last.contains('.') {
        return last.to_string();
    }

    format!("download_{now_millis}{ext}")
}
