//! User-facing notices surfaced through the host.

/// Notice category; each maps to a fixed user-facing title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The authority flagged the file and it stays suppressed.
    Blocked,
    /// No verdict could be obtained; failing closed.
    VerifyFailed,
    /// The verified replacement could not be issued.
    RedownloadFailed,
}

impl NoticeKind {
    pub fn title(self) -> &'static str {
        match self {
            NoticeKind::Blocked => "Download Blocked",
            NoticeKind::VerifyFailed => "Download Error",
            NoticeKind::RedownloadFailed => "Download Failed",
        }
    }
}

/// A notice for the user. Delivery is fire-and-forget.
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes to the log. Used when no host surface is
/// attached (one-shot CLI commands).
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        tracing::info!(title = notice.kind.title(), "{}", notice.message);
    }
}
