//! Drives the host adapter over a pair of byte streams.
//!
//! One task reads frames and forwards lifecycle events to the coordinator;
//! another serializes outgoing commands. Replies are matched to callers by
//! `seq`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::host::{
    ConflictPolicy, DownloadHost, DownloadId, DownloadRecord, DownloadRequest, HostError,
    HostEvent, NameSuggester, NameSuggestion,
};
use crate::notify::{Notice, Notifier};

use super::wire::{Reply, WireCommand, WireEvent};

/// How long a command waits for its reply before giving up.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(10);

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Reply>>>>;

/// Command side of the bridge. Shared behind an `Arc`; implements both
/// [`DownloadHost`] and [`Notifier`].
pub struct BridgeHost {
    cmd_tx: mpsc::Sender<WireCommand>,
    pending: PendingMap,
    seq: AtomicU64,
    reply_timeout: Duration,
}

impl BridgeHost {
    /// Spawns the reader and writer tasks over the given streams and returns
    /// the command handle. Events flow into `events` until EOF on `reader`.
    pub fn spawn<R, W>(
        reader: R,
        writer: W,
        events: mpsc::Sender<HostEvent>,
        reply_timeout: Duration,
    ) -> Arc<Self>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WireCommand>(64);
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        tokio::spawn(read_loop(reader, events, Arc::clone(&pending), cmd_tx.clone()));
        tokio::spawn(write_loop(writer, cmd_rx));

        Arc::new(Self {
            cmd_tx,
            pending,
            seq: AtomicU64::new(1),
            reply_timeout,
        })
    }

    async fn call(&self, make: impl FnOnce(u64) -> WireCommand) -> Result<Reply, HostError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(seq, tx);

        if self.cmd_tx.send(make(seq)).await.is_err() {
            self.pending.lock().unwrap().remove(&seq);
            return Err(HostError::Closed);
        }

        match tokio::time::timeout(self.reply_timeout, rx).await {
            Ok(Ok(reply)) if reply.ok => Ok(reply),
            Ok(Ok(reply)) => Err(HostError::Rejected(
                reply.error.unwrap_or_else(|| "unspecified".to_string()),
            )),
            Ok(Err(_)) => Err(HostError::Closed),
            Err(_) => {
                self.pending.lock().unwrap().remove(&seq);
                Err(HostError::Timeout)
            }
        }
    }
}

#[async_trait::async_trait]
impl DownloadHost for BridgeHost {
    async fn cancel(&self, id: DownloadId) -> Result<(), HostError> {
        self.call(|seq| WireCommand::Cancel { seq, id })
            .await
            .map(|_| ())
    }

    async fn erase(&self, id: DownloadId) -> Result<(), HostError> {
        self.call(|seq| WireCommand::Erase { seq, id })
            .await
            .map(|_| ())
    }

    async fn pause(&self, id: DownloadId) -> Result<(), HostError> {
        self.call(|seq| WireCommand::Pause { seq, id })
            .await
            .map(|_| ())
    }

    async fn start_download(&self, req: &DownloadRequest) -> Result<DownloadId, HostError> {
        let reply = self
            .call(|seq| WireCommand::Download {
                seq,
                url: req.url.clone(),
                filename: req.filename.clone(),
                conflict: req.conflict,
            })
            .await?;
        reply
            .id
            .ok_or_else(|| HostError::Rejected("reply carried no download id".to_string()))
    }

    async fn search(&self, id: DownloadId) -> Result<Option<DownloadRecord>, HostError> {
        let reply = self.call(|seq| WireCommand::Search { seq, id }).await?;
        Ok(reply.record)
    }
}

impl Notifier for BridgeHost {
    fn notify(&self, notice: Notice) {
        let cmd = WireCommand::Notify {
            title: notice.kind.title().to_string(),
            message: notice.message,
        };
        if self.cmd_tx.try_send(cmd).is_err() {
            tracing::warn!("notification dropped, command channel full or closed");
        }
    }
}

async fn read_loop<R>(
    reader: R,
    events: mpsc::Sender<HostEvent>,
    pending: PendingMap,
    cmd_tx: mpsc::Sender<WireCommand>,
) where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!(%err, "host stream read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event: WireEvent = match serde_json::from_str(&line) {
            Ok(ev) => ev,
            Err(err) => {
                tracing::warn!(%err, %line, "skipping malformed host frame");
                continue;
            }
        };
        let forward = match event {
            WireEvent::Reply(reply) => {
                match pending.lock().unwrap().remove(&reply.seq) {
                    Some(tx) => {
                        let _ = tx.send(reply);
                    }
                    None => tracing::debug!(seq = reply.seq, "reply for unknown seq"),
                }
                continue;
            }
            WireEvent::NameDetermining {
                record,
                wants_suggestion,
            } => {
                let suggest =
                    wants_suggestion.then(|| make_suggester(record.id, cmd_tx.clone()));
                HostEvent::NameDetermining { record, suggest }
            }
            WireEvent::Created { record } => HostEvent::Created { record },
            WireEvent::Changed { id, state } => HostEvent::StateChanged { id, state },
        };
        if events.send(forward).await.is_err() {
            break;
        }
    }
    // Callers still waiting can never be answered now; wake them.
    pending.lock().unwrap().clear();
    tracing::debug!("host reader stopped");
}

/// Builds the reply channel for a pending filename determination. The host
/// expects exactly one suggest frame per determination, so a suggester
/// dropped without a reply turns into a plain pass-through frame.
fn make_suggester(id: DownloadId, cmd_tx: mpsc::Sender<WireCommand>) -> NameSuggester {
    let (tx, rx) = oneshot::channel::<NameSuggestion>();
    tokio::spawn(async move {
        let cmd = match rx.await {
            Ok(s) => WireCommand::Suggest {
                id,
                filename: Some(s.filename).filter(|f| !f.is_empty()),
                conflict: s.conflict,
                cancel: s.cancel,
            },
            Err(_) => WireCommand::Suggest {
                id,
                filename: None,
                conflict: ConflictPolicy::default(),
                cancel: false,
            },
        };
        if cmd_tx.send(cmd).await.is_err() {
            tracing::debug!(id, "suggest frame dropped, command channel closed");
        }
    });
    NameSuggester::new(tx)
}

async fn write_loop<W>(mut writer: W, mut cmd_rx: mpsc::Receiver<WireCommand>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    while let Some(cmd) = cmd_rx.recv().await {
        let mut line = match serde_json::to_string(&cmd) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(%err, "unencodable command dropped");
                continue;
            }
        };
        line.push('\n');
        if let Err(err) = writer.write_all(line.as_bytes()).await {
            tracing::warn!(%err, "host stream write failed");
            break;
        }
        if let Err(err) = writer.flush().await {
            tracing::warn!(%err, "host stream flush failed");
            break;
        }
    }
    tracing::debug!("host writer stopped");
}
