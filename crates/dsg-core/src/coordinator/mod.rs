//! Event loop that routes host events into per-download pipelines.
//!
//! Two capture hooks race on every new download. The first to claim an id in
//! the registry owns its pipeline; the loser replies pass-through and backs
//! off. Downloads re-issued after a safe verdict are recognized by canonical
//! URL and watched until they settle.

mod flow;

pub use flow::Stage;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::canon::{self, CanonicalUrl};
use crate::config::GateConfig;
use crate::filename;
use crate::host::{DownloadHost, DownloadId, DownloadRecord, HostEvent, NameSuggester, NameSuggestion};
use crate::notify::Notifier;
use crate::registry::InterceptRegistry;
use crate::verify::Verifier;

/// Shared state for the capture pipeline.
pub struct Coordinator {
    host: Arc<dyn DownloadHost>,
    verifier: Arc<dyn Verifier>,
    notifier: Arc<dyn Notifier>,
    registry: Arc<InterceptRegistry>,
    /// Re-issued ids watched until they reach a terminal state.
    monitors: Mutex<HashMap<DownloadId, CanonicalUrl>>,
    cfg: GateConfig,
}

impl Coordinator {
    pub fn new(
        host: Arc<dyn DownloadHost>,
        verifier: Arc<dyn Verifier>,
        notifier: Arc<dyn Notifier>,
        registry: Arc<InterceptRegistry>,
        cfg: GateConfig,
    ) -> Self {
        Self {
            host,
            verifier,
            notifier,
            registry,
            monitors: Mutex::new(HashMap::new()),
            cfg,
        }
    }
}

/// Drives the coordinator until the host closes its event stream.
pub async fn run(coord: Arc<Coordinator>, mut events: mpsc::Receiver<HostEvent>) {
    let mut sweep = tokio::time::interval(coord.cfg.registry.sweep_interval());
    loop {
        tokio::select! {
            ev = events.recv() => match ev {
                Some(ev) => handle_event(&coord, ev),
                None => break,
            },
            _ = sweep.tick() => {
                if coord.registry.sweep() {
                    tracing::info!("intercept registry swept");
                }
            }
        }
    }
    tracing::info!("host event stream closed");
}

fn handle_event(coord: &Arc<Coordinator>, event: HostEvent) {
    match event {
        HostEvent::NameDetermining { record, suggest } => {
            on_capture(coord, record, suggest, "name hook");
        }
        HostEvent::Created { record } => {
            on_capture(coord, record, None, "create hook");
        }
        HostEvent::StateChanged { id, state } => {
            if state.is_terminal() {
                on_terminal(coord, id);
            }
        }
    }
}

/// Both capture hooks land here; the registry claim keeps one pipeline per id.
fn on_capture(
    coord: &Arc<Coordinator>,
    record: DownloadRecord,
    suggest: Option<NameSuggester>,
    hook: &'static str,
) {
    let canon = canon::canonicalize(record.effective_url());
    if coord.registry.is_safe(&canon) {
        tracing::debug!(id = record.id, url = %canon, stage = %Stage::Allowed, "known safe, passing through");
        if let Some(suggest) = suggest {
            suggest.respond(NameSuggestion::keep(filename::pass_through_name(&record)));
        }
        return;
    }
    if !coord.registry.claim(record.id) {
        tracing::debug!(id = record.id, hook, "already claimed by the other hook");
        if let Some(suggest) = suggest {
            suggest.respond(NameSuggestion::keep(filename::pass_through_name(&record)));
        }
        return;
    }
    tracing::info!(id = record.id, url = %record.effective_url(), hook, "captured");
    tokio::spawn(flow::intercept(Arc::clone(coord), record, suggest));
}

fn on_terminal(coord: &Arc<Coordinator>, id: DownloadId) {
    let watched = coord.monitors.lock().unwrap().remove(&id);
    if let Some(canon) = watched {
        coord.registry.unmark_safe(&canon);
        tracing::info!(id, url = %canon, stage = %Stage::Done, "re-issued download settled");
    }
}
