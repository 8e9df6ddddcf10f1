//! `dsg run` – drive the gateway loop against a host adapter on stdio.

use std::sync::Arc;

use anyhow::Result;
use dsg_core::bridge::{BridgeHost, DEFAULT_REPLY_TIMEOUT};
use dsg_core::config::GateConfig;
use dsg_core::coordinator::{self, Coordinator};
use dsg_core::host::DownloadHost;
use dsg_core::notify::Notifier;
use dsg_core::registry::InterceptRegistry;
use dsg_core::verify::VerifyClient;
use tokio::sync::mpsc;

/// Wires the bridge, verifier, and registry together and runs until the
/// host adapter closes stdin. Nothing here prints: stdout belongs to the
/// bridge protocol.
pub async fn run_gateway(mut cfg: GateConfig, endpoint: Option<String>) -> Result<()> {
    if let Some(endpoint) = endpoint {
        cfg.verifier.endpoint = endpoint;
    }
    tracing::info!(endpoint = %cfg.verifier.endpoint, "gateway starting");

    let (events_tx, events_rx) = mpsc::channel(64);
    let host = BridgeHost::spawn(
        tokio::io::stdin(),
        tokio::io::stdout(),
        events_tx,
        DEFAULT_REPLY_TIMEOUT,
    );

    let verifier = Arc::new(VerifyClient::new(&cfg.verifier));
    let registry = Arc::new(InterceptRegistry::new(cfg.registry.max_processed));
    let coordinator = Arc::new(Coordinator::new(
        Arc::clone(&host) as Arc<dyn DownloadHost>,
        verifier,
        Arc::clone(&host) as Arc<dyn Notifier>,
        registry,
        cfg,
    ));

    coordinator::run(coordinator, events_rx).await;
    Ok(())
}
