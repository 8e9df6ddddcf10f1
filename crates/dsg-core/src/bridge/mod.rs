//! Line-oriented JSON bridge to the browser-side host adapter.

mod host;
mod wire;

pub use host::{BridgeHost, DEFAULT_REPLY_TIMEOUT};
pub use wire::{Reply, WireCommand, WireEvent};
