pub mod bridge;
pub mod canon;
pub mod config;
pub mod coordinator;
pub mod filename;
pub mod host;
pub mod logging;
pub mod notify;
pub mod registry;
pub mod retry;
pub mod verify;
