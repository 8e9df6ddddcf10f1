//! CLI command handlers. Each command is in its own file for clarity.

mod canon;
mod name;
mod run;
mod verify;

pub use canon::run_canon;
pub use name::run_name;
pub use run::run_gateway;
pub use verify::run_verify;
