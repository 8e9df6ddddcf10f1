use dsg_core::logging;

mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Initialize logging as early as possible. The log file may be
    // unwritable (read-only home); stderr keeps the gateway alive.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    // Parse CLI and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("dsg error: {:#}", err);
        std::process::exit(1);
    }
}
