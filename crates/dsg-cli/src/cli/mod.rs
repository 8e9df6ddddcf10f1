//! CLI for the DSG download safety gateway.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use dsg_core::config;

use commands::{run_canon, run_gateway, run_name, run_verify};

/// Top-level CLI for the DSG download safety gateway.
#[derive(Debug, Parser)]
#[command(name = "dsg")]
#[command(about = "DSG: download interception and verification gateway", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the gateway loop against a host adapter on stdin/stdout.
    Run {
        /// Override the verification endpoint from the config file.
        #[arg(long, value_name = "URL")]
        endpoint: Option<String>,
    },

    /// Print the canonical form of a URL.
    Canon {
        /// URL to canonicalize.
        url: String,
    },

    /// Print the filename the gateway would synthesize for a URL.
    Name {
        /// Download URL.
        url: String,

        /// MIME type reported by the host, if any.
        #[arg(long)]
        mime: Option<String>,
    },

    /// Submit one download's metadata for a verdict and print it.
    Verify {
        /// Download URL.
        url: String,

        /// Filename to report.
        #[arg(long)]
        filename: String,

        /// MIME type to report.
        #[arg(long)]
        mime: Option<String>,

        /// Download id to report.
        #[arg(long, default_value = "0")]
        id: i64,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Run { endpoint } => run_gateway(cfg, endpoint).await?,
            CliCommand::Canon { url } => run_canon(&url)?,
            CliCommand::Name { url, mime } => run_name(&url, mime.as_deref())?,
            CliCommand::Verify {
                url,
                filename,
                mime,
                id,
            } => run_verify(&cfg, &url, &filename, mime, id).await?,
        }

        Ok(())
    }
}
