//! `dsg canon <url>` – print the canonical form of a URL.

use anyhow::Result;
use dsg_core::canon;

pub fn run_canon(url: &str) -> Result<()> {
    println!("{}", canon::canonicalize(url));
    Ok(())
}
