//! `dsg name <url>` – print the fallback filename for a URL.

use anyhow::Result;
use dsg_core::filename;

pub fn run_name(url: &str, mime: Option<&str>) -> Result<()> {
    println!("{}", filename::fallback_name(url, mime));
    Ok(())
}
