//! Photocat CLI: ingest a directory of photos and videos, then list or inspect the catalog.

use anyhow::Result;
use clap::Parser;
use photocat::engine::arg_parser::Cli;
use photocat::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
