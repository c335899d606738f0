//! docdex CLI: crawl directories of documents and write a keyword index.

use anyhow::Result;
use clap::Parser;
use docdex::engine::arg_parser::Cli;
use docdex::engine::handle_run;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
