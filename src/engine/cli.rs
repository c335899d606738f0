//! CLI command handler: config file, then flags, then one indexing run.

use anyhow::{Context, Result};
use log::{debug, error, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::engine::arg_parser::Cli;
use crate::error::RunError;
use crate::index::run_index_with_cancel;
use crate::utils::config::PackagePaths;
use crate::utils::docdex_toml::{apply_file_to_opts, load_docdex_toml};
use crate::utils::setup_logging;
use crate::{Opts, RunSummary};

/// Overwrite opts field from a CLI flag when given.
macro_rules! apply_cli_opt {
    ($cli:expr, $opts:expr, $cli_field:ident => $opts_field:ident) => {
        if let Some(v) = $cli.$cli_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Build run options: defaults, then the config file, then explicit flags.
pub fn build_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    if let Some(file) = load_docdex_toml(cli.config.as_deref(), PackagePaths::get().config_filename())? {
        apply_file_to_opts(&file, &mut opts);
    }
    if !cli.input_dir.is_empty() {
        opts.input_dirs = cli.input_dir.clone();
    }
    apply_cli_opt!(cli, opts, output_dir => output_dir);
    if cli.stopwords.is_some() {
        opts.stopwords = cli.stopwords.clone();
    }
    apply_cli_opt!(cli, opts, recurse => recurse);
    apply_cli_opt!(cli, opts, workers => workers);
    apply_cli_opt!(cli, opts, min_token_length => min_token_length);
    apply_cli_opt!(cli, opts, compress => compress);
    apply_cli_opt!(cli, opts, pretty => pretty);
    apply_cli_opt!(cli, opts, index_type => index_type);
    if cli.metadata.is_some() {
        opts.metadata = cli.metadata.clone();
    }
    if !cli.extension.is_empty() {
        opts.extensions = cli.extension.clone();
    }
    if !cli.exclude.is_empty() {
        opts.exclude = cli.exclude.clone();
    }
    apply_cli_opt!(cli, opts, follow_links => follow_links);
    if let Some(secs) = cli.timeout {
        opts.shutdown_timeout = Duration::from_secs(secs);
    }
    apply_cli_opt!(cli, opts, progress => progress);
    apply_cli_opt!(cli, opts, verbose => verbose);
    Ok(opts)
}

/// Parse options, install the Ctrl+C handler and run the index.
pub fn handle_run(cli: &Cli) -> Result<RunSummary> {
    let opts = build_opts(cli)?;
    setup_logging(opts.verbose);
    if opts.compress && opts.index_type != crate::IndexType::Json {
        warn!("--compress only applies to the json index; ignoring");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("install Ctrl+C handler")?;

    debug!("Indexing {} director(ies)...", opts.input_dirs.len());
    run_index_with_cancel(&opts, cancel).inspect_err(|e| {
        if let Some(run_err) = e.downcast_ref::<RunError>() {
            match run_err {
                RunError::TasksFailed { .. } => error!("One or more indexing tasks failed"),
                RunError::Interrupted => error!("Indexing interrupted"),
                RunError::DrainTimeout { .. } => error!("Indexing timed out waiting for workers"),
                RunError::ManagerClosed => error!("Indexing stopped early"),
            }
        } else {
            error!("Unhandled error: {:#}", e);
        }
    })
}
