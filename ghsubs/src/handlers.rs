use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::{ColoredString, Colorize};
use ghsubs_core::extract::normalize_domain;
use ghsubs_core::pipeline::{extract_stage, fetch_stage, load_links, search_stage};
use ghsubs_core::report::generate_run_summary;
use ghsubs_core::{ScanOptions, ScratchLayout, StatusCallback, execute_scan};
use ghsubs_scanner::ScannerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_tracing(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. from tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Build the scanner settings from whichever of `--token`, `--threads` and
/// `--delay` the subcommand defines.
pub fn scanner_config_from_args(args: &ArgMatches) -> ScannerConfig {
    let mut config = ScannerConfig::default();

    if let Ok(Some(token)) = args.try_get_one::<String>("token") {
        config = config.with_token(Some(token.clone()));
    }
    if let Ok(Some(threads)) = args.try_get_one::<usize>("threads") {
        config = config.with_workers(*threads);
    }
    if let Ok(Some(delay)) = args.try_get_one::<u64>("delay") {
        config = config.with_page_delay(Duration::from_millis(*delay));
    }

    config
}

pub fn scratch_from_args(args: &ArgMatches) -> ScratchLayout {
    let scratch = match args.try_get_one::<String>("scratch-dir") {
        Ok(Some(dir)) => ScratchLayout::new(shellexpand::tilde(dir).into_owned()),
        _ => ScratchLayout::default(),
    };
    debug!("Using scratch directory {}", scratch.root().display());
    scratch
}

fn domain_from_args(args: &ArgMatches) -> Result<String> {
    let domain = args
        .get_one::<String>("domain")
        .context("--domain is required")?;
    Ok(normalize_domain(domain)?)
}

pub fn colorize_status(line: &str) -> ColoredString {
    if line.starts_with("[+]") {
        line.green()
    } else if line.starts_with("[-]") {
        line.yellow()
    } else if line.starts_with("[*]") {
        line.blue()
    } else {
        line.normal()
    }
}

fn status_printer(quiet: bool) -> Option<StatusCallback> {
    if quiet {
        return None;
    }
    Some(Arc::new(|line: String| {
        println!("{}", colorize_status(&line));
    }))
}

fn warn_if_anonymous(config: &ScannerConfig, quiet: bool) {
    if config.token.is_none() && !quiet {
        println!(
            "{}",
            colorize_status("[-] No GitHub token set (--token or GITHUB_TOKEN); code search will likely be refused")
        );
    }
}

pub async fn handle_scan(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let domain = domain_from_args(sub_matches)?;
    let output = sub_matches.get_one::<PathBuf>("output").cloned();
    let scanner = scanner_config_from_args(sub_matches);
    warn_if_anonymous(&scanner, quiet);

    let options = ScanOptions {
        domain,
        scratch: scratch_from_args(sub_matches),
        output,
        scanner,
        show_progress_bars: !quiet,
    };

    let outcome = execute_scan(options, status_printer(quiet))
        .await
        .context("scan aborted")?;

    if !quiet {
        eprint!("{}", generate_run_summary(&outcome.summary));
    }
    Ok(())
}

pub async fn handle_search(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let domain = domain_from_args(sub_matches)?;
    let scanner = scanner_config_from_args(sub_matches);
    let scratch = scratch_from_args(sub_matches);
    warn_if_anonymous(&scanner, quiet);

    let links = search_stage(&domain, &scanner, &scratch, &status_printer(quiet))
        .await
        .context("search aborted")?;

    if quiet {
        println!("{}", links.len());
    }
    Ok(())
}

pub async fn handle_fetch(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let scanner = scanner_config_from_args(sub_matches);
    let scratch = scratch_from_args(sub_matches);

    let links = load_links(&scratch)?;
    fetch_stage(&links, &scanner, &scratch, !quiet, &status_printer(quiet)).await?;
    Ok(())
}

pub fn handle_extract(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let domain = domain_from_args(sub_matches)?;
    let output = sub_matches.get_one::<PathBuf>("output");
    let scratch = scratch_from_args(sub_matches);

    extract_stage(
        &domain,
        &scratch,
        output.map(PathBuf::as_path),
        &status_printer(quiet),
    )?;
    Ok(())
}
