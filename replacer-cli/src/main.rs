use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use replacer::{run, CancelToken, ReplaceConfig, ReplaceError, ReplaceSummary};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Recursively replaces every occurrence of a literal string under a
/// directory, concurrently and with an atomic per-file rewrite.
#[derive(Parser)]
#[command(name = "replacer", version, about, long_about = None)]
struct Cli {
    /// Literal text to search for
    search: String,

    /// Text to substitute for each occurrence
    replace: String,

    /// Root directory to walk
    path: PathBuf,

    /// Upper bound on total run time (e.g. 500ms, 30s; default 3m)
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Number of worker threads per queue (default: CPU cores)
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Path to a config file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match execute() {
        Ok(summary) if summary.has_errors() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{} {:#}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

fn execute() -> Result<ReplaceSummary> {
    let cli = Cli::parse();

    let file_config = match cli.config.as_deref() {
        Some(path) => ReplaceConfig::load_from(Some(path)).map_err(|e| {
            ReplaceError::config_error(format!(
                "Failed to load config from {}: {}",
                path.display(),
                e
            ))
        })?,
        None => ReplaceConfig::load().unwrap_or_default(),
    };

    setup_logging(&file_config.log_level)?;

    // The flag keeps sub-second precision; the config file value (whole
    // seconds) only applies when the flag is absent
    let timeout = cli.timeout.unwrap_or_else(|| file_config.timeout());

    let cli_config = ReplaceConfig {
        search: cli.search,
        replace: cli.replace,
        root_path: cli.path,
        thread_count: cli.threads.unwrap_or(file_config.thread_count),
        ..ReplaceConfig::default()
    };
    let config = file_config.merge_with_cli(cli_config);

    let token = CancelToken::with_timeout(timeout);
    let flag = token.flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    let summary = run(&config, token)?;
    print_summary(&summary);
    Ok(summary)
}

fn print_summary(summary: &ReplaceSummary) {
    for err in &summary.errors {
        println!("{}", err.to_string().red());
    }
    println!(
        "Processed {} files ({} small, {} large), {} errors",
        summary.files_processed(),
        summary.small_files,
        summary.large_files,
        summary.errors.len()
    );
}

fn setup_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("replacer={},warn", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}
