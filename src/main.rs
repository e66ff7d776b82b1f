//! CLI entry point for the cookie monitor.
//!
//! This is the composition root: it resolves flags and environment into
//! explicit configuration, wires the default capabilities, and maps the scan
//! result to a process exit code.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::TimeDelta;
use clap::Parser;
use cookie_monitor::{
    ApiConfig, ApiKey, FileCursorStore, LoggingRemediator, LoggingVerifier, RetryPolicy,
    ScanController, ScanFilters, ScanOptions, ScanReport, ScanRequest, SearchClient, Supervisor,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

/// Process outcome, mapped to an exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Scan ran to the end of the stream.
    Success,
    /// Unrecovered fetch, cursor store, configuration, or usage error.
    Failure,
    /// Stopped by Ctrl-C between pages or during a retry backoff.
    Interrupted,
}

impl ProcessExit {
    fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::Interrupted => 130,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return usage_exit(&err),
    };
    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    let outcome = match run(args).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Cookie monitor failed");
            ProcessExit::Failure
        }
    };
    ExitCode::from(outcome.code())
}

/// Prints a clap error or help text; usage errors are configuration failures.
fn usage_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::from(ProcessExit::Failure.code())
    } else {
        ExitCode::from(ProcessExit::Success.code())
    }
}

fn init_tracing(args: &Args) {
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> Result<ProcessExit> {
    let mut api = ApiConfig::new(args.base_url.clone(), ApiKey::new(args.api_key.clone()));
    api.tenant_id = args.tenant_id;
    api.request_timeout = Duration::from_secs(args.request_timeout_secs);
    api.validate().context("invalid API configuration")?;

    let options = ScanOptions {
        page_delay: Duration::from_millis(args.page_delay_ms),
        tolerate_cursor_load_errors: args.tolerate_cursor_errors,
    };
    options.validate().context("invalid scan options")?;

    let mut request = ScanRequest::new(ScanFilters::new(&args.domain, &args.cookie_name))
        .include_expired(args.include_expired);
    if args.imported_within_days > 0 {
        request = request.imported_within(TimeDelta::days(i64::from(args.imported_within_days)));
    }

    let client = SearchClient::new(&api).context("failed to initialize search client")?;
    let controller = ScanController::new(
        Arc::new(client),
        Arc::new(FileCursorStore::new(&args.cursor_file)),
        Arc::new(LoggingVerifier),
        Arc::new(LoggingRemediator),
        options,
    );
    let supervisor = Supervisor::new(RetryPolicy::with_max_attempts(args.max_attempts));

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    info!(
        domain = %args.domain,
        cookie_name = %args.cookie_name,
        cursor_file = %args.cursor_file.display(),
        "Cookie monitor starting"
    );

    let report = match supervisor.run(&controller, &request, &cancel).await {
        Ok(report) => report,
        Err(err) => {
            report_failures(err.report());
            return Err(err.into());
        }
    };
    report_failures(&report);

    if report.was_cancelled() {
        warn!(pages = report.pages, "Scan interrupted; resume later from the saved cursor");
        return Ok(ProcessExit::Interrupted);
    }
    Ok(ProcessExit::Success)
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received; finishing current page");
            cancel.cancel();
        }
    });
}

fn report_failures(report: &ScanReport) {
    if report.is_clean() {
        return;
    }
    warn!(
        failed = report.failures.len(),
        "Some cookies could not be verified or remediated; follow up manually"
    );
    for failure in &report.failures {
        warn!(cookie = %failure.record(), error = %failure, "Needs follow-up");
    }
}
