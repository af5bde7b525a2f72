use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use post_harvest::config::ConfigLoader;
use post_harvest::error::HarvestError;
use post_harvest::fetch::HttpTransport;
use post_harvest::output::JsonOutput;
use post_harvest::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "post-harvest")]
#[command(about = "Fetch posts for every user in data/users.csv and archive them to JSON and SQLite \
(an optional ./post-harvest.json overrides the defaults; an invalid one aborts the run)")]
#[command(long_about = "Fetch posts for every user in data/users.csv and archive them to \
data/users_data.json and data/users.db, then print a JSON run report to stdout.

If a post-harvest.json file exists in the working directory it overrides the built-in paths, \
endpoint and timeout. An unreadable or invalid post-harvest.json aborts the run before any \
work is done (exit code 1).")]
#[command(version, author)]
struct Cli {}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(err) = report.downcast_ref::<HarvestError>() {
                return ExitCode::from(map_exit_code(err));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &HarvestError) -> u8 {
    match error {
        HarvestError::MissingInput(_) | HarvestError::SourceFormat(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    let config = ConfigLoader::resolve(None)?;
    let transport = HttpTransport::new(
        config.api_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let pipeline = Pipeline::new(config, transport);

    let report = match pipeline.run() {
        Ok(report) => report,
        // Already logged by the pipeline; nothing was fetched or written.
        Err(err) => return Ok(ExitCode::from(map_exit_code(&err))),
    };

    if report.is_complete() {
        info!(
            "run finished: {} records, {} posts",
            report.records, report.posts
        );
    } else {
        warn!(
            "run finished with problems: {} records, {} posts, {} failed requests, archive {}, store {}",
            report.records,
            report.posts,
            report.request_failures.len(),
            if report.archive.is_done() { "ok" } else { "failed" },
            if report.store.is_done() { "ok" } else { "failed" },
        );
    }
    JsonOutput::print_report(&report).into_diagnostic()?;
    Ok(ExitCode::SUCCESS)
}
