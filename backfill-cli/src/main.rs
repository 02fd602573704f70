//! `backfill` command-line tool.
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=info,backfill=debug`.

mod cli;
mod connectors;

use std::path::Path;

use backfill::{Backfill, BackfillReport, StepSize, write_series};
use chrono::{Days, Utc};
use clap::Parser;

use cli::{Cli, Command, RunArgs};
use connectors::{Exchange, connector_for};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Command::Binance(args) => {
            let connector = connector_for(Exchange::Binance, config)?;
            let backfill = orchestrator(connector, &args.run)?;
            let mut job = backfill
                .job(args.symbol)
                .interval(args.interval)
                .period(args.start, args.end);
            if let Some(step) = args.step.resolve(args.interval, StepSize::Years(1)) {
                job = job.step(step);
            }
            let report = job.run().await?;
            finish(&report, &args.output, &args.run)?;
        }
        Command::Coinbase(args) => {
            let connector = connector_for(Exchange::Coinbase, config)?;
            let backfill = orchestrator(connector, &args.run)?;
            let end = match args.end {
                Some(end) => end,
                None => yesterday()?,
            };
            let mut job = backfill
                .job(args.symbol)
                .interval(args.interval)
                .period(args.start, end);
            if let Some(step) = args.step.resolve(args.interval, StepSize::Days(99)) {
                job = job.step(step);
            }
            let report = job.run().await?;
            finish(&report, &args.output, &args.run)?;
        }
        Command::Ticker(args) => {
            let connector = connector_for(Exchange::Binance, config)?;
            let backfill = Backfill::builder().with_connector(connector).build()?;
            let ticker = backfill.ticker(&args.symbol).await?;
            println!("{} {}", ticker.symbol, ticker.price);
        }
    }
    Ok(())
}

fn orchestrator(
    connector: std::sync::Arc<dyn backfill::BackfillConnector>,
    run: &RunArgs,
) -> Result<Backfill, backfill::BackfillError> {
    let mut builder = Backfill::builder()
        .with_connector(connector)
        .fetch_failure(run.on_fetch_error.into())
        .malformed_rows(run.on_malformed_row.into())
        .sort_by_open_time(!run.no_sort)
        .dedup_by_open_time(run.dedup)
        .max_in_flight(run.max_in_flight);
    if let Some(t) = run.request_timeout() {
        builder = builder.request_timeout(t);
    }
    builder.build()
}

fn yesterday() -> Result<chrono::NaiveDate, backfill::BackfillError> {
    Utc::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| backfill::BackfillError::InvalidArg("no day before today".into()))
}

fn finish(
    report: &BackfillReport,
    output: &Path,
    run: &RunArgs,
) -> Result<(), backfill::BackfillError> {
    for w in &report.warnings {
        tracing::warn!(warning = %w, "backfill warning");
    }
    write_series(&report.series, output, run.format)?;
    println!(
        "wrote {} candles for {} to {} ({} windows, {} skipped, {} warnings)",
        report.series.len(),
        report.symbol,
        output.display(),
        report.windows.len(),
        report.skipped_windows().count(),
        report.warnings.len(),
    );
    Ok(())
}
