use std::path::PathBuf;
use std::time::Duration;

use backfill::{ArtifactFormat, FetchFailurePolicy, Interval, MalformedRowPolicy, StepSize};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "backfill", version)]
#[command(about = "Backfill historical exchange candles into a CSV file")]
pub struct Cli {
    /// Credentials file (JSON). Falls back to `backfill.local.json`, then
    /// environment variables.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Binance spot klines (full trade statistics).
    Binance(BinanceArgs),
    /// Coinbase Exchange candles (OHLCV only).
    Coinbase(CoinbaseArgs),
    /// Print the latest Binance price for a symbol.
    Ticker(TickerArgs),
}

#[derive(Args, Debug)]
pub struct BinanceArgs {
    /// Trading pair, e.g. BTCUSDT.
    #[arg(long, default_value = "BTCUSDT")]
    pub symbol: String,

    /// Kline interval code (1m, 1h, 1d, ...).
    #[arg(long, default_value = "1d")]
    pub interval: Interval,

    /// First day to fetch (inclusive).
    #[arg(long, default_value = "2017-08-17")]
    pub start: NaiveDate,

    /// Day after the last day to fetch (exclusive).
    #[arg(long, default_value = "2025-08-17")]
    pub end: NaiveDate,

    #[command(flatten)]
    pub step: StepArgs,

    /// Destination file.
    #[arg(long, default_value = "data/btcusdt_data.csv")]
    pub output: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug)]
pub struct CoinbaseArgs {
    /// Product id, e.g. BTC-USD.
    #[arg(long, default_value = "BTC-USD")]
    pub symbol: String,

    /// Granularity in seconds or as an interval code.
    #[arg(long, default_value = "86400")]
    pub interval: Interval,

    /// First day to fetch (inclusive).
    #[arg(long, default_value = "2015-01-01")]
    pub start: NaiveDate,

    /// Day after the last day to fetch (exclusive). Defaults to yesterday.
    #[arg(long)]
    pub end: Option<NaiveDate>,

    #[command(flatten)]
    pub step: StepArgs,

    /// Destination file.
    #[arg(long, default_value = "data/coinbase_prices.csv")]
    pub output: PathBuf,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Args, Debug)]
pub struct TickerArgs {
    /// Trading pair, e.g. BTCUSDT.
    #[arg(long, default_value = "BTCUSDT")]
    pub symbol: String,
}

#[derive(Args, Debug)]
pub struct StepArgs {
    /// Window size in days.
    #[arg(long, conflicts_with = "step_years")]
    pub step_days: Option<u32>,

    /// Window size in calendar years.
    #[arg(long)]
    pub step_years: Option<u32>,
}

impl StepArgs {
    /// Explicit step, else `daily` for `1d` runs.
    ///
    /// Other intervals without a flag return `None` so the job sizes windows
    /// from the exchange page cap.
    pub fn resolve(&self, interval: Interval, daily: StepSize) -> Option<StepSize> {
        match (self.step_days, self.step_years) {
            (Some(n), _) => Some(StepSize::Days(n)),
            (None, Some(n)) => Some(StepSize::Years(n)),
            (None, None) => (interval == Interval::D1).then_some(daily),
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Output layout.
    #[arg(long, default_value = "csv")]
    pub format: ArtifactFormat,

    /// What to do when a window request fails.
    #[arg(long, value_enum, default_value_t = OnError::Skip)]
    pub on_fetch_error: OnError,

    /// What to do when a row cannot be parsed.
    #[arg(long, value_enum, default_value_t = OnError::Skip)]
    pub on_malformed_row: OnError,

    /// Keep only the first candle for each open time.
    #[arg(long)]
    pub dedup: bool,

    /// Keep rows in the order the exchange returned them.
    #[arg(long)]
    pub no_sort: bool,

    /// Window requests allowed in flight at once.
    #[arg(long, default_value_t = 1)]
    pub max_in_flight: usize,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl RunArgs {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OnError {
    Skip,
    Abort,
}

impl From<OnError> for FetchFailurePolicy {
    fn from(v: OnError) -> Self {
        match v {
            OnError::Skip => Self::Skip,
            OnError::Abort => Self::Abort,
        }
    }
}

impl From<OnError> for MalformedRowPolicy {
    fn from(v: OnError) -> Self {
        match v {
            OnError::Skip => Self::Skip,
            OnError::Abort => Self::Abort,
        }
    }
}
