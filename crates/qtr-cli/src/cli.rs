//! Command-line surface: `backtest`, `walkforward`, `paper`, `live`, each
//! sharing a common run-configuration shape.

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "qtr", version, about = "Bias-safe event-driven backtest and live trading core")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Layered config files, later ones override earlier ones.
    #[arg(long = "config", global = true)]
    pub config: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single-pass backtest over historical bars.
    Backtest(RunArgs),
    /// Roll a strategy through consecutive in-sample/out-of-sample windows.
    Walkforward(WalkforwardArgs),
    /// Paper-trade a strategy against the in-tree simulated broker.
    Paper(RunArgs),
    /// Trade live. Requires broker credentials to be configured.
    Live(RunArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MarketArg {
    Crypto,
    Kr,
    Us,
}

impl From<MarketArg> for qtr_domain::Market {
    fn from(m: MarketArg) -> Self {
        match m {
            MarketArg::Crypto => qtr_domain::Market::Crypto,
            MarketArg::Kr => qtr_domain::Market::Kr,
            MarketArg::Us => qtr_domain::Market::Us,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Registered strategy name, e.g. `turtle_breakout`.
    #[arg(long)]
    pub strategy: String,

    #[arg(long, value_enum)]
    pub market: MarketArg,

    /// Comma-separated symbol list.
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Path to a CSV bar file (see `qtr_cli::data` for the expected format).
    #[arg(long)]
    pub data: String,

    #[arg(long)]
    pub capital: Option<String>,

    #[arg(long, default_value = "1d")]
    pub interval: String,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct WalkforwardArgs {
    #[command(flatten)]
    pub run: RunArgs,

    #[arg(long)]
    pub start: String,

    #[arg(long)]
    pub end: String,

    #[arg(long = "is-days")]
    pub is_days: Option<i64>,

    #[arg(long = "oos-days")]
    pub oos_days: Option<i64>,

    #[arg(long = "step-days")]
    pub step_days: Option<i64>,
}
