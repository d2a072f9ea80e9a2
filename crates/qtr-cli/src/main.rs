mod ambient;
mod cli;
mod commands;
mod data;
mod replay_feed;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ambient::load_ambient_settings;
use cli::{Cli, Command};
use qtr_domain::TradingMode;

fn main() {
    let cli = Cli::parse();

    let ambient = match load_ambient_settings(&cli.config) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error: failed to load config: {e:#}");
            std::process::exit(1);
        }
    };

    init_tracing(&ambient.logging.log_level);

    let result = match &cli.command {
        Command::Backtest(args) => commands::backtest::execute(args, &ambient),
        Command::Walkforward(args) => commands::walkforward::execute(args, &ambient),
        Command::Paper(args) => commands::run::execute(args, &ambient, TradingMode::Paper),
        Command::Live(args) => commands::run::execute(args, &ambient, TradingMode::Live),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
