//! Binary crate for the `meteo-lcd` appliance runner.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Logger setup
//! - A terminal stand-in for the 16x2 character display
//! - Wiring host implementations into the core scheduler

use clap::Parser;

mod cli;
mod terminal;

/// stderr shares the terminal with the redrawn display box; keep it quiet
/// unless `RUST_LOG` asks for more.
const DEFAULT_LOG_FILTER: &str = "warn";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
