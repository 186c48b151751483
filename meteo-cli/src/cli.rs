use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use meteo_core::{
    Config, ConnectivityManager, DisplayRenderer, OpenMeteoClient, Scheduler, WeatherSource,
    connectivity::TcpProbeLink,
    display::{self, Lines},
};
use std::{path::PathBuf, time::Duration};

use crate::terminal::TerminalDisplay;

/// Bound on a single host reachability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo-lcd", version, about = "Rotating weather display for a 16x2 LCD")]
pub struct Cli {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Command {
    /// Run the display loop forever (default).
    Run,

    /// Fetch every location once and print what the display would show.
    Fetch,

    /// Print the effective configuration.
    Config,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        match self.command.unwrap_or(Command::Run) {
            Command::Run => run_forever(config).await,
            Command::Fetch => fetch_once(&config).await,
            Command::Config => {
                print_config(self.config, config);
                Ok(())
            }
        }
    }
}

async fn run_forever(config: Config) -> anyhow::Result<()> {
    let timings = config.timings();
    let link = TcpProbeLink::new(config.wifi.probe_target.clone(), PROBE_TIMEOUT, timings.link_cooldown);
    let connectivity = ConnectivityManager::new(link, config.credentials());
    let renderer = DisplayRenderer::new(
        TerminalDisplay::stdout(config.display.cols, config.display.rows),
        config.display.cols,
    );
    let source = OpenMeteoClient::with_base_url(config.fetch.base_url.clone());

    info!("Starting with {} locations", config.locations.len());
    let mut scheduler = Scheduler::new(config.locations, timings, source, connectivity, renderer)
        .context("Failed to set up scheduler")?;

    scheduler.run().await;
    Ok(())
}

async fn fetch_once(config: &Config) -> anyhow::Result<()> {
    let client = OpenMeteoClient::with_base_url(config.fetch.base_url.clone());
    let timeout = config.timings().fetch_timeout;
    let cols = config.display.cols;

    for location in &config.locations {
        let lines = match client.fetch_current(location, timeout).await {
            Ok(conditions) => display::data_lines(&location.name, &conditions, cols),
            Err(err) => {
                eprintln!("{}: {err}", location.name);
                Lines {
                    top: display::idle_lines(&location.name, cols).top,
                    bottom: display::fit(&format!("Err:{}", err.tag()), cols),
                }
            }
        };

        println!("|{}|", lines.top);
        println!("|{}|", lines.bottom);
        println!();
    }

    Ok(())
}

fn print_config(explicit: Option<PathBuf>, mut config: Config) {
    match explicit.map(Ok).unwrap_or_else(Config::config_file_path) {
        Ok(path) if path.exists() => println!("Config file: {}", path.display()),
        Ok(path) => println!("Config file: {} (not present, using defaults)", path.display()),
        Err(err) => println!("Config file: unavailable ({err})"),
    }

    if !config.wifi.password.is_empty() {
        config.wifi.password = "********".to_string();
    }
    println!("{config:#?}");
}
