use anyhow::{Context, Result, anyhow, ensure};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    connectivity::WifiCredentials, model::Location, provider::openmeteo::DEFAULT_BASE_URL,
    scheduler::Timings,
};

/// Network association settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
    /// Longest a single association attempt may block the loop.
    pub timeout_secs: u64,
    /// Cooldown between association attempts while disconnected.
    pub retry_ms: u64,
    /// Host builds only: `host:port` whose reachability stands in for association.
    pub probe_target: String,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            timeout_secs: 15,
            retry_ms: 30_000,
            probe_target: "api.open-meteo.com:443".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub cols: usize,
    pub rows: usize,
    /// How long each location stays on screen.
    pub cycle_ms: u64,
    pub tick_ms: u64,
    pub error_hold_ms: u64,
    /// Redraw right away when fresh data lands for the location on screen.
    pub redraw_on_fetch: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cols: 16,
            rows: 2,
            cycle_ms: 5_000,
            tick_ms: 100,
            error_hold_ms: 2_000,
            redraw_on_fetch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub base_url: String,
    /// Age after which cached data is refreshed.
    pub interval_ms: u64,
    pub timeout_secs: u64,
    /// Retry gap for a location that has never produced data.
    pub missing_retry_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            interval_ms: 600_000,
            timeout_secs: 10,
            missing_retry_ms: 30_000,
        }
    }
}

/// Static configuration, read once at startup.
///
/// Example TOML:
/// [wifi]
/// ssid = "home"
/// password = "..."
///
/// [[locations]]
/// name = "Eilat"
/// latitude = 29.5581
/// longitude = 34.9482
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub wifi: WifiConfig,
    pub locations: Vec<Location>,
    pub display: DisplayConfig,
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wifi: WifiConfig::default(),
            locations: vec![
                Location::new("Tel-Aviv", 32.0853, 34.7818),
                Location::new("Jerusalem", 31.7683, 35.2137),
                Location::new("Eilat", 29.5581, 34.9482),
            ],
            display: DisplayConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config dir, or defaults if there is none yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate an explicit config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "meteo-lcd", "meteo-lcd")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.locations.is_empty(), "At least one location must be configured");
        ensure!(self.display.rows == 2, "Only two-row displays are supported, got {}", self.display.rows);
        ensure!(self.display.cols >= 8, "Display needs at least 8 columns, got {}", self.display.cols);
        ensure!(self.display.tick_ms > 0, "display.tick_ms must be positive");

        for location in &self.locations {
            ensure!(!location.name.trim().is_empty(), "Location names must not be empty");
            ensure!(
                (-90.0..=90.0).contains(&location.latitude)
                    && (-180.0..=180.0).contains(&location.longitude),
                "Location {} has out-of-range coordinates",
                location.name
            );
        }
        Ok(())
    }

    pub fn credentials(&self) -> WifiCredentials {
        WifiCredentials { ssid: self.wifi.ssid.clone(), password: self.wifi.password.clone() }
    }

    pub fn timings(&self) -> Timings {
        Timings {
            tick: Duration::from_millis(self.display.tick_ms),
            display_cycle: Duration::from_millis(self.display.cycle_ms),
            refresh_interval: Duration::from_millis(self.fetch.interval_ms),
            missing_retry: Duration::from_millis(self.fetch.missing_retry_ms),
            fetch_timeout: Duration::from_secs(self.fetch.timeout_secs),
            link_timeout: Duration::from_secs(self.wifi.timeout_secs),
            link_cooldown: Duration::from_millis(self.wifi.retry_ms),
            error_hold: Duration::from_millis(self.display.error_hold_ms),
            redraw_on_fetch: self.display.redraw_on_fetch,
        }
    }
}
