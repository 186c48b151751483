//! Core library for the `meteo-lcd` weather appliance.
//!
//! This crate defines:
//! - The cooperative scheduler loop (connectivity, refresh, rotation)
//! - Weather decoding and the Open-Meteo client
//! - Connectivity management over an abstract network link
//! - Two-row character display rendering
//! - Static configuration
//!
//! It is used by `meteo-cli`, which supplies host implementations of the
//! display and wires everything together.

pub mod codec;
pub mod config;
pub mod connectivity;
pub mod display;
pub mod model;
pub mod provider;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use connectivity::{ConnectivityManager, LinkState, NetworkLink, WifiCredentials};
pub use display::{CharDisplay, DisplayRenderer, Lines};
pub use model::{CurrentConditions, Location};
pub use provider::{FetchError, OpenMeteoClient, WeatherSource};
pub use scheduler::{Scheduler, SchedulerState, Timings};
