use crate::{
    codec::DecodeError,
    model::{CurrentConditions, Location},
};
use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use thiserror::Error;

pub mod openmeteo;

pub use openmeteo::OpenMeteoClient;

/// Why a single fetch produced no conditions.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request did not complete in time")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl FetchError {
    /// Short tag for the on-device error overlay.
    pub fn tag(&self) -> String {
        match self {
            FetchError::Timeout => "Timeout".to_string(),
            FetchError::Transport(_) => "Transport".to_string(),
            FetchError::Status(code) => format!("HTTP {code}"),
            FetchError::Decode(_) => "Decode".to_string(),
        }
    }
}

/// A source of current conditions for one location per call.
///
/// Implementations must not retry internally; the scheduler owns retry policy.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        location: &Location,
        timeout: Duration,
    ) -> Result<CurrentConditions, FetchError>;
}
