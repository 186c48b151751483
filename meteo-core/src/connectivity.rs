//! Network association lifecycle.
//!
//! [`ConnectivityManager`] drives a [`NetworkLink`] through
//! Disconnected → Connecting → Connected. Retry cooldown is the caller's job.

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use thiserror::Error;
use tokio::time::{Instant, sleep};

pub mod tcp_probe;

pub use tcp_probe::TcpProbeLink;

/// How often association status is polled while connecting.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Opaque network credentials.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[async_trait]
pub trait NetworkLink: Send + Sync + fmt::Debug {
    /// Start associating. Completion is observed through [`NetworkLink::is_associated`].
    async fn connect(&self, credentials: &WifiCredentials) -> anyhow::Result<()>;

    /// Non-blocking status probe.
    fn is_associated(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("no association within {0:?}")]
    TimedOut(Duration),

    #[error("association could not be started: {0}")]
    Link(String),
}

#[derive(Debug)]
pub struct ConnectivityManager<L> {
    link: L,
    credentials: WifiCredentials,
    state: LinkState,
}

impl<L: NetworkLink> ConnectivityManager<L> {
    pub fn new(link: L, credentials: WifiCredentials) -> Self {
        Self { link, credentials, state: LinkState::Disconnected }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Probe the link and resync [`LinkState`]. Never blocks.
    pub fn is_connected(&mut self) -> bool {
        let up = self.link.is_associated();
        match (self.state, up) {
            (LinkState::Connected, false) => {
                warn!("Network association lost");
                self.state = LinkState::Disconnected;
            }
            (_, true) if self.state != LinkState::Connected => {
                info!("Network association up");
                self.state = LinkState::Connected;
            }
            _ => {}
        }
        up
    }

    /// Associate, waiting at most `max_wait`. Blocks the caller for that long.
    pub async fn ensure_connected(&mut self, max_wait: Duration) -> Result<(), ConnectivityError> {
        if self.is_connected() {
            return Ok(());
        }

        self.state = LinkState::Connecting;
        info!("Associating with {:?}", self.credentials.ssid);

        if let Err(err) = self.link.connect(&self.credentials).await {
            self.state = LinkState::Disconnected;
            warn!("Association could not be started: {err:#}");
            return Err(ConnectivityError::Link(format!("{err:#}")));
        }

        let deadline = Instant::now() + max_wait;
        loop {
            if self.link.is_associated() {
                self.state = LinkState::Connected;
                info!("Network association up");
                return Ok(());
            }

            let now = Instant::now();
            if now >= deadline {
                self.state = LinkState::Disconnected;
                warn!("No association within {max_wait:?}");
                return Err(ConnectivityError::TimedOut(max_wait));
            }

            sleep(POLL_INTERVAL.min(deadline - now)).await;
        }
    }
}
