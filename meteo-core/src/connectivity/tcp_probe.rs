use async_trait::async_trait;
use log::debug;
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::{
    net::TcpStream,
    runtime::Handle,
    time::{Instant, timeout},
};

use super::{NetworkLink, WifiCredentials};

const NEVER: u64 = u64::MAX;

/// Host stand-in for a radio: the link counts as associated while a TCP
/// connection to `target` can be opened.
///
/// Probes run on spawned tasks so neither `connect` nor `is_associated` block.
#[derive(Debug, Clone)]
pub struct TcpProbeLink {
    target: String,
    probe_timeout: Duration,
    reprobe_after: Duration,
    shared: Arc<ProbeState>,
}

#[derive(Debug)]
struct ProbeState {
    epoch: Instant,
    associated: AtomicBool,
    in_flight: AtomicBool,
    /// Milliseconds since `epoch` of the last finished probe, or [`NEVER`].
    last_probe_ms: AtomicU64,
}

impl TcpProbeLink {
    pub fn new(target: impl Into<String>, probe_timeout: Duration, reprobe_after: Duration) -> Self {
        Self {
            target: target.into(),
            probe_timeout,
            reprobe_after,
            shared: Arc::new(ProbeState {
                epoch: Instant::now(),
                associated: AtomicBool::new(false),
                in_flight: AtomicBool::new(false),
                last_probe_ms: AtomicU64::new(NEVER),
            }),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    fn spawn_probe(&self) {
        let Ok(handle) = Handle::try_current() else {
            return;
        };
        if self.shared.in_flight.swap(true, Ordering::AcqRel) {
            return;
        }

        let target = self.target.clone();
        let probe_timeout = self.probe_timeout;
        let shared = Arc::clone(&self.shared);

        handle.spawn(async move {
            let reachable = matches!(
                timeout(probe_timeout, TcpStream::connect(target.as_str())).await,
                Ok(Ok(_))
            );
            debug!("Probe of {target}: reachable={reachable}");

            let elapsed = shared.epoch.elapsed().as_millis() as u64;
            shared.associated.store(reachable, Ordering::Release);
            shared.last_probe_ms.store(elapsed, Ordering::Release);
            shared.in_flight.store(false, Ordering::Release);
        });
    }

    fn probe_is_stale(&self) -> bool {
        match self.shared.last_probe_ms.load(Ordering::Acquire) {
            NEVER => true,
            last => {
                let now = self.shared.epoch.elapsed().as_millis() as u64;
                now.saturating_sub(last) >= self.reprobe_after.as_millis() as u64
            }
        }
    }
}

#[async_trait]
impl NetworkLink for TcpProbeLink {
    async fn connect(&self, credentials: &WifiCredentials) -> anyhow::Result<()> {
        debug!("Host link ignores credentials for {:?}; probing {}", credentials.ssid, self.target);
        self.spawn_probe();
        Ok(())
    }

    fn is_associated(&self) -> bool {
        let associated = self.shared.associated.load(Ordering::Acquire);
        // Only refresh while up; reassociation goes through `connect`.
        if associated && self.probe_is_stale() {
            self.spawn_probe();
        }
        associated
    }
}
