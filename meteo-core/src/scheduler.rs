//! The cooperative control loop.
//!
//! One tick runs, in order: connectivity watchdog, at most one fetch, display
//! rotation. Every blocking step is bounded: the association wait, one fetch
//! timeout, or the error overlay hold.

use anyhow::ensure;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::time::{Instant, sleep_until};

use crate::{
    connectivity::{ConnectivityManager, NetworkLink},
    display::{CharDisplay, DisplayRenderer},
    model::{CurrentConditions, Location},
    provider::WeatherSource,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub tick: Duration,
    pub display_cycle: Duration,
    pub refresh_interval: Duration,
    pub missing_retry: Duration,
    pub fetch_timeout: Duration,
    pub link_timeout: Duration,
    pub link_cooldown: Duration,
    pub error_hold: Duration,
    pub redraw_on_fetch: bool,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(100),
            display_cycle: Duration::from_secs(5),
            refresh_interval: Duration::from_secs(600),
            missing_retry: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            link_timeout: Duration::from_secs(15),
            link_cooldown: Duration::from_secs(30),
            error_hold: Duration::from_secs(2),
            redraw_on_fetch: false,
        }
    }
}

/// Everything the loop mutates. Indices of `cache` and `fetched_at` match the
/// location list.
#[derive(Debug, Clone)]
pub struct SchedulerState {
    cache: Vec<Option<CurrentConditions>>,
    fetched_at: Vec<Option<Instant>>,
    current: usize,
    phase_started: Instant,
    last_link_retry: Option<Instant>,
}

impl SchedulerState {
    pub fn new(locations: usize, now: Instant) -> Self {
        Self {
            cache: vec![None; locations],
            fetched_at: vec![None; locations],
            current: 0,
            phase_started: now,
            last_link_retry: None,
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn conditions(&self, index: usize) -> Option<&CurrentConditions> {
        self.cache.get(index).and_then(Option::as_ref)
    }

    pub fn fetched_at(&self, index: usize) -> Option<Instant> {
        self.fetched_at.get(index).copied().flatten()
    }

    pub fn last_link_retry(&self) -> Option<Instant> {
        self.last_link_retry
    }

    /// Never attempted, older than the refresh interval, or still empty and
    /// older than the missing-data retry gap.
    pub fn is_due(&self, index: usize, now: Instant, timings: &Timings) -> bool {
        match self.fetched_at[index] {
            None => true,
            Some(at) => {
                let age = now.saturating_duration_since(at);
                age >= timings.refresh_interval
                    || (self.cache[index].is_none() && age >= timings.missing_retry)
            }
        }
    }

    /// First due location in index order.
    pub fn next_due(&self, now: Instant, timings: &Timings) -> Option<usize> {
        (0..self.cache.len()).find(|&index| self.is_due(index, now, timings))
    }

    pub fn link_retry_due(&self, now: Instant, cooldown: Duration) -> bool {
        self.last_link_retry
            .is_none_or(|at| now.saturating_duration_since(at) >= cooldown)
    }

    /// Step the rotation forward by one, wrapping.
    pub fn advance(&mut self) -> usize {
        self.current = (self.current + 1) % self.cache.len();
        self.current
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub reconnect_attempted: bool,
    pub fetched: Option<usize>,
    pub rotated: bool,
}

#[derive(Debug)]
pub struct Scheduler<S, L, D> {
    locations: Vec<Location>,
    timings: Timings,
    source: S,
    connectivity: ConnectivityManager<L>,
    renderer: DisplayRenderer<D>,
    state: SchedulerState,
}

impl<S, L, D> Scheduler<S, L, D>
where
    S: WeatherSource,
    L: NetworkLink,
    D: CharDisplay,
{
    pub fn new(
        locations: Vec<Location>,
        timings: Timings,
        source: S,
        connectivity: ConnectivityManager<L>,
        renderer: DisplayRenderer<D>,
    ) -> anyhow::Result<Self> {
        ensure!(!locations.is_empty(), "Scheduler needs at least one location");

        let state = SchedulerState::new(locations.len(), Instant::now());
        Ok(Self { locations, timings, source, connectivity, renderer, state })
    }

    pub fn state(&self) -> &SchedulerState {
        &self.state
    }

    pub fn renderer(&self) -> &DisplayRenderer<D> {
        &self.renderer
    }

    pub fn connectivity(&self) -> &ConnectivityManager<L> {
        &self.connectivity
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Boot screen, initial association attempt, first render.
    pub async fn start(&mut self) {
        self.renderer.show_message("Booting...", "");
        self.try_connect(Instant::now()).await;
        // The first cooldown runs from the end of the boot attempt.
        self.state.last_link_retry = Some(Instant::now());

        self.state.phase_started = Instant::now();
        self.render_current();
    }

    /// Run forever: `start`, then one tick per period.
    pub async fn run(&mut self) {
        self.start().await;
        loop {
            let deadline = Instant::now() + self.timings.tick;
            let report = self.tick().await;
            if report != TickReport::default() {
                debug!("Tick: {report:?}");
            }
            sleep_until(deadline).await;
        }
    }

    pub async fn tick(&mut self) -> TickReport {
        let now = Instant::now();
        let mut report = TickReport::default();

        if !self.connectivity.is_connected()
            && self.state.link_retry_due(now, self.timings.link_cooldown)
        {
            report.reconnect_attempted = true;
            self.try_connect(now).await;
            self.render_current();
        }

        if self.connectivity.is_connected() {
            report.fetched = self.fetch_one(now).await;
        }

        if now.saturating_duration_since(self.state.phase_started) >= self.timings.display_cycle {
            let index = self.state.advance();
            self.state.phase_started = Instant::now();
            debug!("Rotating to {}", self.locations[index].name);
            self.render_current();
            report.rotated = true;
        }

        report
    }

    fn render_current(&mut self) {
        let index = self.state.current;
        self.renderer.show_location(&self.locations[index], self.state.cache[index].as_ref());
    }

    async fn try_connect(&mut self, now: Instant) -> bool {
        self.state.last_link_retry = Some(now);
        if self.connectivity.is_connected() {
            return true;
        }

        self.renderer.show_message("Connecting WiFi", "");
        match self.connectivity.ensure_connected(self.timings.link_timeout).await {
            Ok(()) => true,
            Err(err) => {
                warn!("Connectivity: {err}; next attempt in {:?}", self.timings.link_cooldown);
                self.renderer.show_message("No WiFi", "");
                false
            }
        }
    }

    /// Fetch the first due location, if any. Returns its index.
    async fn fetch_one(&mut self, now: Instant) -> Option<usize> {
        let index = self.state.next_due(now, &self.timings)?;
        let location = &self.locations[index];

        debug!("Fetching current conditions for {}", location.name);
        let result = self.source.fetch_current(location, self.timings.fetch_timeout).await;
        self.state.fetched_at[index] = Some(Instant::now());

        match result {
            Ok(conditions) => {
                info!(
                    "{}: {:.1}C, {}% humidity, code {}",
                    location.name,
                    conditions.temperature_c,
                    conditions.humidity_pct,
                    conditions.weather_code
                );
                self.state.cache[index] = Some(conditions);
                if self.timings.redraw_on_fetch && index == self.state.current {
                    self.render_current();
                }
            }
            Err(err) => {
                warn!("Fetch for {} failed: {err}", location.name);
                if index == self.state.current {
                    self.renderer.show_error(&err.tag(), self.timings.error_hold).await;
                    self.render_current();
                }
            }
        }

        Some(index)
    }
}
