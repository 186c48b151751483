//! Test doubles for the scheduler's collaborators.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::time::{Instant, sleep};

use crate::{
    connectivity::{NetworkLink, WifiCredentials},
    model::{CurrentConditions, Location},
    provider::{FetchError, WeatherSource},
};

#[derive(Debug, Clone)]
pub(crate) struct FakeLink(Arc<LinkInner>);

#[derive(Debug)]
pub(crate) struct LinkInner {
    up: AtomicBool,
    reject: bool,
    associate_after: Option<Duration>,
    connects: Mutex<Vec<Instant>>,
}

impl FakeLink {
    fn build(up: bool, reject: bool, associate_after: Option<Duration>) -> Self {
        Self(Arc::new(LinkInner {
            up: AtomicBool::new(up),
            reject,
            associate_after,
            connects: Mutex::new(Vec::new()),
        }))
    }

    pub(crate) fn up() -> Self {
        Self::build(true, false, None)
    }

    pub(crate) fn never() -> Self {
        Self::build(false, false, None)
    }

    pub(crate) fn associates_after(delay: Duration) -> Self {
        Self::build(false, false, Some(delay))
    }

    pub(crate) fn rejecting() -> Self {
        Self::build(false, true, None)
    }

    pub(crate) fn set_up(&self, up: bool) {
        self.0.up.store(up, Ordering::SeqCst);
    }

    pub(crate) fn connect_times(&self) -> Vec<Instant> {
        self.0.connects.lock().unwrap().clone()
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.0.connects.lock().unwrap().len()
    }
}

#[async_trait]
impl NetworkLink for FakeLink {
    async fn connect(&self, _credentials: &WifiCredentials) -> anyhow::Result<()> {
        self.0.connects.lock().unwrap().push(Instant::now());
        if self.0.reject {
            anyhow::bail!("radio refused to start");
        }
        Ok(())
    }

    fn is_associated(&self) -> bool {
        if self.0.up.load(Ordering::SeqCst) {
            return true;
        }
        let last_connect = self.0.connects.lock().unwrap().last().copied();
        match (self.0.associate_after, last_connect) {
            (Some(delay), Some(at)) if at + delay <= Instant::now() => {
                self.set_up(true);
                true
            }
            _ => false,
        }
    }
}

type FailureFn = fn() -> FetchError;

/// Answers every location with fixed conditions unless told to fail it.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedSource(Arc<SourceInner>);

#[derive(Debug, Default)]
pub(crate) struct SourceInner {
    latency: Duration,
    conditions: Mutex<HashMap<String, CurrentConditions>>,
    failures: Mutex<HashMap<String, FailureFn>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

pub(crate) const DEFAULT_CONDITIONS: CurrentConditions =
    CurrentConditions { temperature_c: 21.0, humidity_pct: 55, weather_code: 0 };

impl ScriptedSource {
    pub(crate) fn with_latency(latency: Duration) -> Self {
        Self(Arc::new(SourceInner { latency, ..Default::default() }))
    }

    pub(crate) fn set(&self, name: &str, conditions: CurrentConditions) {
        self.0.conditions.lock().unwrap().insert(name.to_string(), conditions);
    }

    pub(crate) fn fail(&self, name: &str, failure: FailureFn) {
        self.0.failures.lock().unwrap().insert(name.to_string(), failure);
    }

    pub(crate) fn heal(&self, name: &str) {
        self.0.failures.lock().unwrap().remove(name);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.0.calls.lock().unwrap().iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn call_times(&self) -> Vec<Instant> {
        self.0.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl WeatherSource for ScriptedSource {
    async fn fetch_current(
        &self,
        location: &Location,
        _timeout: Duration,
    ) -> Result<CurrentConditions, FetchError> {
        self.0.calls.lock().unwrap().push((location.name.clone(), Instant::now()));
        if !self.0.latency.is_zero() {
            sleep(self.0.latency).await;
        }

        if let Some(failure) = self.0.failures.lock().unwrap().get(&location.name) {
            return Err(failure());
        }
        Ok(self
            .0
            .conditions
            .lock()
            .unwrap()
            .get(&location.name)
            .copied()
            .unwrap_or(DEFAULT_CONDITIONS))
    }
}
