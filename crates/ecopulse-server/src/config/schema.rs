use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use ecopulse_core::error::{EcoPulseError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EcoPulseConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub simulator: SimulatorSection,

    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

impl EcoPulseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(EcoPulseError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.simulator.validate()?;

        let mut seen = HashSet::new();
        for feed in &self.feeds {
            if !seen.insert(feed.kind) {
                return Err(EcoPulseError::BadConfig(format!(
                    "feeds: duplicate kind {}",
                    feed.kind.as_str()
                )));
            }
            feed.validate(self.simulator.tick_interval_ms)?;
        }

        Ok(())
    }

    /// Feeds with `enabled: true`.
    pub fn enabled_feeds(&self) -> impl Iterator<Item = &FeedConfig> {
        self.feeds.iter().filter(|f| f.enabled)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ws_ping_interval_ms")]
    pub ws_ping_interval_ms: u64,

    /// How long `/readyz` reports 503 before the listener closes on shutdown.
    #[serde(default = "default_drain_grace_ms")]
    pub drain_grace_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ws_ping_interval_ms: default_ws_ping_interval_ms(),
            drain_grace_ms: default_drain_grace_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr()?;
        if !(5000..=120000).contains(&self.ws_ping_interval_ms) {
            return Err(EcoPulseError::BadConfig(
                "server.ws_ping_interval_ms must be between 5000 and 120000".into(),
            ));
        }
        if self.drain_grace_ms > 30000 {
            return Err(EcoPulseError::BadConfig(
                "server.drain_grace_ms must be at most 30000".into(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            EcoPulseError::BadConfig(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }

    pub fn ws_ping_interval(&self) -> Duration {
        Duration::from_millis(self.ws_ping_interval_ms)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_ws_ping_interval_ms() -> u64 {
    20000
}
fn default_drain_grace_ms() -> u64 {
    2000
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorSection {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Fixed RNG seed; `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulatorSection {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed: None,
        }
    }
}

impl SimulatorSection {
    pub fn validate(&self) -> Result<()> {
        if !(1000..=60000).contains(&self.tick_interval_ms) {
            return Err(EcoPulseError::BadConfig(
                "simulator.tick_interval_ms must be between 1000 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn default_tick_interval_ms() -> u64 {
    7000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    CarbonIntensity,
    Weather,
    BitcoinPrice,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::CarbonIntensity => "carbon_intensity",
            FeedKind::Weather => "weather",
            FeedKind::BitcoinPrice => "bitcoin_price",
        }
    }
}

/// When a feed is fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trigger {
    /// At startup, then every period.
    Every(Duration),
    /// On each simulator tick with this probability.
    PerTick(f64),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub kind: FeedKind,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub url: String,

    /// Sent as the `auth-token` header when present.
    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default)]
    pub period_ms: Option<u64>,

    #[serde(default)]
    pub tick_probability: Option<f64>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl FeedConfig {
    pub fn validate(&self, tick_interval_ms: u64) -> Result<()> {
        let name = self.kind.as_str();
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(EcoPulseError::BadConfig(format!(
                "feeds.{name}.url must be an http(s) url"
            )));
        }
        if !(1000..=30000).contains(&self.timeout_ms) {
            return Err(EcoPulseError::BadConfig(format!(
                "feeds.{name}.timeout_ms must be between 1000 and 30000"
            )));
        }
        match (self.period_ms, self.tick_probability) {
            (Some(period), None) => {
                if period < tick_interval_ms {
                    return Err(EcoPulseError::BadConfig(format!(
                        "feeds.{name}.period_ms must be at least simulator.tick_interval_ms"
                    )));
                }
            }
            (None, Some(p)) => {
                if !(p > 0.0 && p <= 1.0) {
                    return Err(EcoPulseError::BadConfig(format!(
                        "feeds.{name}.tick_probability must be in (0, 1]"
                    )));
                }
            }
            _ => {
                return Err(EcoPulseError::BadConfig(format!(
                    "feeds.{name} needs exactly one of period_ms or tick_probability"
                )));
            }
        }
        Ok(())
    }

    /// Only meaningful after `validate`.
    pub fn trigger(&self) -> Trigger {
        match (self.period_ms, self.tick_probability) {
            (Some(period), _) => Trigger::Every(Duration::from_millis(period)),
            (None, Some(p)) => Trigger::PerTick(p),
            (None, None) => Trigger::PerTick(0.0),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_enabled() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    8000
}
