//! Best-effort override feeds.
//!
//! A feed fetches one external value and turns it into a `FeedReading`. Every
//! failure is a `FetchFailure` value; nothing here panics or retries. The
//! engine decides when to fetch (see `Trigger`) and how long to wait.

mod bitcoin;
mod carbon;
mod http;
mod weather;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ecopulse_core::error::{EcoPulseError, Result};
use ecopulse_core::FetchOutcome;

use crate::config::{EcoPulseConfig, FeedKind, Trigger};

pub use bitcoin::{parse_bitcoin_price, BitcoinPriceSource};
pub use carbon::{parse_carbon_intensity, CarbonIntensitySource};
pub use http::HttpFetcher;
pub use weather::{parse_weather, WeatherSource};

/// One external value provider.
#[async_trait]
pub trait ReadingSource: Send + Sync {
    /// Stable name, used in logs and metric labels.
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> FetchOutcome;
}

/// A source plus its fetch policy.
#[derive(Clone)]
pub struct RegisteredFeed {
    pub source: Arc<dyn ReadingSource>,
    pub trigger: Trigger,
    pub timeout: Duration,
}

impl RegisteredFeed {
    pub fn name(&self) -> &'static str {
        self.source.name()
    }
}

/// Ordered set of feeds. An empty registry means a fully simulated service.
#[derive(Clone, Default)]
pub struct FeedRegistry {
    feeds: Vec<RegisteredFeed>,
}

impl FeedRegistry {
    pub fn new() -> Self {
        Self { feeds: Vec::new() }
    }

    pub fn register(&mut self, source: Arc<dyn ReadingSource>, trigger: Trigger, timeout: Duration) {
        self.feeds.push(RegisteredFeed {
            source,
            trigger,
            timeout,
        });
    }

    /// Build the HTTP-backed feeds enabled in `cfg`, sharing one client.
    pub fn from_config(cfg: &EcoPulseConfig) -> Result<Self> {
        let mut registry = Self::new();
        let enabled: Vec<_> = cfg.enabled_feeds().collect();
        if enabled.is_empty() {
            return Ok(registry);
        }

        let ceiling = enabled
            .iter()
            .map(|f| f.timeout())
            .max()
            .unwrap_or(Duration::from_secs(10));
        let fetcher = HttpFetcher::new(ceiling)
            .map_err(|e| EcoPulseError::Internal(format!("http client build failed: {e}")))?;

        for f in enabled {
            let source: Arc<dyn ReadingSource> = match f.kind {
                FeedKind::CarbonIntensity => Arc::new(CarbonIntensitySource::new(
                    fetcher.clone(),
                    f.url.clone(),
                    f.auth_token.clone(),
                )),
                FeedKind::Weather => Arc::new(WeatherSource::new(fetcher.clone(), f.url.clone())),
                FeedKind::BitcoinPrice => {
                    Arc::new(BitcoinPriceSource::new(fetcher.clone(), f.url.clone()))
                }
            };
            tracing::info!(source = source.name(), trigger = ?f.trigger(), "feed registered");
            registry.register(source, f.trigger(), f.timeout());
        }
        Ok(registry)
    }

    pub fn get(&self, idx: usize) -> Option<&RegisteredFeed> {
        self.feeds.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFeed> {
        self.feeds.iter()
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::config;

    #[test]
    fn registry_follows_enabled_feeds_in_order() {
        let cfg = config::load_from_str(
            r#"
version: 1
feeds:
  - kind: bitcoin_price
    url: "https://btc.test"
    tick_probability: 0.3
  - kind: weather
    enabled: false
    url: "https://weather.test"
    period_ms: 600000
  - kind: carbon_intensity
    url: "https://co2.test"
    period_ms: 300000
    timeout_ms: 2000
"#,
        )
        .unwrap();
        let registry = FeedRegistry::from_config(&cfg).unwrap();

        let names: Vec<_> = registry.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["bitcoin_price", "carbon_intensity"]);
        assert_eq!(registry.get(0).unwrap().trigger, Trigger::PerTick(0.3));
        assert_eq!(registry.get(1).unwrap().timeout, Duration::from_millis(2000));
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn no_feeds_is_fully_simulated() {
        let cfg = config::load_from_str("version: 1\n").unwrap();
        assert!(FeedRegistry::from_config(&cfg).unwrap().is_empty());
    }
}
