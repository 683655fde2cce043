//! Values delivered by best-effort external feeds.
//!
//! A feed produces either a [`FeedReading`] or a [`FetchFailure`]. Failures
//! are recoverable by definition: the consumer drops them and the affected
//! gauge keeps its simulated drift.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gauge::{Gauge, ATMOSPHERIC_FLOOR};
use crate::log_feed::Category;

/// Outcome of one fetch attempt.
pub type FetchOutcome = std::result::Result<FeedReading, FetchFailure>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedReading {
    /// Grid carbon intensity in gCO₂/kWh.
    CarbonIntensity { grams_per_kwh: f64 },
    Temperature { location: String, celsius: f64 },
    /// Price as reported by the source, already formatted.
    BitcoinPrice { usd_rate: String },
}

/// A value substituted for one cycle of simulated drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Override {
    pub gauge: Gauge,
    pub value: f64,
}

impl FeedReading {
    /// Gauge override carried by this reading, if any.
    pub fn gauge_override(&self) -> Option<Override> {
        match self {
            // Intensity is folded into the ppm range of the atmospheric gauge.
            FeedReading::CarbonIntensity { grams_per_kwh } => Some(Override {
                gauge: Gauge::AtmosphericLevel,
                value: ATMOSPHERIC_FLOOR + grams_per_kwh / 10.0,
            }),
            FeedReading::Temperature { .. } | FeedReading::BitcoinPrice { .. } => None,
        }
    }

    /// Category and text of the log entry announcing this reading.
    pub fn log_line(&self) -> (Category, String) {
        match self {
            FeedReading::CarbonIntensity { grams_per_kwh } => (
                Category::Success,
                format!("Real-time CO₂ intensity updated: {grams_per_kwh:.2} gCO₂/kWh"),
            ),
            FeedReading::Temperature { location, celsius } => (
                Category::Info,
                format!("Global temperature monitoring: {location} - {celsius:.1}°C"),
            ),
            FeedReading::BitcoinPrice { usd_rate } => (
                Category::Process,
                format!("Monitoring cryptocurrency carbon footprint - BTC: ${usd_rate}"),
            ),
        }
    }
}

/// Recoverable failure of an external fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("non-success status: {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Malformed(String),
    #[error("timed out")]
    TimedOut,
}

impl FetchFailure {
    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchFailure::Transport(_) => "transport",
            FetchFailure::Status(_) => "status",
            FetchFailure::Malformed(_) => "malformed",
            FetchFailure::TimedOut => "timeout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carbon_intensity_maps_onto_ppm() {
        let r = FeedReading::CarbonIntensity { grams_per_kwh: 235.0 };
        let o = r.gauge_override();
        assert_eq!(
            o,
            Some(Override {
                gauge: Gauge::AtmosphericLevel,
                value: 423.5
            })
        );
        let (cat, text) = r.log_line();
        assert_eq!(cat, Category::Success);
        assert_eq!(text, "Real-time CO₂ intensity updated: 235.00 gCO₂/kWh");
    }

    #[test]
    fn log_only_readings() {
        let t = FeedReading::Temperature {
            location: "London".into(),
            celsius: 12.34,
        };
        assert!(t.gauge_override().is_none());
        assert_eq!(
            t.log_line(),
            (Category::Info, "Global temperature monitoring: London - 12.3°C".to_string())
        );

        let b = FeedReading::BitcoinPrice {
            usd_rate: "64,012.5500".into(),
        };
        assert!(b.gauge_override().is_none());
        assert_eq!(
            b.log_line().1,
            "Monitoring cryptocurrency carbon footprint - BTC: $64,012.5500"
        );
    }
}
