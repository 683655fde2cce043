use async_trait::async_trait;
use serde::Deserialize;

use ecopulse_core::{FeedReading, FetchFailure, FetchOutcome};

use super::{HttpFetcher, ReadingSource};

/// Current temperature for one city (OpenWeatherMap style API, metric units).
pub struct WeatherSource {
    http: HttpFetcher,
    url: String,
}

impl WeatherSource {
    pub fn new(http: HttpFetcher, url: String) -> Self {
        Self { http, url }
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    name: Option<String>,
    main: Option<Main>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: Option<f64>,
}

/// Expects `{"name": <city>, "main": {"temp": <celsius>}}`.
pub fn parse_weather(body: &[u8]) -> FetchOutcome {
    let p: Payload = serde_json::from_slice(body)
        .map_err(|e| FetchFailure::Malformed(format!("weather: {e}")))?;
    let celsius = p
        .main
        .and_then(|m| m.temp)
        .filter(|t| t.is_finite())
        .ok_or_else(|| FetchFailure::Malformed("missing main.temp".into()))?;
    let location = p
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| FetchFailure::Malformed("missing name".into()))?;
    Ok(FeedReading::Temperature { location, celsius })
}

#[async_trait]
impl ReadingSource for WeatherSource {
    fn name(&self) -> &'static str {
        "weather"
    }

    async fn fetch(&self) -> FetchOutcome {
        let body = self.http.get(&self.url, &[]).await?;
        parse_weather(&body)
    }
}
