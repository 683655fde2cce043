use async_trait::async_trait;
use serde::Deserialize;

use ecopulse_core::{FeedReading, FetchFailure, FetchOutcome};

use super::{HttpFetcher, ReadingSource};

/// Grid carbon intensity (CO2 Signal style API).
pub struct CarbonIntensitySource {
    http: HttpFetcher,
    url: String,
    auth_token: Option<String>,
}

impl CarbonIntensitySource {
    pub fn new(http: HttpFetcher, url: String, auth_token: Option<String>) -> Self {
        Self {
            http,
            url,
            auth_token,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    data: Option<Data>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Data {
    carbon_intensity: Option<f64>,
}

/// Expects `{"data": {"carbonIntensity": <number>}}`.
pub fn parse_carbon_intensity(body: &[u8]) -> FetchOutcome {
    let p: Payload = serde_json::from_slice(body)
        .map_err(|e| FetchFailure::Malformed(format!("carbon intensity: {e}")))?;
    let g = p
        .data
        .and_then(|d| d.carbon_intensity)
        .ok_or_else(|| FetchFailure::Malformed("missing data.carbonIntensity".into()))?;
    if !g.is_finite() || g < 0.0 {
        return Err(FetchFailure::Malformed(format!("carbon intensity out of range: {g}")));
    }
    Ok(FeedReading::CarbonIntensity { grams_per_kwh: g })
}

#[async_trait]
impl ReadingSource for CarbonIntensitySource {
    fn name(&self) -> &'static str {
        "carbon_intensity"
    }

    async fn fetch(&self) -> FetchOutcome {
        let body = match &self.auth_token {
            Some(token) => self.http.get(&self.url, &[("auth-token", token.as_str())]).await?,
            None => self.http.get(&self.url, &[]).await?,
        };
        parse_carbon_intensity(&body)
    }
}
