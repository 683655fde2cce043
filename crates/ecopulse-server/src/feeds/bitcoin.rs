use async_trait::async_trait;
use serde::Deserialize;

use ecopulse_core::{FeedReading, FetchFailure, FetchOutcome};

use super::{HttpFetcher, ReadingSource};

/// Bitcoin USD price (CoinDesk BPI style API). Log flavor only, no gauge.
pub struct BitcoinPriceSource {
    http: HttpFetcher,
    url: String,
}

impl BitcoinPriceSource {
    pub fn new(http: HttpFetcher, url: String) -> Self {
        Self { http, url }
    }
}

#[derive(Debug, Deserialize)]
struct Payload {
    bpi: Bpi,
}

#[derive(Debug, Deserialize)]
struct Bpi {
    #[serde(rename = "USD")]
    usd: Rate,
}

#[derive(Debug, Deserialize)]
struct Rate {
    rate: String,
}

/// Expects `{"bpi": {"USD": {"rate": "<formatted price>"}}}`.
pub fn parse_bitcoin_price(body: &[u8]) -> FetchOutcome {
    let p: Payload = serde_json::from_slice(body)
        .map_err(|e| FetchFailure::Malformed(format!("bitcoin price: {e}")))?;
    let rate = p.bpi.usd.rate.trim().to_string();
    if rate.is_empty() {
        return Err(FetchFailure::Malformed("empty bpi.USD.rate".into()));
    }
    Ok(FeedReading::BitcoinPrice { usd_rate: rate })
}

#[async_trait]
impl ReadingSource for BitcoinPriceSource {
    fn name(&self) -> &'static str {
        "bitcoin_price"
    }

    async fn fetch(&self) -> FetchOutcome {
        let body = self.http.get(&self.url, &[]).await?;
        parse_bitcoin_price(&body)
    }
}
