use std::time::Duration;

use reqwest::Client;

use ecopulse_core::FetchFailure;

/// Upper bound on a feed response body. Feed payloads are a few hundred bytes.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Shared HTTP client for all feeds.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `timeout` caps every request, on top of the engine's per-feed timeout.
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ecopulse/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(2)
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body of a 2xx response.
    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchFailure> {
        let mut req = self.client.get(url);
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        let mut resp = req.send().await.map_err(classify)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }
        if resp
            .content_length()
            .is_some_and(|len| len > MAX_BODY_BYTES as u64)
        {
            return Err(oversized());
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(classify)? {
            append_capped(&mut body, &chunk)?;
        }
        Ok(body)
    }
}

/// Append `chunk`, failing once the body would exceed [`MAX_BODY_BYTES`].
pub fn append_capped(body: &mut Vec<u8>, chunk: &[u8]) -> Result<(), FetchFailure> {
    if body.len() + chunk.len() > MAX_BODY_BYTES {
        return Err(oversized());
    }
    body.extend_from_slice(chunk);
    Ok(())
}

fn oversized() -> FetchFailure {
    FetchFailure::Malformed(format!("response body larger than {MAX_BODY_BYTES} bytes"))
}

fn classify(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::TimedOut
    } else {
        FetchFailure::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_within_cap_is_kept() {
        let mut body = Vec::new();
        assert!(append_capped(&mut body, b"{\"data\":").is_ok());
        assert!(append_capped(&mut body, b"{}}").is_ok());
        assert_eq!(body, b"{\"data\":{}}");
    }

    #[test]
    fn oversized_body_is_malformed() {
        let mut body = vec![0u8; MAX_BODY_BYTES - 4];
        assert!(append_capped(&mut body, &[1, 2, 3, 4]).is_ok());
        let err = append_capped(&mut body, &[5]).unwrap_err();
        assert!(matches!(err, FetchFailure::Malformed(_)));
        assert_eq!(body.len(), MAX_BODY_BYTES);
    }
}
