//! Ticker endpoint feed.
//!
//! Issues a single blocking GET against a CoinMarketCap-style `/v1/ticker/`
//! URL and hands back the response body as a byte stream. No retry, no
//! backoff, no authentication; the request timeout is the transport default.
//!
//! The client is built without compression features, so no Accept-Encoding is
//! negotiated and the bytes read are the raw body as served.

use super::provider::{MarketError, MarketFeed};
use std::io::Read;
use tracing::{debug, info};

/// HTTP feed for the ticker endpoint.
pub struct TickerFeed {
    client: reqwest::blocking::Client,
}

impl TickerFeed {
    pub fn new() -> Result<Self, MarketError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("tickerlab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MarketError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Use a preconfigured client (proxy settings, timeouts, TLS roots).
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl MarketFeed for TickerFeed {
    fn name(&self) -> &str {
        "ticker_http"
    }

    fn open(&self, url: &str) -> Result<Box<dyn Read>, MarketError> {
        info!(url, "fetching market data");

        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| MarketError::Network(format!("GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MarketError::Network(format!("HTTP {status} for {url}")));
        }

        debug!(%status, content_length = ?resp.content_length(), "response received");
        Ok(Box::new(resp))
    }
}
