//! REST client for the realtime quote endpoint

use super::types::RealtimePayload;
use super::{FeedError, Quote, QuoteSource};
use crate::config::FeedConfig;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use std::time::Duration;

/// Client for `GET /api/stocks/:symbol/realtime`
pub struct RestQuoteClient {
    base_url: Url,
    client: Client,
}

impl RestQuoteClient {
    /// Create a client for `base_url` with the given request timeout
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| anyhow::anyhow!("Invalid base URL {}: {}", base_url.as_ref(), e))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Base URL {} cannot carry a path", base_url);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            base_url,
            client,
        })
    }

    /// Create a client from configuration; `None` when no base URL is set
    pub fn from_config(config: &FeedConfig) -> anyhow::Result<Option<Self>> {
        config
            .base_url
            .as_ref()
            .map(|url| Self::new(url.clone(), Duration::from_secs(config.timeout_secs)))
            .transpose()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full URL of the realtime endpoint for `symbol`
    ///
    /// The symbol is a single percent-encoded path segment, so reserved
    /// characters cannot redirect the request to another resource.
    pub fn endpoint(&self, symbol: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "stocks", symbol, "realtime"]);
        }
        url
    }
}

#[async_trait]
impl QuoteSource for RestQuoteClient {
    async fn fetch(&self, symbol: &str) -> Result<Quote, FeedError> {
        let url = self.endpoint(symbol);
        tracing::debug!(url = %url, "Fetching realtime quote");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Status { status, body });
        }

        let body = response.text().await?;
        let payload: RealtimePayload =
            serde_json::from_str(&body).map_err(|e| FeedError::Decode(e.to_string()))?;

        Ok(payload.into_quote(symbol, Utc::now()))
    }
}
