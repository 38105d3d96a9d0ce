//! Yahoo Finance chart API client.

use async_trait::async_trait;
use salesfloor_core::{ChartResponse, Quote, Timestamp, UpstreamError};
use std::time::Duration;

use super::QuoteSource;
use crate::telemetry::record_upstream_request;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Reads `regularMarketPrice` and friends from the v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartSource {
    client: reqwest::Client,
    base_url: String,
}

impl YahooChartSource {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| UpstreamError::Unavailable {
                reason: format!("Failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn chart_url(&self, symbol: &str) -> String {
        format!("{}/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl QuoteSource for YahooChartSource {
    async fn fetch(&self, symbol: &str, now: Timestamp) -> Result<Quote, UpstreamError> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await
            .map_err(|e| {
                record_upstream_request("error");
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                };
                UpstreamError::Unavailable { reason }
            })?;

        let status = response.status();
        if !status.is_success() {
            record_upstream_request("bad_status");
            return Err(UpstreamError::BadStatus {
                status: status.as_u16(),
            });
        }

        let body: ChartResponse = response.json().await.map_err(|e| {
            record_upstream_request("malformed");
            UpstreamError::Malformed {
                reason: e.to_string(),
            }
        })?;

        let quote = body
            .into_meta()
            .and_then(|meta| Quote::from_chart_meta(symbol, &meta, now))
            .inspect_err(|_| record_upstream_request("malformed"))?;

        record_upstream_request("ok");
        tracing::debug!(symbol, price = quote.price, "Quote fetched");
        Ok(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_url() -> Result<(), UpstreamError> {
        let source = YahooChartSource::new(
            "https://query1.finance.yahoo.com/v8/finance/chart/",
            Duration::from_secs(8),
        )?;
        assert_eq!(
            source.chart_url("QTZM"),
            "https://query1.finance.yahoo.com/v8/finance/chart/QTZM"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() -> Result<(), UpstreamError> {
        // Port 9 (discard) on loopback refuses connections.
        let source = YahooChartSource::new("http://127.0.0.1:9/chart", Duration::from_secs(2))?;
        let err = source.fetch("QTZM", chrono::Utc::now()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Unavailable { .. }));
        Ok(())
    }
}
