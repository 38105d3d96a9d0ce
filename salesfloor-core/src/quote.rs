//! Stock quote shape and the arithmetic applied to upstream chart data.

use async_trait::async_trait;
use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::Timestamp;

/// Display quote for a single ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub previous_close: f64,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub timestamp: Timestamp,
    /// Set when the upstream failed and a cached copy is served instead.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stale: bool,
}

impl Quote {
    /// Build a quote from chart metadata.
    ///
    /// Price falls back to the previous close; previous close prefers the
    /// chart's previous close, then the session previous close, then the
    /// price itself. Figures are rounded to cents after computing change.
    pub fn from_chart_meta(
        symbol: &str,
        meta: &ChartMeta,
        fetched_at: Timestamp,
    ) -> Result<Self, UpstreamError> {
        let price = meta
            .regular_market_price
            .or(meta.previous_close)
            .or(meta.chart_previous_close)
            .ok_or_else(|| UpstreamError::Malformed {
                reason: "chart meta carries no price".to_string(),
            })?;
        let previous_close = meta
            .chart_previous_close
            .or(meta.previous_close)
            .unwrap_or(price);

        let change = price - previous_close;
        let change_percent = if previous_close != 0.0 {
            change / previous_close * 100.0
        } else {
            0.0
        };

        let timestamp = meta
            .regular_market_time
            .and_then(|secs| chrono::Utc.timestamp_opt(secs, 0).single())
            .unwrap_or(fetched_at);

        Ok(Self {
            symbol: meta
                .symbol
                .clone()
                .unwrap_or_else(|| symbol.to_string()),
            price: round_cents(price),
            change: round_cents(change),
            change_percent: round_cents(change_percent),
            previous_close: round_cents(previous_close),
            timestamp,
            stale: false,
        })
    }

    /// Copy of this quote marked as stale.
    pub fn into_stale(mut self) -> Self {
        self.stale = true;
        self
    }
}

/// Fetches a point-in-time quote for one symbol from a market data upstream.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the latest quote for an upper-cased `symbol`. `now` stamps the
    /// quote when the upstream omits a market time.
    async fn fetch(&self, symbol: &str, now: Timestamp) -> Result<Quote, UpstreamError>;
}

/// Round to two decimal places.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// UPSTREAM CHART PAYLOAD
// ============================================================================

/// Top-level chart API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
}

/// The subset of chart metadata the quote needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub chart_previous_close: Option<f64>,
    pub regular_market_time: Option<i64>,
}

impl ChartResponse {
    /// Metadata of the first result, if the response carries one.
    pub fn into_meta(self) -> Result<ChartMeta, UpstreamError> {
        if let Some(error) = self.chart.error.filter(|e| !e.is_null()) {
            return Err(UpstreamError::Malformed {
                reason: error.to_string(),
            });
        }
        self.chart
            .result
            .and_then(|results| results.into_iter().next())
            .and_then(|result| result.meta)
            .ok_or_else(|| UpstreamError::Malformed {
                reason: "chart response has no result".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_change_and_percent() -> Result<(), UpstreamError> {
        let meta = ChartMeta {
            symbol: Some("QTZM".to_string()),
            regular_market_price: Some(10.456),
            chart_previous_close: Some(10.0),
            previous_close: Some(9.0),
            regular_market_time: Some(1_760_000_000),
        };
        let quote = Quote::from_chart_meta("QTZM", &meta, Utc::now())?;
        assert_eq!(quote.price, 10.46);
        assert_eq!(quote.previous_close, 10.0);
        assert_eq!(quote.change, 0.46);
        assert_eq!(quote.change_percent, 4.56);
        assert_eq!(quote.timestamp.timestamp(), 1_760_000_000);
        assert!(!quote.stale);
        Ok(())
    }

    #[test]
    fn test_zero_previous_close_guard() -> Result<(), UpstreamError> {
        let meta = ChartMeta {
            regular_market_price: Some(3.0),
            chart_previous_close: Some(0.0),
            ..Default::default()
        };
        let quote = Quote::from_chart_meta("ZERO", &meta, Utc::now())?;
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(quote.symbol, "ZERO");
        Ok(())
    }

    #[test]
    fn test_price_falls_back_to_previous_close() -> Result<(), UpstreamError> {
        let meta = ChartMeta {
            previous_close: Some(4.2),
            ..Default::default()
        };
        let quote = Quote::from_chart_meta("X", &meta, Utc::now())?;
        assert_eq!(quote.price, 4.2);
        assert_eq!(quote.change, 0.0);
        Ok(())
    }

    #[test]
    fn test_missing_price_is_malformed() {
        let result = Quote::from_chart_meta("X", &ChartMeta::default(), Utc::now());
        assert!(matches!(result, Err(UpstreamError::Malformed { .. })));
    }

    #[test]
    fn test_chart_response_parsing() -> Result<(), Box<dyn std::error::Error>> {
        let body = r#"{"chart":{"result":[{"meta":{"symbol":"QTZM","regularMarketPrice":1.5,"chartPreviousClose":1.25,"regularMarketTime":1760000000}}],"error":null}}"#;
        let response: ChartResponse = serde_json::from_str(body)?;
        let meta = response.into_meta()?;
        assert_eq!(meta.regular_market_price, Some(1.5));

        let empty: ChartResponse =
            serde_json::from_str(r#"{"chart":{"result":null,"error":{"code":"Not Found"}}}"#)?;
        assert!(empty.into_meta().is_err());
        Ok(())
    }

    #[test]
    fn test_stale_flag_serialization() -> Result<(), Box<dyn std::error::Error>> {
        let meta = ChartMeta {
            regular_market_price: Some(2.0),
            ..Default::default()
        };
        let quote = Quote::from_chart_meta("X", &meta, Utc::now())?;
        let fresh = serde_json::to_value(&quote)?;
        assert!(fresh.get("stale").is_none());
        let stale = serde_json::to_value(quote.into_stale())?;
        assert_eq!(stale["stale"], true);
        Ok(())
    }
}
