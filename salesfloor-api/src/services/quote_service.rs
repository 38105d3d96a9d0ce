//! Quote Cache Proxy
//!
//! One cached `(symbol, quote)` slot in front of the market data upstream.
//! A fresh slot for the requested symbol is served as is. On upstream
//! failure a cached copy of the same symbol is served with `stale: true`.

use salesfloor_core::{normalize_ticker, FloorError, Quote, QuoteSource, Timestamp};
use salesfloor_storage::SingleSlotCache;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ApiResult;
use crate::telemetry::record_cache_lookup;

pub const DEFAULT_SYMBOL: &str = "QTZM";

pub struct QuoteService {
    source: Arc<dyn QuoteSource>,
    cache: SingleSlotCache<String, Quote>,
}

impl QuoteService {
    pub fn new(source: Arc<dyn QuoteSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: SingleSlotCache::new(ttl),
        }
    }

    /// Quote for `symbol` (default QTZM).
    pub async fn get_quote(&self, symbol: Option<&str>, now: Timestamp) -> ApiResult<Quote> {
        let symbol = match symbol.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => normalize_ticker(raw)?,
            None => DEFAULT_SYMBOL.to_string(),
        };

        if let Some(hit) = self.cache.get_fresh(&symbol, now) {
            record_cache_lookup("quote", "hit");
            return Ok(hit.into_value());
        }

        match self.source.fetch(&symbol, now).await {
            Ok(quote) => {
                record_cache_lookup("quote", "miss");
                self.cache.put(symbol, quote.clone(), now);
                Ok(quote)
            }
            Err(e) => match self.cache.get_any(&symbol, now) {
                Some(cached) => {
                    record_cache_lookup("quote", "stale");
                    tracing::warn!(
                        symbol = %symbol,
                        error = %e,
                        age_secs = cached.age(now).num_seconds(),
                        "Quote upstream failed, serving stale copy"
                    );
                    Ok(cached.into_value().into_stale())
                }
                None => Err(FloorError::Upstream(e).into()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::{TimeDelta, TimeZone, Utc};
    use salesfloor_core::UpstreamError;
    use salesfloor_test_utils::{fixtures, ScriptedQuoteSource};

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap()
    }

    fn service(source: Arc<ScriptedQuoteSource>) -> QuoteService {
        QuoteService::new(source, Duration::from_secs(15))
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_upstream() -> ApiResult<()> {
        let source = Arc::new(
            ScriptedQuoteSource::new()
                .then_ok(fixtures::quote("QTZM", 5.25, 5.0, t0()))
                .then_ok(fixtures::quote("QTZM", 6.0, 5.0, t0())),
        );
        let svc = service(source.clone());

        let first = svc.get_quote(None, t0()).await?;
        let second = svc
            .get_quote(Some("qtzm"), t0() + TimeDelta::seconds(14))
            .await?;
        assert_eq!(first, second);
        assert_eq!(source.calls(), 1);

        let third = svc
            .get_quote(Some("QTZM"), t0() + TimeDelta::seconds(15))
            .await?;
        assert_eq!(third.price, 6.0);
        assert_eq!(source.calls(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_serves_stale_same_symbol() -> ApiResult<()> {
        let source = Arc::new(
            ScriptedQuoteSource::new()
                .then_ok(fixtures::quote("QTZM", 5.25, 5.0, t0()))
                .then_err(UpstreamError::BadStatus { status: 502 }),
        );
        let svc = service(source);

        svc.get_quote(None, t0()).await?;
        let stale = svc.get_quote(None, t0() + TimeDelta::minutes(5)).await?;
        assert!(stale.stale);
        assert_eq!(stale.price, 5.25);
        Ok(())
    }

    #[tokio::test]
    async fn test_failure_for_other_symbol_is_upstream_error() -> ApiResult<()> {
        let source = Arc::new(
            ScriptedQuoteSource::new()
                .then_ok(fixtures::quote("QTZM", 5.25, 5.0, t0()))
                .then_err(UpstreamError::Unavailable {
                    reason: "timeout".to_string(),
                }),
        );
        let svc = service(source);

        svc.get_quote(None, t0()).await?;
        let err = svc.get_quote(Some("AAPL"), t0()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_symbol_rejected_before_fetch() {
        let source = Arc::new(ScriptedQuoteSource::new());
        let svc = service(source.clone());
        let err = svc.get_quote(Some("../x"), t0()).await.unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(source.calls(), 0);
    }
}
