//! Quote Providers
//!
//! Implementations of [`QuoteSource`] backed by real market data APIs.

mod yahoo;

pub use salesfloor_core::QuoteSource;
pub use yahoo::YahooChartSource;
