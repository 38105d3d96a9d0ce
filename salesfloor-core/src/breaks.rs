//! Bio-break budget.
//!
//! Every agent gets a fixed pool of bio-break minutes per shift. Closed
//! breaks count their full duration; an open break counts the time elapsed
//! so far.

use serde::{Deserialize, Serialize};

use crate::entities::Break;
use crate::enums::BreakType;
use crate::Timestamp;

/// Bio-break minutes available per shift.
pub const BIO_BREAK_BUDGET_MINUTES: i64 = 15;

/// Used and remaining bio-break minutes for the current shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BioBreakPool {
    pub total: i64,
    pub used: i64,
    pub remaining: i64,
}

impl BioBreakPool {
    /// Tally BIO breaks from `breaks` as of `now`.
    ///
    /// Callers pass the breaks of a single shift window; non-BIO breaks are
    /// ignored. Minutes are summed unrounded and rounded once at the end.
    pub fn from_breaks<'a, I>(breaks: I, now: Timestamp) -> Self
    where
        I: IntoIterator<Item = &'a Break>,
    {
        let millis: i64 = breaks
            .into_iter()
            .filter(|b| b.break_type == BreakType::Bio)
            .map(|b| {
                let end = b.end_time.unwrap_or(now);
                (end - b.start_time).num_milliseconds().max(0)
            })
            .sum();

        let used = (millis as f64 / 60_000.0).round() as i64;
        Self {
            total: BIO_BREAK_BUDGET_MINUTES,
            used,
            remaining: (BIO_BREAK_BUDGET_MINUTES - used).max(0),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}
