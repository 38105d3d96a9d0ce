//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Duration;

use salesfloor_core::{FloorTimeZone, QuoteSource};
use salesfloor_storage::FloorStore;

use crate::config::FloorConfig;
use crate::services::{BreakPolicy, LeaderboardService, QuoteService};

/// The store behind every route.
pub type SharedStore = Arc<dyn FloorStore>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub break_policy: BreakPolicy,
    pub time_zone: FloorTimeZone,
    pub leaderboard: Arc<LeaderboardService>,
    pub quotes: Arc<QuoteService>,
    pub start_time: std::time::Instant,
    /// Bound on a readiness probe's store ping.
    pub readiness_timeout: Duration,
}

impl AppState {
    /// Wire services from the floor configuration.
    pub fn new(store: SharedStore, quote_source: Arc<dyn QuoteSource>, floor: &FloorConfig) -> Self {
        Self {
            store,
            break_policy: BreakPolicy {
                clock: floor.shift_clock,
                time_zone: floor.time_zone,
                strict: floor.strict_breaks,
            },
            time_zone: floor.time_zone,
            leaderboard: Arc::new(LeaderboardService::new(
                floor.leaderboard_ttl,
                floor.tie_break,
                floor.time_zone,
            )),
            quotes: Arc::new(QuoteService::new(quote_source, floor.quote_ttl)),
            start_time: std::time::Instant::now(),
            readiness_timeout: Duration::from_secs(5),
        }
    }
}

crate::macros::project_state! {
    store => SharedStore,
    break_policy => BreakPolicy,
    time_zone => FloorTimeZone,
    leaderboard => Arc<LeaderboardService>,
    quotes => Arc<QuoteService>,
    start_time => std::time::Instant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::FromRef;
    use salesfloor_storage::InMemoryFloorStore;
    use salesfloor_test_utils::ScriptedQuoteSource;

    #[test]
    fn test_fields_project_out_of_shared_state() {
        let mut floor = FloorConfig::from_lookup(|_| None);
        floor.strict_breaks = true;
        let store: SharedStore = Arc::new(InMemoryFloorStore::new());
        let state = AppState::new(store.clone(), Arc::new(ScriptedQuoteSource::new()), &floor);

        assert!(Arc::ptr_eq(&SharedStore::from_ref(&state), &store));
        assert!(BreakPolicy::from_ref(&state).strict);
        assert_eq!(FloorTimeZone::from_ref(&state), floor.time_zone);
        assert!(Arc::ptr_eq(&Arc::<QuoteService>::from_ref(&state), &state.quotes));
    }
}
