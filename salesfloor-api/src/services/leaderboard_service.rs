//! Leaderboard Service
//!
//! Ranks agents by productive pass-ups over a period window. The last
//! result is held in a single-slot cache keyed by period; asking for a
//! different period evicts it.

use salesfloor_core::{rank_agents, FloorTimeZone, LeaderboardEntry, Period, TieBreak, Timestamp};
use salesfloor_storage::{FloorStore, SingleSlotCache};
use std::time::Duration;

use crate::error::ApiResult;
use crate::telemetry::record_cache_lookup;

pub struct LeaderboardService {
    cache: SingleSlotCache<Period, Vec<LeaderboardEntry>>,
    tie_break: TieBreak,
    time_zone: FloorTimeZone,
}

impl LeaderboardService {
    pub fn new(ttl: Duration, tie_break: TieBreak, time_zone: FloorTimeZone) -> Self {
        Self {
            cache: SingleSlotCache::new(ttl),
            tie_break,
            time_zone,
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Ranked standings for `period`, served from cache while fresh.
    pub async fn rank(
        &self,
        store: &dyn FloorStore,
        period: Period,
        now: Timestamp,
    ) -> ApiResult<Vec<LeaderboardEntry>> {
        if let Some(hit) = self.cache.get_fresh(&period, now) {
            record_cache_lookup("leaderboard", "hit");
            return Ok(hit.into_value());
        }
        record_cache_lookup("leaderboard", "miss");

        let since = self.time_zone.period_start(period, now);
        let agents = store.agent_list().await?;
        let pass_ups = store.pass_up_list_since(None, since).await?;
        let entries = rank_agents(&agents, &pass_ups, self.tie_break);

        tracing::debug!(period = %period, agents = entries.len(), "Leaderboard recomputed");
        self.cache.put(period, entries.clone(), now);
        Ok(entries)
    }
}
