//! Productivity leaderboard ranking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::entities::{Agent, PassUp};
use crate::enums::TieBreak;
use crate::stats::DispositionCounts;
use crate::EntityId;

/// One ranked row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub agent_id: EntityId,
    pub agent_name: String,
    pub hot: u32,
    pub warm: u32,
    pub int: u32,
    pub total: u32,
    pub productive: u32,
    /// 1-based position after sorting.
    pub rank: u32,
}

/// Rank agents by the pass-ups they logged in a window.
///
/// `pass_ups` must already be restricted to the period window. Agents with
/// no pass-ups are dropped. Entries that tie on every key of `tie_break`
/// are ordered by agent name, then id, so the result is deterministic.
pub fn rank_agents(agents: &[Agent], pass_ups: &[PassUp], tie_break: TieBreak) -> Vec<LeaderboardEntry> {
    let mut counts: HashMap<EntityId, DispositionCounts> = HashMap::new();
    for p in pass_ups {
        counts.entry(p.agent_id).or_default().record(p.disposition);
    }

    let mut entries: Vec<LeaderboardEntry> = agents
        .iter()
        .filter_map(|agent| {
            let c = counts.get(&agent.id)?;
            if c.total == 0 {
                return None;
            }
            Some(LeaderboardEntry {
                agent_id: agent.id,
                agent_name: agent.name.clone(),
                hot: c.hot,
                warm: c.warm,
                int: c.int,
                total: c.total,
                productive: c.productive(),
                rank: 0,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        tie_break
            .compare(a, b)
            .then_with(|| a.agent_name.cmp(&b.agent_name))
            .then_with(|| a.agent_id.cmp(&b.agent_id))
    });

    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    entries
}
