//! Break Service
//!
//! Start/end events per agent and the bio-break budget for the current
//! shift.

use salesfloor_core::{
    new_entity_id, BioBreakPool, Break, BreakType, EntityId, FloorTimeZone, ShiftClock, Timestamp,
};
use salesfloor_storage::FloorStore;

use crate::error::{ApiError, ApiResult};
use crate::types::{EndBreakRequest, StartBreakRequest, TodaysBreaksResponse};

/// How break events are validated and bucketed into shifts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreakPolicy {
    pub clock: ShiftClock,
    pub time_zone: FloorTimeZone,
    /// Reject a second open break and ending an already closed one.
    pub strict: bool,
}

impl BreakPolicy {
    /// Start of the shift containing `now`.
    pub fn shift_start(&self, now: Timestamp) -> Timestamp {
        self.time_zone.shift_start(&self.clock, now)
    }
}

/// Open a break for an agent.
pub async fn start_break(
    store: &dyn FloorStore,
    policy: &BreakPolicy,
    req: StartBreakRequest,
    now: Timestamp,
) -> ApiResult<Break> {
    let (agent_id, raw_type) = match (req.agent_id, req.break_type.as_deref()) {
        (Some(agent_id), Some(raw_type)) => (agent_id, raw_type),
        _ => return Err(ApiError::validation_failed("Missing agentId or type")),
    };
    let break_type: BreakType = raw_type
        .parse()
        .map_err(|_| ApiError::invalid_input("Invalid break type"))?;

    if policy.strict {
        if let Some(open) = store.break_find_open(agent_id).await? {
            return Err(ApiError::state_conflict(format!(
                "Agent already has an open {} break ({})",
                open.break_type, open.id
            )));
        }
    }

    let record = Break {
        id: new_entity_id(),
        agent_id,
        break_type,
        start_time: now,
        end_time: None,
        missed: None,
    };
    store.break_insert(&record).await?;
    tracing::info!(agent_id = %agent_id, break_id = %record.id, break_type = %break_type, "Break started");
    Ok(record)
}

/// Close a break. The stored end never precedes the start.
pub async fn end_break(
    store: &dyn FloorStore,
    policy: &BreakPolicy,
    id: EntityId,
    req: EndBreakRequest,
    now: Timestamp,
) -> ApiResult<Break> {
    let existing = store
        .break_get(id)
        .await?
        .ok_or_else(|| ApiError::break_not_found(id))?;

    if !existing.is_open() {
        if policy.strict {
            return Err(ApiError::state_conflict(format!("Break {} already ended", id)));
        }
        tracing::warn!(break_id = %id, "Ending a break that was already closed");
    }

    let end_time = now.max(existing.start_time);
    let closed = store
        .break_close(id, end_time, req.missed, policy.strict)
        .await?;
    tracing::info!(agent_id = %closed.agent_id, break_id = %id, "Break ended");
    Ok(closed)
}

/// Breaks started in the current shift, newest first, with the bio pool.
pub async fn todays_breaks(
    store: &dyn FloorStore,
    policy: &BreakPolicy,
    agent_id: EntityId,
    now: Timestamp,
) -> ApiResult<TodaysBreaksResponse> {
    let since = policy.shift_start(now);
    let breaks = store.break_list_since(agent_id, since).await?;
    let bio_break_pool = BioBreakPool::from_breaks(&breaks, now);
    Ok(TodaysBreaksResponse {
        breaks,
        bio_break_pool,
    })
}
