//! Break Schedule Service
//!
//! One schedule per agent, created lazily with the house defaults.

use salesfloor_core::{new_entity_id, BreakSchedule, EntityId, Timestamp};
use salesfloor_storage::FloorStore;

use crate::error::{ApiError, ApiResult};
use crate::types::UpsertScheduleRequest;

async fn require_agent(store: &dyn FloorStore, agent_id: EntityId) -> ApiResult<()> {
    match store.agent_get(agent_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::agent_not_found(agent_id)),
    }
}

/// The agent's schedule, created with defaults on first read.
///
/// Two concurrent first reads race on the unique agent constraint; the
/// loser re-reads the winner's row.
pub async fn get_or_create_schedule(
    store: &dyn FloorStore,
    agent_id: EntityId,
    now: Timestamp,
) -> ApiResult<BreakSchedule> {
    if let Some(existing) = store.schedule_get(agent_id).await? {
        return Ok(existing);
    }
    require_agent(store, agent_id).await?;

    let schedule = BreakSchedule::with_defaults(new_entity_id(), agent_id, now);
    match store.schedule_insert(&schedule).await {
        Ok(()) => {
            tracing::debug!(agent_id = %agent_id, "Created default break schedule");
            Ok(schedule)
        }
        Err(e) if e.is_already_exists() => store
            .schedule_get(agent_id)
            .await?
            .ok_or_else(|| ApiError::internal_error("Break schedule vanished after conflict")),
        Err(e) => Err(e.into()),
    }
}

/// Write the schedule.
///
/// Absent clock times keep their stored value (or the default when the
/// schedule is new). Absent alarm settings reset to their defaults on
/// every write.
pub async fn upsert_schedule(
    store: &dyn FloorStore,
    agent_id: EntityId,
    req: UpsertScheduleRequest,
    now: Timestamp,
) -> ApiResult<BreakSchedule> {
    let base = match store.schedule_get(agent_id).await? {
        Some(existing) => existing,
        None => {
            require_agent(store, agent_id).await?;
            BreakSchedule::with_defaults(new_entity_id(), agent_id, now)
        }
    };

    let schedule = BreakSchedule {
        first_break: req.first_break.unwrap_or(base.first_break),
        second_break: req.second_break.unwrap_or(base.second_break),
        lunch_time: req.lunch_time.unwrap_or(base.lunch_time),
        end_of_shift: req.end_of_shift.unwrap_or(base.end_of_shift),
        alarm_enabled: req
            .alarm_enabled
            .unwrap_or(BreakSchedule::DEFAULT_ALARM_ENABLED),
        alarm_volume: req
            .alarm_volume
            .unwrap_or(BreakSchedule::DEFAULT_ALARM_VOLUME),
        updated_at: now,
        ..base
    };
    Ok(store.schedule_upsert(&schedule).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use salesfloor_core::Agent;
    use salesfloor_storage::InMemoryFloorStore;

    async fn seed_agent(store: &InMemoryFloorStore) -> EntityId {
        let now = Utc::now();
        let agent = Agent {
            id: new_entity_id(),
            name: "Argon".to_string(),
            custom_script: None,
            created_at: now,
            updated_at: now,
        };
        store.agent_upsert_by_name(&agent).await.unwrap().id
    }

    #[tokio::test]
    async fn test_first_read_creates_defaults_once() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store).await;

        let first = get_or_create_schedule(&store, agent_id, Utc::now()).await?;
        let second = get_or_create_schedule(&store, agent_id, Utc::now()).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(first.first_break, "10:00");
        assert_eq!(first.alarm_volume, 70);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_agent_is_404() {
        let store = InMemoryFloorStore::new();
        let err = get_or_create_schedule(&store, new_entity_id(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::AgentNotFound);

        let err = upsert_schedule(
            &store,
            new_entity_id(),
            UpsertScheduleRequest::default(),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::AgentNotFound);
    }

    #[tokio::test]
    async fn test_upsert_keeps_times_but_resets_alarm() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store).await;

        let created = upsert_schedule(
            &store,
            agent_id,
            UpsertScheduleRequest {
                lunch_time: Some("13:15".to_string()),
                alarm_enabled: Some(false),
                alarm_volume: Some(20),
                ..Default::default()
            },
            Utc::now(),
        )
        .await?;
        assert_eq!(created.lunch_time, "13:15");
        assert_eq!(created.first_break, "10:00");
        assert!(!created.alarm_enabled);

        let updated = upsert_schedule(
            &store,
            agent_id,
            UpsertScheduleRequest {
                first_break: Some("09:45".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await?;
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.first_break, "09:45");
        assert_eq!(updated.lunch_time, "13:15");
        assert!(updated.alarm_enabled);
        assert_eq!(updated.alarm_volume, 70);
        Ok(())
    }
}
