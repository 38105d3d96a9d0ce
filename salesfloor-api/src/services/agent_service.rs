//! Agent Service
//!
//! Agents are created on first reference by name and never deleted.

use salesfloor_core::{
    new_entity_id, normalize_agent_name, Agent, AgentDetail, EntityId, Timestamp,
};
use salesfloor_storage::{AgentUpdate, FloorStore, PassUpFilter};

use crate::error::{ApiError, ApiResult};
use crate::types::{CreateAgentRequest, UpdateAgentRequest};

/// Number of pass-ups embedded in the agent detail view.
pub const AGENT_RECENT_PASS_UPS: usize = 10;

/// Create an agent, or return the existing one with the same (trimmed) name.
pub async fn create_or_get_agent(
    store: &dyn FloorStore,
    req: CreateAgentRequest,
    now: Timestamp,
) -> ApiResult<Agent> {
    let name = normalize_agent_name(req.name.as_deref().unwrap_or_default())
        .map_err(|_| ApiError::missing_field("name"))?;

    let candidate = Agent {
        id: new_entity_id(),
        name,
        custom_script: None,
        created_at: now,
        updated_at: now,
    };
    let agent = store.agent_upsert_by_name(&candidate).await?;
    if agent.id == candidate.id {
        tracing::info!(agent_id = %agent.id, name = %agent.name, "Agent created");
    }
    Ok(agent)
}

/// Agent with its most recent pass-ups, newest first.
pub async fn get_agent_detail(store: &dyn FloorStore, id: EntityId) -> ApiResult<AgentDetail> {
    let agent = store
        .agent_get(id)
        .await?
        .ok_or_else(|| ApiError::agent_not_found(id))?;

    let filter = PassUpFilter {
        limit: AGENT_RECENT_PASS_UPS,
        ..PassUpFilter::for_agent(id)
    };
    let pass_ups = store.pass_up_list(&filter).await?;
    Ok(AgentDetail { agent, pass_ups })
}

/// Rename an agent and/or replace its custom script.
///
/// A blank name is ignored rather than rejected; `customScript: null`
/// clears the script.
pub async fn update_agent(
    store: &dyn FloorStore,
    id: EntityId,
    req: UpdateAgentRequest,
    now: Timestamp,
) -> ApiResult<Agent> {
    let update = AgentUpdate {
        name: req
            .name
            .as_deref()
            .and_then(|n| normalize_agent_name(n).ok()),
        custom_script: req.custom_script,
    };
    Ok(store.agent_update(id, update, now).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;
    use salesfloor_storage::InMemoryFloorStore;

    fn named(name: &str) -> CreateAgentRequest {
        CreateAgentRequest {
            name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_is_idempotent_by_trimmed_name() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let now = Utc::now();
        let first = create_or_get_agent(&store, named("Neon"), now).await?;
        let second = create_or_get_agent(&store, named("  Neon "), now).await?;
        assert_eq!(first.id, second.id);
        assert_eq!(store.agent_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let store = InMemoryFloorStore::new();
        let err = create_or_get_agent(&store, named("   "), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        let err = create_or_get_agent(&store, CreateAgentRequest::default(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[tokio::test]
    async fn test_update_ignores_blank_name_and_clears_script() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent = create_or_get_agent(&store, named("Neon"), Utc::now()).await?;

        let updated = update_agent(
            &store,
            agent.id,
            UpdateAgentRequest {
                name: Some("  ".to_string()),
                custom_script: Some(Some("Open strong".to_string())),
            },
            Utc::now(),
        )
        .await?;
        assert_eq!(updated.name, "Neon");
        assert_eq!(updated.custom_script.as_deref(), Some("Open strong"));

        let cleared = update_agent(
            &store,
            agent.id,
            UpdateAgentRequest {
                name: None,
                custom_script: Some(None),
            },
            Utc::now(),
        )
        .await?;
        assert_eq!(cleared.custom_script, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_detail_of_unknown_agent_is_404() {
        let store = InMemoryFloorStore::new();
        let err = get_agent_detail(&store, new_entity_id()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AgentNotFound);
    }
}
