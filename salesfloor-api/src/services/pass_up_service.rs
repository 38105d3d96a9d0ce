//! Pass-Up Service
//!
//! Create, patch, delete and list pass-ups, plus per-period stats with goal
//! attainment. Patches and deletes are only allowed for the agent that owns
//! the record.

use salesfloor_core::{
    new_entity_id, Disposition, EntityId, FloorTimeZone, PassUp, PassUpStats, Period, Timestamp,
    ValidationError,
};
use salesfloor_storage::{FloorStore, PassUpFilter, PassUpPatch};
use std::fmt;

use crate::error::{ApiError, ApiResult};
use crate::types::{CreatePassUpRequest, DeleteResponse, UpdatePassUpRequest};

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ValidationError::missing(field))
}

fn parse_disposition(raw: &str) -> ApiResult<Disposition> {
    raw.parse::<Disposition>()
        .map_err(|_| ApiError::invalid_input("Invalid disposition"))
}

/// The `?agentId=` a caller presents when editing or deleting a pass-up.
///
/// Kept unparsed: a value that is not a UUID can never match an owner, so
/// it is answered with Forbidden like any other wrong agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerClaim {
    Agent(EntityId),
    Unrecognized(String),
}

impl OwnerClaim {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<EntityId>() {
            Ok(id) => OwnerClaim::Agent(id),
            Err(_) => OwnerClaim::Unrecognized(raw.to_string()),
        }
    }

    fn owns(&self, record: &PassUp) -> bool {
        matches!(self, OwnerClaim::Agent(id) if *id == record.agent_id)
    }
}

impl From<EntityId> for OwnerClaim {
    fn from(id: EntityId) -> Self {
        OwnerClaim::Agent(id)
    }
}

impl fmt::Display for OwnerClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerClaim::Agent(id) => write!(f, "{}", id),
            OwnerClaim::Unrecognized(raw) => write!(f, "{:?}", raw),
        }
    }
}

/// Fail with Forbidden unless `claimed` owns `record`.
pub fn check_ownership(record: &PassUp, claimed: &OwnerClaim) -> ApiResult<()> {
    if claimed.owns(record) {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Unauthorized: Pass-up does not belong to this agent",
        ))
    }
}

/// Record a pass-up. The ticker is stored upper-cased.
pub async fn create_pass_up(
    store: &dyn FloorStore,
    req: CreatePassUpRequest,
    now: Timestamp,
) -> ApiResult<PassUp> {
    let agent_id = req
        .agent_id
        .ok_or_else(|| ValidationError::missing("agentId"))?;
    let ticker = required(req.ticker, "ticker")?;
    let lead_name = required(req.lead_name, "leadName")?;
    let interested_in = required(req.interested_in, "interestedIn")?;
    let disposition = required(req.disposition, "disposition")?;
    let disposition = parse_disposition(&disposition)?;

    let pass_up = PassUp {
        id: new_entity_id(),
        agent_id,
        ticker: ticker.trim().to_uppercase(),
        ticker_price: req.ticker_price,
        lead_name,
        interested_in,
        agreed_to_sms: req.agreed_to_sms.unwrap_or(false),
        disposition,
        rebuttals: req.rebuttals.unwrap_or_default(),
        notes: req.notes,
        date: req.date.unwrap_or(now),
        created_at: now,
        updated_at: now,
    };
    store.pass_up_insert(&pass_up).await?;
    tracing::info!(
        agent_id = %agent_id,
        pass_up_id = %pass_up.id,
        disposition = %disposition,
        "Pass-up recorded"
    );
    Ok(pass_up)
}

async fn load_owned(
    store: &dyn FloorStore,
    id: EntityId,
    agent_id: &OwnerClaim,
) -> ApiResult<PassUp> {
    let record = store
        .pass_up_get(id)
        .await?
        .ok_or_else(|| ApiError::pass_up_not_found(id))?;
    check_ownership(&record, agent_id)?;
    Ok(record)
}

/// Apply the fields present in `req` to a pass-up owned by `agent_id`.
pub async fn update_pass_up(
    store: &dyn FloorStore,
    id: EntityId,
    agent_id: impl Into<OwnerClaim>,
    req: UpdatePassUpRequest,
    now: Timestamp,
) -> ApiResult<PassUp> {
    let agent_id = agent_id.into();
    let disposition = req
        .disposition
        .as_deref()
        .map(parse_disposition)
        .transpose()?;

    load_owned(store, id, &agent_id).await?;

    let patch = PassUpPatch {
        ticker: req.ticker.map(|t| t.trim().to_uppercase()),
        ticker_price: req.ticker_price,
        lead_name: req.lead_name,
        interested_in: req.interested_in,
        agreed_to_sms: req.agreed_to_sms,
        disposition,
        rebuttals: req.rebuttals,
        notes: req.notes,
        date: req.date,
    };
    let updated = store.pass_up_update(id, patch, now).await?;
    tracing::info!(agent_id = %agent_id, pass_up_id = %id, "Pass-up updated");
    Ok(updated)
}

/// Permanently remove a pass-up owned by `agent_id`.
pub async fn delete_pass_up(
    store: &dyn FloorStore,
    id: EntityId,
    agent_id: impl Into<OwnerClaim>,
) -> ApiResult<DeleteResponse> {
    let agent_id = agent_id.into();
    load_owned(store, id, &agent_id).await?;
    store.pass_up_delete(id).await?;
    tracing::info!(agent_id = %agent_id, pass_up_id = %id, "Pass-up deleted");
    Ok(DeleteResponse {
        success: true,
        message: "Pass-up deleted successfully".to_string(),
    })
}

pub async fn list_pass_ups(store: &dyn FloorStore, filter: &PassUpFilter) -> ApiResult<Vec<PassUp>> {
    Ok(store.pass_up_list(filter).await?)
}

/// Disposition counts and goal progress for the window of `period`.
pub async fn pass_up_stats(
    store: &dyn FloorStore,
    time_zone: &FloorTimeZone,
    agent_id: EntityId,
    period: Period,
    now: Timestamp,
) -> ApiResult<PassUpStats> {
    let since = time_zone.period_start(period, now);
    let pass_ups = store.pass_up_list_since(Some(agent_id), since).await?;
    Ok(PassUpStats::for_period(&pass_ups, period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::{FixedOffset, TimeZone, Utc};
    use proptest::prelude::*;
    use salesfloor_core::Agent;
    use salesfloor_storage::InMemoryFloorStore;
    use std::collections::BTreeMap;

    async fn seed_agent(store: &InMemoryFloorStore, name: &str) -> EntityId {
        let now = Utc::now();
        let agent = Agent {
            id: new_entity_id(),
            name: name.to_string(),
            custom_script: None,
            created_at: now,
            updated_at: now,
        };
        store.agent_upsert_by_name(&agent).await.unwrap().id
    }

    fn request(agent_id: EntityId, disposition: &str) -> CreatePassUpRequest {
        CreatePassUpRequest {
            agent_id: Some(agent_id),
            ticker: Some("qtzm".to_string()),
            lead_name: Some("Ada".to_string()),
            interested_in: Some("covered calls".to_string()),
            disposition: Some(disposition.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store, "Neon").await;
        let now = Utc::now();

        let p = create_pass_up(&store, request(agent_id, "HOT"), now).await?;
        assert_eq!(p.ticker, "QTZM");
        assert!(!p.agreed_to_sms);
        assert_eq!(p.rebuttals, BTreeMap::new());
        assert_eq!(p.notes, None);
        assert_eq!(p.date, now);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_missing_and_invalid() {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store, "Neon").await;

        let mut req = request(agent_id, "HOT");
        req.lead_name = None;
        let err = create_pass_up(&store, req, Utc::now()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        let err = create_pass_up(&store, request(agent_id, "LUKEWARM"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(store.pass_up_count(), 0);
    }

    #[tokio::test]
    async fn test_ownership_enforced_on_update_and_delete() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let owner = seed_agent(&store, "Neon").await;
        let other = seed_agent(&store, "Xenon").await;
        let p = create_pass_up(&store, request(owner, "WARM"), Utc::now()).await?;

        let err = update_pass_up(&store, p.id, other, UpdatePassUpRequest::default(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);

        let err = delete_pass_up(&store, p.id, other).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(store.pass_up_count(), 1);

        let deleted = delete_pass_up(&store, p.id, owner).await?;
        assert!(deleted.success);
        let err = delete_pass_up(&store, p.id, owner).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PassUpNotFound);
        Ok(())
    }

    #[tokio::test]
    async fn test_non_uuid_owner_is_forbidden() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let owner = seed_agent(&store, "Neon").await;
        let p = create_pass_up(&store, request(owner, "HOT"), Utc::now()).await?;

        let claim = OwnerClaim::parse("someone-else");
        assert_eq!(claim, OwnerClaim::Unrecognized("someone-else".to_string()));

        let err = delete_pass_up(&store, p.id, claim).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert_eq!(store.pass_up_count(), 1);

        let by_string = OwnerClaim::parse(&format!(" {} ", owner));
        assert_eq!(by_string, OwnerClaim::Agent(owner));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_changes_only_present_fields() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let owner = seed_agent(&store, "Neon").await;
        let p = create_pass_up(&store, request(owner, "INT"), Utc::now()).await?;

        let updated = update_pass_up(
            &store,
            p.id,
            owner,
            UpdatePassUpRequest {
                disposition: Some("HOT".to_string()),
                notes: Some(Some("call back friday".to_string())),
                ..Default::default()
            },
            Utc::now(),
        )
        .await?;
        assert_eq!(updated.disposition, Disposition::Hot);
        assert_eq!(updated.notes.as_deref(), Some("call back friday"));
        assert_eq!(updated.lead_name, p.lead_name);
        assert_eq!(updated.ticker, "QTZM");

        let err = update_pass_up(
            &store,
            p.id,
            owner,
            UpdatePassUpRequest {
                disposition: Some("hot".to_string()),
                ..Default::default()
            },
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        Ok(())
    }

    #[tokio::test]
    async fn test_daily_stats_for_single_hot() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store, "Neon").await;
        let zone = FloorTimeZone::Fixed(FixedOffset::east_opt(0).unwrap());
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();

        create_pass_up(&store, request(agent_id, "HOT"), now).await?;
        let stats = pass_up_stats(&store, &zone, agent_id, Period::Daily, now).await?;

        assert_eq!(stats.counts.hot, 1);
        assert_eq!(stats.counts.total, 1);
        assert_eq!(stats.target_progress.productive_goal, 8);
        assert_eq!(stats.target_progress.total_goal, 10);
        assert_eq!(stats.target_progress.productive_percent, 13);
        assert_eq!(stats.target_progress.total_percent, 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_stats_exclude_pass_ups_before_window() -> ApiResult<()> {
        let store = InMemoryFloorStore::new();
        let agent_id = seed_agent(&store, "Neon").await;
        let zone = FloorTimeZone::Fixed(FixedOffset::east_opt(0).unwrap());
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 15, 0, 0).unwrap();

        let mut old = request(agent_id, "WARM");
        old.date = Some(Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap());
        create_pass_up(&store, old, now).await?;
        create_pass_up(&store, request(agent_id, "TIHU"), now).await?;

        let weekly = pass_up_stats(&store, &zone, agent_id, Period::Weekly, now).await?;
        assert_eq!(weekly.counts.total, 1);
        let monthly = pass_up_stats(&store, &zone, agent_id, Period::Monthly, now).await?;
        assert_eq!(monthly.counts.total, 2);
        assert_eq!(monthly.counts.warm, 1);
        Ok(())
    }

    fn pass_up_owned_by(agent_id: EntityId) -> PassUp {
        let now = Utc::now();
        PassUp {
            id: new_entity_id(),
            agent_id,
            ticker: "QTZM".to_string(),
            ticker_price: None,
            lead_name: "Ada".to_string(),
            interested_in: "calls".to_string(),
            agreed_to_sms: false,
            disposition: Disposition::Int,
            rebuttals: BTreeMap::new(),
            notes: None,
            date: now,
            created_at: now,
            updated_at: now,
        }
    }

    proptest! {
        #[test]
        fn prop_ownership_requires_exact_agent(owner in any::<u128>(), claimed in any::<u128>()) {
            let owner = uuid::Uuid::from_u128(owner);
            let claimed = uuid::Uuid::from_u128(claimed);
            let record = pass_up_owned_by(owner);
            let result = check_ownership(&record, &OwnerClaim::from(claimed));
            if owner == claimed {
                prop_assert!(result.is_ok());
            } else {
                prop_assert_eq!(result.map_err(|e| e.code), Err(ErrorCode::Forbidden));
            }
        }
    }
}
