//! In-memory `FloorStore` for tests and local runs.

use async_trait::async_trait;
use salesfloor_core::{
    Agent, Break, BreakSchedule, EntityId, EntityKind, FloorError, FloorResult, GlobalScript,
    Message, MessageAuthor, PassUp, StorageError, Timestamp,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{AgentUpdate, FloorStore, PassUpFilter, PassUpPatch};

#[derive(Debug, Clone)]
struct StoredMessage {
    id: EntityId,
    agent_id: EntityId,
    content: String,
    created_at: Timestamp,
}

#[derive(Debug, Default)]
struct Tables {
    agents: HashMap<EntityId, Agent>,
    breaks: HashMap<EntityId, Break>,
    /// Keyed by agent id; at most one schedule per agent.
    schedules: HashMap<EntityId, BreakSchedule>,
    pass_ups: HashMap<EntityId, PassUp>,
    messages: Vec<StoredMessage>,
    scripts: Vec<GlobalScript>,
}

impl Tables {
    fn require_agent(&self, agent_id: EntityId) -> Result<&Agent, StorageError> {
        self.agents
            .get(&agent_id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Agent, agent_id))
    }

    fn join_message(&self, m: &StoredMessage) -> Message {
        let name = self
            .agents
            .get(&m.agent_id)
            .map(|a| a.name.clone())
            .unwrap_or_default();
        Message {
            id: m.id,
            agent_id: m.agent_id,
            content: m.content.clone(),
            created_at: m.created_at,
            agent: MessageAuthor {
                id: m.agent_id,
                name,
            },
        }
    }
}

/// Store backed by a single lock over plain maps.
///
/// All tables share one lock so foreign-key and uniqueness checks see a
/// consistent view.
#[derive(Debug, Default)]
pub struct InMemoryFloorStore {
    tables: RwLock<Tables>,
}

impl InMemoryFloorStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StorageError> {
        self.tables.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StorageError> {
        self.tables.write().map_err(|_| StorageError::LockPoisoned)
    }

    /// Get count of stored agents.
    pub fn agent_count(&self) -> usize {
        self.read().map(|t| t.agents.len()).unwrap_or(0)
    }

    /// Get count of stored pass-ups.
    pub fn pass_up_count(&self) -> usize {
        self.read().map(|t| t.pass_ups.len()).unwrap_or(0)
    }

    /// Clear all stored data.
    pub fn clear(&self) -> Result<(), StorageError> {
        *self.write()? = Tables::default();
        Ok(())
    }
}

#[async_trait]
impl FloorStore for InMemoryFloorStore {
    // === Agent Operations ===

    async fn agent_upsert_by_name(&self, candidate: &Agent) -> FloorResult<Agent> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.agents.values().find(|a| a.name == candidate.name) {
            return Ok(existing.clone());
        }
        tables.agents.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn agent_get(&self, id: EntityId) -> FloorResult<Option<Agent>> {
        Ok(self.read()?.agents.get(&id).cloned())
    }

    async fn agent_update(
        &self,
        id: EntityId,
        update: AgentUpdate,
        now: Timestamp,
    ) -> FloorResult<Agent> {
        let mut tables = self.write()?;
        if let Some(name) = &update.name {
            if tables.agents.values().any(|a| a.id != id && &a.name == name) {
                return Err(StorageError::already_exists(EntityKind::Agent, name).into());
            }
        }
        let agent = tables
            .agents
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Agent, id))?;

        if let Some(name) = update.name {
            agent.name = name;
        }
        if let Some(script) = update.custom_script {
            agent.custom_script = script;
        }
        agent.updated_at = now;
        Ok(agent.clone())
    }

    async fn agent_list(&self) -> FloorResult<Vec<Agent>> {
        let mut agents: Vec<Agent> = self.read()?.agents.values().cloned().collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(agents)
    }

    // === Break Operations ===

    async fn break_insert(&self, b: &Break) -> FloorResult<()> {
        let mut tables = self.write()?;
        tables.require_agent(b.agent_id)?;
        if tables.breaks.contains_key(&b.id) {
            return Err(StorageError::already_exists(EntityKind::Break, b.id).into());
        }
        tables.breaks.insert(b.id, b.clone());
        Ok(())
    }

    async fn break_get(&self, id: EntityId) -> FloorResult<Option<Break>> {
        Ok(self.read()?.breaks.get(&id).cloned())
    }

    async fn break_close(
        &self,
        id: EntityId,
        end_time: Timestamp,
        missed: Option<bool>,
        only_open: bool,
    ) -> FloorResult<Break> {
        let mut tables = self.write()?;
        let b = tables
            .breaks
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::Break, id))?;
        if only_open && b.end_time.is_some() {
            return Err(FloorError::StateConflict(format!("Break {} already ended", id)));
        }
        b.end_time = Some(end_time);
        if missed.is_some() {
            b.missed = missed;
        }
        Ok(b.clone())
    }

    async fn break_list_since(
        &self,
        agent_id: EntityId,
        since: Timestamp,
    ) -> FloorResult<Vec<Break>> {
        let mut breaks: Vec<Break> = self
            .read()?
            .breaks
            .values()
            .filter(|b| b.agent_id == agent_id && b.start_time >= since)
            .cloned()
            .collect();
        breaks.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(breaks)
    }

    async fn break_find_open(&self, agent_id: EntityId) -> FloorResult<Option<Break>> {
        Ok(self
            .read()?
            .breaks
            .values()
            .filter(|b| b.agent_id == agent_id && b.is_open())
            .max_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)))
            .cloned())
    }

    // === Break Schedule Operations ===

    async fn schedule_get(&self, agent_id: EntityId) -> FloorResult<Option<BreakSchedule>> {
        Ok(self.read()?.schedules.get(&agent_id).cloned())
    }

    async fn schedule_insert(&self, s: &BreakSchedule) -> FloorResult<()> {
        let mut tables = self.write()?;
        tables.require_agent(s.agent_id)?;
        if tables.schedules.contains_key(&s.agent_id) {
            return Err(StorageError::already_exists(EntityKind::BreakSchedule, s.agent_id).into());
        }
        tables.schedules.insert(s.agent_id, s.clone());
        Ok(())
    }

    async fn schedule_upsert(&self, s: &BreakSchedule) -> FloorResult<BreakSchedule> {
        let mut tables = self.write()?;
        tables.require_agent(s.agent_id)?;
        let mut stored = s.clone();
        if let Some(existing) = tables.schedules.get(&s.agent_id) {
            stored.id = existing.id;
        }
        tables.schedules.insert(s.agent_id, stored.clone());
        Ok(stored)
    }

    // === Pass-Up Operations ===

    async fn pass_up_insert(&self, p: &PassUp) -> FloorResult<()> {
        let mut tables = self.write()?;
        tables.require_agent(p.agent_id)?;
        if tables.pass_ups.contains_key(&p.id) {
            return Err(StorageError::already_exists(EntityKind::PassUp, p.id).into());
        }
        tables.pass_ups.insert(p.id, p.clone());
        Ok(())
    }

    async fn pass_up_get(&self, id: EntityId) -> FloorResult<Option<PassUp>> {
        Ok(self.read()?.pass_ups.get(&id).cloned())
    }

    async fn pass_up_update(
        &self,
        id: EntityId,
        patch: PassUpPatch,
        now: Timestamp,
    ) -> FloorResult<PassUp> {
        let mut tables = self.write()?;
        let p = tables
            .pass_ups
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found(EntityKind::PassUp, id))?;

        if let Some(ticker) = patch.ticker {
            p.ticker = ticker;
        }
        if let Some(price) = patch.ticker_price {
            p.ticker_price = price;
        }
        if let Some(lead_name) = patch.lead_name {
            p.lead_name = lead_name;
        }
        if let Some(interested_in) = patch.interested_in {
            p.interested_in = interested_in;
        }
        if let Some(agreed) = patch.agreed_to_sms {
            p.agreed_to_sms = agreed;
        }
        if let Some(disposition) = patch.disposition {
            p.disposition = disposition;
        }
        if let Some(rebuttals) = patch.rebuttals {
            p.rebuttals = rebuttals;
        }
        if let Some(notes) = patch.notes {
            p.notes = notes;
        }
        if let Some(date) = patch.date {
            p.date = date;
        }
        p.updated_at = now;
        Ok(p.clone())
    }

    async fn pass_up_delete(&self, id: EntityId) -> FloorResult<()> {
        self.write()?
            .pass_ups
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(EntityKind::PassUp, id).into())
    }

    async fn pass_up_list(&self, filter: &PassUpFilter) -> FloorResult<Vec<PassUp>> {
        let mut rows: Vec<PassUp> = self
            .read()?
            .pass_ups
            .values()
            .filter(|p| p.agent_id == filter.agent_id && filter.admits(p.date))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        rows.truncate(filter.limit);
        Ok(rows)
    }

    async fn pass_up_list_since(
        &self,
        agent_id: Option<EntityId>,
        since: Timestamp,
    ) -> FloorResult<Vec<PassUp>> {
        let mut rows: Vec<PassUp> = self
            .read()?
            .pass_ups
            .values()
            .filter(|p| p.date >= since && agent_id.map_or(true, |a| p.agent_id == a))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    // === Message Operations ===

    async fn message_insert(
        &self,
        id: EntityId,
        agent_id: EntityId,
        content: &str,
        created_at: Timestamp,
    ) -> FloorResult<Message> {
        let mut tables = self.write()?;
        tables.require_agent(agent_id)?;
        let stored = StoredMessage {
            id,
            agent_id,
            content: content.to_string(),
            created_at,
        };
        let message = tables.join_message(&stored);
        tables.messages.push(stored);
        Ok(message)
    }

    async fn message_page(&self, limit: usize, offset: usize) -> FloorResult<Vec<Message>> {
        let tables = self.read()?;
        let mut ordered: Vec<&StoredMessage> = tables.messages.iter().collect();
        ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(ordered
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|m| tables.join_message(m))
            .collect())
    }

    async fn message_list_since(&self, since: Timestamp) -> FloorResult<Vec<Message>> {
        let tables = self.read()?;
        let mut ordered: Vec<&StoredMessage> = tables
            .messages
            .iter()
            .filter(|m| m.created_at >= since)
            .collect();
        ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(ordered.into_iter().map(|m| tables.join_message(m)).collect())
    }

    // === Global Script Operations ===

    async fn global_script_latest(&self) -> FloorResult<Option<GlobalScript>> {
        Ok(self
            .read()?
            .scripts
            .iter()
            .max_by_key(|s| s.version)
            .cloned())
    }

    async fn global_script_publish(
        &self,
        id: EntityId,
        content: &str,
        now: Timestamp,
    ) -> FloorResult<GlobalScript> {
        let mut tables = self.write()?;
        let version = tables.scripts.iter().map(|s| s.version).max().unwrap_or(0) + 1;
        let script = GlobalScript {
            id,
            content: content.to_string(),
            version,
            updated_at: now,
        };
        tables.scripts.push(script.clone());
        Ok(script)
    }

    async fn health_check(&self) -> FloorResult<bool> {
        Ok(self.read().is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use salesfloor_core::{BreakType, Disposition};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn make_agent(name: &str) -> Agent {
        let now = Utc::now();
        Agent {
            id: Uuid::now_v7(),
            name: name.to_string(),
            custom_script: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn make_pass_up(agent_id: EntityId, date: Timestamp) -> PassUp {
        PassUp {
            id: Uuid::now_v7(),
            agent_id,
            ticker: "QTZM".to_string(),
            ticker_price: Some("1.25".to_string()),
            lead_name: "Lead".to_string(),
            interested_in: "Growth".to_string(),
            agreed_to_sms: false,
            disposition: Disposition::Warm,
            rebuttals: BTreeMap::new(),
            notes: None,
            date,
            created_at: date,
            updated_at: date,
        }
    }

    // ========================================================================
    // Agent Tests
    // ========================================================================

    #[tokio::test]
    async fn test_agent_upsert_returns_existing() {
        let store = InMemoryFloorStore::new();
        let first = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let second = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.agent_count(), 1);
    }

    #[tokio::test]
    async fn test_agent_rename_conflict() {
        let store = InMemoryFloorStore::new();
        let a = store.agent_upsert_by_name(&make_agent("Alex")).await.unwrap();
        store.agent_upsert_by_name(&make_agent("Jordan")).await.unwrap();

        let result = store
            .agent_update(
                a.id,
                AgentUpdate {
                    name: Some("Jordan".to_string()),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(result, Err(ref e) if e.is_already_exists()));

        let renamed = store
            .agent_update(
                a.id,
                AgentUpdate {
                    name: Some("Alex".to_string()),
                    custom_script: Some(Some("Open strong".to_string())),
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(renamed.custom_script.as_deref(), Some("Open strong"));
    }

    #[tokio::test]
    async fn test_agent_update_unknown() {
        let store = InMemoryFloorStore::new();
        let result = store
            .agent_update(Uuid::now_v7(), AgentUpdate::default(), Utc::now())
            .await;
        assert!(matches!(result, Err(ref e) if e.is_not_found()));
    }

    // ========================================================================
    // Break Tests
    // ========================================================================

    #[tokio::test]
    async fn test_break_requires_agent() {
        let store = InMemoryFloorStore::new();
        let b = Break {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            break_type: BreakType::Bio,
            start_time: Utc::now(),
            end_time: None,
            missed: None,
        };
        let result = store.break_insert(&b).await;
        assert!(matches!(
            result,
            Err(FloorError::Storage(StorageError::NotFound {
                entity: EntityKind::Agent,
                ..
            }))
        ));
    }

    #[tokio::test]
    async fn test_break_list_since_orders_newest_first() {
        let store = InMemoryFloorStore::new();
        let agent = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let now = Utc::now();
        for minutes in [90, 30, 60, 600] {
            let b = Break {
                id: Uuid::now_v7(),
                agent_id: agent.id,
                break_type: BreakType::First,
                start_time: now - TimeDelta::minutes(minutes),
                end_time: None,
                missed: None,
            };
            store.break_insert(&b).await.unwrap();
        }

        let rows = store
            .break_list_since(agent.id, now - TimeDelta::hours(2))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows.windows(2).all(|w| w[0].start_time >= w[1].start_time));

        let open = store.break_find_open(agent.id).await.unwrap().unwrap();
        assert_eq!(open.start_time, now - TimeDelta::minutes(30));

        let closed = store.break_close(open.id, now, Some(true), true).await.unwrap();
        assert_eq!(closed.end_time, Some(now));
        assert_eq!(closed.missed, Some(true));

        let again = store.break_close(open.id, now, None, true).await;
        assert!(matches!(again, Err(FloorError::StateConflict(_))));
        let unchanged = store.break_get(open.id).await.unwrap().unwrap();
        assert_eq!(unchanged.missed, Some(true));

        let later = now + TimeDelta::minutes(1);
        let reclosed = store.break_close(open.id, later, None, false).await.unwrap();
        assert_eq!(reclosed.end_time, Some(later));
        assert_eq!(reclosed.missed, Some(true));
    }

    // ========================================================================
    // Schedule Tests
    // ========================================================================

    #[tokio::test]
    async fn test_schedule_unique_per_agent() {
        let store = InMemoryFloorStore::new();
        let agent = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let s = BreakSchedule::with_defaults(Uuid::now_v7(), agent.id, Utc::now());
        store.schedule_insert(&s).await.unwrap();

        let dup = BreakSchedule::with_defaults(Uuid::now_v7(), agent.id, Utc::now());
        let result = store.schedule_insert(&dup).await;
        assert!(matches!(result, Err(ref e) if e.is_already_exists()));

        let mut replacement = dup.clone();
        replacement.first_break = "09:45".to_string();
        let stored = store.schedule_upsert(&replacement).await.unwrap();
        assert_eq!(stored.id, s.id);
        assert_eq!(stored.first_break, "09:45");
    }

    // ========================================================================
    // Pass-Up Tests
    // ========================================================================

    #[tokio::test]
    async fn test_pass_up_list_filters_and_limits() {
        let store = InMemoryFloorStore::new();
        let agent = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let other = store.agent_upsert_by_name(&make_agent("Alex")).await.unwrap();
        let now = Utc::now();
        for days in 0..5 {
            store
                .pass_up_insert(&make_pass_up(agent.id, now - TimeDelta::days(days)))
                .await
                .unwrap();
        }
        store.pass_up_insert(&make_pass_up(other.id, now)).await.unwrap();

        let mut filter = PassUpFilter::for_agent(agent.id);
        filter.start = Some(now - TimeDelta::days(3));
        filter.end = Some(now - TimeDelta::days(1));
        let rows = store.pass_up_list(&filter).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, now - TimeDelta::days(1));

        filter.limit = 2;
        assert_eq!(store.pass_up_list(&filter).await.unwrap().len(), 2);

        let floor = store
            .pass_up_list_since(None, now - TimeDelta::hours(1))
            .await
            .unwrap();
        assert_eq!(floor.len(), 2);
    }

    #[tokio::test]
    async fn test_pass_up_patch_touches_only_present_fields() {
        let store = InMemoryFloorStore::new();
        let agent = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let p = make_pass_up(agent.id, Utc::now());
        store.pass_up_insert(&p).await.unwrap();

        let updated = store
            .pass_up_update(
                p.id,
                PassUpPatch {
                    disposition: Some(Disposition::Hot),
                    ticker_price: Some(None),
                    ..Default::default()
                },
                Utc::now(),
            )
            .await
            .unwrap();
        assert_eq!(updated.disposition, Disposition::Hot);
        assert_eq!(updated.ticker_price, None);
        assert_eq!(updated.lead_name, p.lead_name);

        store.pass_up_delete(p.id).await.unwrap();
        assert!(store.pass_up_delete(p.id).await.is_err());
    }

    // ========================================================================
    // Message and Script Tests
    // ========================================================================

    #[tokio::test]
    async fn test_message_pages_and_tail() {
        let store = InMemoryFloorStore::new();
        let agent = store.agent_upsert_by_name(&make_agent("Neon")).await.unwrap();
        let base = Utc::now() - TimeDelta::minutes(10);
        for i in 0..5 {
            store
                .message_insert(
                    Uuid::now_v7(),
                    agent.id,
                    &format!("m{}", i),
                    base + TimeDelta::minutes(i),
                )
                .await
                .unwrap();
        }

        let page = store.message_page(2, 1).await.unwrap();
        let contents: Vec<_> = page.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m2"]);
        assert_eq!(page[0].agent.name, "Neon");

        let tail = store
            .message_list_since(base + TimeDelta::minutes(3))
            .await
            .unwrap();
        let contents: Vec<_> = tail.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m3", "m4"]);
    }

    #[tokio::test]
    async fn test_global_script_versions() {
        let store = InMemoryFloorStore::new();
        assert!(store.global_script_latest().await.unwrap().is_none());
        store
            .global_script_publish(Uuid::now_v7(), "v1", Utc::now())
            .await
            .unwrap();
        let second = store
            .global_script_publish(Uuid::now_v7(), "v2", Utc::now())
            .await
            .unwrap();
        assert_eq!(second.version, 2);
        let latest = store.global_script_latest().await.unwrap().unwrap();
        assert_eq!(latest.content, "v2");
    }
}
