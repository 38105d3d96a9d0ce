//! Async storage trait for the sales floor entities.
//!
//! Services own validation and clocks; implementations only persist what
//! they are handed and enforce the relational constraints (unique agent
//! names, one schedule per agent, foreign keys to agents).

use async_trait::async_trait;
use salesfloor_core::{
    Agent, Break, BreakSchedule, EntityId, FloorResult, GlobalScript, Message, PassUp, Timestamp,
};

use crate::{AgentUpdate, PassUpFilter, PassUpPatch};

/// Async storage trait for floor operations.
#[async_trait]
pub trait FloorStore: Send + Sync {
    // ========================================================================
    // AGENT OPERATIONS
    // ========================================================================

    /// Insert `candidate` unless an agent with the same name exists, in which
    /// case the existing agent is returned untouched.
    async fn agent_upsert_by_name(&self, candidate: &Agent) -> FloorResult<Agent>;

    /// Get an agent by ID.
    async fn agent_get(&self, id: EntityId) -> FloorResult<Option<Agent>>;

    /// Apply an update. Fails with NotFound for an unknown id and with
    /// AlreadyExists when renaming onto another agent's name.
    async fn agent_update(
        &self,
        id: EntityId,
        update: AgentUpdate,
        now: Timestamp,
    ) -> FloorResult<Agent>;

    /// All agents, ordered by name.
    async fn agent_list(&self) -> FloorResult<Vec<Agent>>;

    // ========================================================================
    // BREAK OPERATIONS
    // ========================================================================

    /// Insert a new break. Fails with NotFound if the agent is unknown.
    async fn break_insert(&self, b: &Break) -> FloorResult<()>;

    async fn break_get(&self, id: EntityId) -> FloorResult<Option<Break>>;

    /// Set the end timestamp (and missed flag when given) on a break.
    ///
    /// With `only_open` the write applies only while the break has no end
    /// time; a break that is already closed yields `StateConflict`.
    async fn break_close(
        &self,
        id: EntityId,
        end_time: Timestamp,
        missed: Option<bool>,
        only_open: bool,
    ) -> FloorResult<Break>;

    /// Breaks of an agent started at or after `since`, newest first.
    async fn break_list_since(
        &self,
        agent_id: EntityId,
        since: Timestamp,
    ) -> FloorResult<Vec<Break>>;

    /// The most recently started open break of an agent, if any.
    async fn break_find_open(&self, agent_id: EntityId) -> FloorResult<Option<Break>>;

    // ========================================================================
    // BREAK SCHEDULE OPERATIONS
    // ========================================================================

    async fn schedule_get(&self, agent_id: EntityId) -> FloorResult<Option<BreakSchedule>>;

    /// Insert a schedule. Fails with AlreadyExists when the agent has one.
    async fn schedule_insert(&self, s: &BreakSchedule) -> FloorResult<()>;

    /// Insert or replace the schedule keyed by `s.agent_id`. An existing
    /// schedule keeps its id.
    async fn schedule_upsert(&self, s: &BreakSchedule) -> FloorResult<BreakSchedule>;

    // ========================================================================
    // PASS-UP OPERATIONS
    // ========================================================================

    /// Insert a pass-up. Fails with NotFound if the agent is unknown.
    async fn pass_up_insert(&self, p: &PassUp) -> FloorResult<()>;

    async fn pass_up_get(&self, id: EntityId) -> FloorResult<Option<PassUp>>;

    /// Apply the fields present in `patch`.
    async fn pass_up_update(
        &self,
        id: EntityId,
        patch: PassUpPatch,
        now: Timestamp,
    ) -> FloorResult<PassUp>;

    async fn pass_up_delete(&self, id: EntityId) -> FloorResult<()>;

    /// Pass-ups matching the filter, newest `date` first, capped at the limit.
    async fn pass_up_list(&self, filter: &PassUpFilter) -> FloorResult<Vec<PassUp>>;

    /// Pass-ups with `date >= since`, for one agent or the whole floor.
    async fn pass_up_list_since(
        &self,
        agent_id: Option<EntityId>,
        since: Timestamp,
    ) -> FloorResult<Vec<PassUp>>;

    // ========================================================================
    // MESSAGE OPERATIONS
    // ========================================================================

    /// Append a message and return it joined with its author.
    async fn message_insert(
        &self,
        id: EntityId,
        agent_id: EntityId,
        content: &str,
        created_at: Timestamp,
    ) -> FloorResult<Message>;

    /// Newest-first page of messages, skipping `offset` newest.
    async fn message_page(&self, limit: usize, offset: usize) -> FloorResult<Vec<Message>>;

    /// Messages created at or after `since`, oldest first.
    async fn message_list_since(&self, since: Timestamp) -> FloorResult<Vec<Message>>;

    // ========================================================================
    // GLOBAL SCRIPT OPERATIONS
    // ========================================================================

    async fn global_script_latest(&self) -> FloorResult<Option<GlobalScript>>;

    /// Store `content` as the next version.
    async fn global_script_publish(
        &self,
        id: EntityId,
        content: &str,
        now: Timestamp,
    ) -> FloorResult<GlobalScript>;

    // ========================================================================
    // HEALTH
    // ========================================================================

    async fn health_check(&self) -> FloorResult<bool>;
}
