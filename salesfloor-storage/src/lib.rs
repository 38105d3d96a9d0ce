//! Sales Floor Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the persistence seam the API services talk to. The PostgreSQL
//! implementation lives in salesfloor-api; this crate carries the trait, the
//! update payloads, an in-memory store that enforces the same constraints,
//! and the single-slot caches used by the leaderboard and quote proxy.

pub mod cache;
pub mod floor_store;
pub mod memory;

pub use cache::{CacheRead, SingleSlotCache};
pub use floor_store::FloorStore;
pub use memory::InMemoryFloorStore;

use salesfloor_core::{Disposition, EntityId, Rebuttals, Timestamp};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Update payload for agents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentUpdate {
    /// New (already trimmed) name
    pub name: Option<String>,
    /// `Some(None)` clears the script
    pub custom_script: Option<Option<String>>,
}

impl AgentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.custom_script.is_none()
    }
}

/// Partial update for a pass-up. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassUpPatch {
    pub ticker: Option<String>,
    pub ticker_price: Option<Option<String>>,
    pub lead_name: Option<String>,
    pub interested_in: Option<String>,
    pub agreed_to_sms: Option<bool>,
    pub disposition: Option<Disposition>,
    pub rebuttals: Option<Rebuttals>,
    pub notes: Option<Option<String>>,
    pub date: Option<Timestamp>,
}

/// Filter for listing an agent's pass-ups.
#[derive(Debug, Clone, PartialEq)]
pub struct PassUpFilter {
    pub agent_id: EntityId,
    /// Inclusive lower bound on `date`
    pub start: Option<Timestamp>,
    /// Inclusive upper bound on `date`
    pub end: Option<Timestamp>,
    pub limit: usize,
}

impl PassUpFilter {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn for_agent(agent_id: EntityId) -> Self {
        Self {
            agent_id,
            start: None,
            end: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    /// True when `date` falls inside the inclusive range.
    pub fn admits(&self, date: Timestamp) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}
