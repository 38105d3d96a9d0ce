//! Sales Floor Core - Domain Types and Floor Policy
//!
//! Pure data structures and the policy calculations that sit on top of them:
//! the shift clock, the bio-break budget, pass-up goal tracking, leaderboard
//! ranking and quote arithmetic. Nothing in this crate performs I/O; callers
//! pass in "now" and the rows they read from storage.

pub mod breaks;
pub mod entities;
pub mod enums;
pub mod error;
pub mod leaderboard;
pub mod quote;
pub mod shift;
pub mod stats;
pub mod validation;

use chrono::{DateTime, Utc};
use uuid::Uuid;

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Entity identifier using UUIDv7 for timestamp-sortable IDs.
pub type EntityId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Generate a new UUIDv7 EntityId (timestamp-sortable).
pub fn new_entity_id() -> EntityId {
    Uuid::now_v7()
}

pub use breaks::{BioBreakPool, BIO_BREAK_BUDGET_MINUTES};
pub use entities::{
    Agent, AgentDetail, Break, BreakSchedule, GlobalScript, Message, MessageAuthor, PassUp,
    RebuttalValue, Rebuttals,
};
pub use enums::{BreakType, Disposition, EntityKind, Period, TieBreak};
pub use error::{FloorError, FloorResult, StorageError, UpstreamError, ValidationError};
pub use leaderboard::{rank_agents, LeaderboardEntry};
pub use quote::{round_cents, ChartMeta, ChartResponse, Quote, QuoteSource};
pub use shift::{resolve_local, FloorTimeZone, ShiftClock};
pub use stats::{DispositionCounts, PassUpStats, TargetProgress};
pub use validation::{
    normalize_agent_name, normalize_ticker, validate_message_content, MESSAGE_MAX_CHARS,
};
