//! Service Layer
//!
//! Business logic for every floor operation. Services validate input
//! before touching the store, take "now" from the caller, and return
//! `ApiResult` so route handlers stay thin.

pub mod agent_service;
pub mod break_service;
pub mod leaderboard_service;
pub mod message_service;
pub mod pass_up_service;
pub mod quote_service;
pub mod schedule_service;
pub mod script_service;

pub use break_service::BreakPolicy;
pub use leaderboard_service::LeaderboardService;
pub use quote_service::QuoteService;
