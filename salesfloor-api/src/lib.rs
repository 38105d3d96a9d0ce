//! Sales Floor API - REST Layer
//!
//! Axum routes over the floor services: agents, the break ledger and
//! schedules, pass-ups and their stats, the cached leaderboard, the message
//! board, the global script and the cached stock quote proxy. Persistence
//! goes through [`salesfloor_storage::FloorStore`], backed by PostgreSQL
//! ([`DbClient`]) or the in-memory store.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
mod macros;
pub mod openapi;
pub mod providers;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{resolve_bind_host, resolve_port, ApiConfig, Environment, FloorConfig, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{set_expose_details, ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use providers::YahooChartSource;
pub use routes::create_api_router;
pub use state::{AppState, SharedStore};
pub use types::*;
