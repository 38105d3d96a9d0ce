//! OpenAPI Specification for the Sales Floor API
//!
//! Generated with utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::{
    agent, break_schedule, breaks, health, leaderboard, message, passup, script, stock,
};
use crate::types::*;

use salesfloor_core::{
    Agent, AgentDetail, BioBreakPool, Break, BreakSchedule, BreakType, Disposition,
    DispositionCounts, GlobalScript, LeaderboardEntry, Message, MessageAuthor, PassUp,
    PassUpStats, Period, Quote, TargetProgress,
};

/// OpenAPI document for the Sales Floor API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sales Floor API",
        description = "Agents, breaks, pass-ups, leaderboard, message board and stock quotes for the sales floor",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3001", description = "Local Development")
    ),
    tags(
        (name = "Agents", description = "Agent identity and custom scripts"),
        (name = "Break Schedules", description = "Per-agent planned break times and alarm"),
        (name = "Breaks", description = "Break ledger and the per-shift bio-break budget"),
        (name = "Pass-Ups", description = "Logged sales contacts and goal progress"),
        (name = "Leaderboard", description = "Agents ranked by productive pass-ups"),
        (name = "Messages", description = "Floor-wide message board"),
        (name = "Stock", description = "Cached stock quote proxy"),
        (name = "Scripts", description = "Versioned global call script"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics")
    ),
    paths(
        // === Agent Routes ===
        agent::create_agent,
        agent::get_agent,
        agent::update_agent,

        // === Break Schedule Routes ===
        break_schedule::get_schedule,
        break_schedule::put_schedule,

        // === Break Routes ===
        breaks::start_break,
        breaks::end_break,
        breaks::todays_breaks,

        // === Pass-Up Routes ===
        passup::create_pass_up,
        passup::list_pass_ups,
        passup::pass_up_stats,
        passup::update_pass_up,
        passup::delete_pass_up,

        // === Leaderboard Routes ===
        leaderboard::get_leaderboard,

        // === Message Routes ===
        message::list_messages,
        message::recent_messages,
        message::post_message,

        // === Stock Routes ===
        stock::get_quote,

        // === Script Routes ===
        script::get_global_script,
        script::put_global_script,

        // === Health Routes ===
        health::liveness,
        health::readiness,

        // === Observability ===
        crate::telemetry::metrics::metrics_handler,
    ),
    components(
        schemas(
            // === Error Types ===
            ApiError, ErrorCode,

            // === Request / Response Types ===
            CreateAgentRequest, UpdateAgentRequest,
            StartBreakRequest, EndBreakRequest, TodaysBreaksResponse,
            UpsertScheduleRequest,
            CreatePassUpRequest, UpdatePassUpRequest, DeleteResponse,
            PostMessageRequest, MessagesResponse, MessageResponse,
            PublishScriptRequest,
            health::HealthResponse, health::ReadinessResponse, health::ComponentHealth,
            health::HealthStatus,

            // === Core Domain Types ===
            Agent, AgentDetail, Break, BreakType, BreakSchedule, BioBreakPool,
            PassUp, Disposition, PassUpStats, DispositionCounts, TargetProgress, Period,
            LeaderboardEntry, Message, MessageAuthor, GlobalScript, Quote
        )
    )
)]
pub struct ApiDoc;
