//! API Configuration Module
//!
//! CORS policy, timeouts, the floor policy knobs (shift rollover, leaderboard
//! tie-break, strict breaks) and cache TTLs. Configuration is loaded from
//! environment variables with sensible defaults for development.

use salesfloor_core::{FloorTimeZone, ShiftClock, TieBreak};
use std::time::Duration;

/// Port used when neither `PORT` nor `SALESFLOOR_API_PORT` holds a usable value.
pub const DEFAULT_PORT: u16 = 3001;

pub const DEFAULT_QUOTE_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

// ============================================================================
// ENVIRONMENT
// ============================================================================

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Other,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" | "" => Environment::Development,
            "production" | "prod" => Environment::Production,
            _ => Environment::Other,
        }
    }
}

/// Which store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    Memory,
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS, timeouts and production hardening.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub environment: Environment,

    // ========================================================================
    // CORS Configuration
    // ========================================================================
    /// Allowed CORS origins; `FRONTEND_URL` plus `SALESFLOOR_CORS_ORIGINS`.
    /// Only enforced in production.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Whole-request bound.
    pub request_timeout: Duration,

    pub store: StoreBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            cors_origins: vec!["http://localhost:5173".to_string()],
            cors_max_age_secs: 86400, // 24 hours
            request_timeout: Duration::from_secs(15),
            store: StoreBackend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `SALESFLOOR_ENVIRONMENT`: development (default), production, or anything else
    /// - `FRONTEND_URL`: frontend origin added to the allow-list
    /// - `SALESFLOOR_CORS_ORIGINS`: comma-separated origins (default: http://localhost:5173)
    /// - `SALESFLOOR_REQUEST_TIMEOUT_SECS`: whole-request bound (default: 15)
    /// - `SALESFLOOR_STORE`: "postgres" (default) or "memory"
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let environment = lookup("SALESFLOOR_ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or_default();

        let mut cors_origins: Vec<String> = lookup("SALESFLOOR_CORS_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        if let Some(frontend) = lookup("FRONTEND_URL") {
            let frontend = frontend.trim().trim_end_matches('/').to_string();
            if !frontend.is_empty() && !cors_origins.contains(&frontend) {
                cors_origins.push(frontend);
            }
        }

        let request_timeout = lookup("SALESFLOOR_REQUEST_TIMEOUT_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let store = match lookup("SALESFLOOR_STORE").as_deref().map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("memory") => StoreBackend::Memory,
            _ => StoreBackend::Postgres,
        };

        Self {
            environment,
            cors_origins,
            cors_max_age_secs: defaults.cors_max_age_secs,
            request_timeout,
            store,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Backend failure details are only returned to clients in development.
    pub fn exposes_error_details(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if !self.is_production() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            // Exact match or wildcard subdomain match
            if allowed == origin {
                return true;
            }
            // Support wildcard subdomains: *.salesfloor.app
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern))
                        || origin_domain == pattern;
                }
            }
            false
        })
    }
}

// ============================================================================
// FLOOR POLICY CONFIGURATION
// ============================================================================

/// Policy and cache settings consumed by the services.
#[derive(Debug, Clone)]
pub struct FloorConfig {
    pub shift_clock: ShiftClock,
    pub time_zone: FloorTimeZone,
    pub tie_break: TieBreak,
    pub leaderboard_ttl: Duration,
    pub quote_ttl: Duration,
    pub quote_base_url: String,
    pub quote_timeout: Duration,
    /// Reject double-ends and concurrent open breaks.
    pub strict_breaks: bool,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            shift_clock: ShiftClock::default(),
            time_zone: FloorTimeZone::Local,
            tie_break: TieBreak::Full,
            leaderboard_ttl: Duration::from_secs(30),
            quote_ttl: Duration::from_secs(15),
            quote_base_url: DEFAULT_QUOTE_BASE_URL.to_string(),
            quote_timeout: Duration::from_secs(8),
            strict_breaks: true,
        }
    }
}

impl FloorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from a key lookup. Unparseable values keep their defaults and
    /// are logged.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let shift_clock = parse_or_warn(
            &lookup,
            "SALESFLOOR_SHIFT_ROLLOVER",
            ShiftClock::parse,
            defaults.shift_clock,
        );
        let time_zone = parse_or_warn(
            &lookup,
            "SALESFLOOR_TIMEZONE",
            FloorTimeZone::parse,
            defaults.time_zone,
        );
        let tie_break = parse_or_warn(
            &lookup,
            "SALESFLOOR_LEADERBOARD_TIEBREAK",
            |s| s.parse::<TieBreak>(),
            defaults.tie_break,
        );

        let secs = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|s| s.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        let strict_breaks = lookup("SALESFLOOR_STRICT_BREAKS")
            .map(|s| s.trim().to_lowercase() != "false")
            .unwrap_or(defaults.strict_breaks);

        Self {
            shift_clock,
            time_zone,
            tie_break,
            leaderboard_ttl: secs("SALESFLOOR_LEADERBOARD_TTL_SECS", defaults.leaderboard_ttl),
            quote_ttl: secs("SALESFLOOR_QUOTE_TTL_SECS", defaults.quote_ttl),
            quote_base_url: lookup("SALESFLOOR_QUOTE_BASE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.quote_base_url),
            quote_timeout: secs("SALESFLOOR_QUOTE_TIMEOUT_SECS", defaults.quote_timeout),
            strict_breaks,
        }
    }
}

fn parse_or_warn<T, E: std::fmt::Display>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Result<T, E>,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => match parse(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid setting");
                default
            }
        },
        None => default,
    }
}

// ============================================================================
// BIND ADDRESS
// ============================================================================

/// Resolve the HTTP port from `PORT`, then `SALESFLOOR_API_PORT`.
///
/// Hosting platforms sometimes inject a URL into `PORT`; anything that is
/// not a port number falls back to [`DEFAULT_PORT`].
pub fn resolve_port(lookup: impl Fn(&str) -> Option<String>) -> u16 {
    let raw = lookup("PORT").or_else(|| lookup("SALESFLOOR_API_PORT"));
    match raw {
        Some(value) => match value.trim().parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                tracing::warn!(value = %value, default = DEFAULT_PORT, "Invalid port, using default");
                DEFAULT_PORT
            }
        },
        None => DEFAULT_PORT,
    }
}

/// Resolve the bind host from `SALESFLOOR_API_BIND`.
pub fn resolve_bind_host(lookup: impl Fn(&str) -> Option<String>) -> String {
    lookup("SALESFLOOR_API_BIND")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "0.0.0.0".to_string())
}
