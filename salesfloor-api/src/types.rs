//! Request and response bodies for the REST API.
//!
//! Domain records (`Agent`, `Break`, `PassUp`, ...) are serialized as-is
//! from salesfloor-core; this module only carries the envelopes around them
//! and the request payloads, whose fields are optional so that missing
//! values produce a 400 from the service instead of a body rejection.

use chrono::{NaiveDate, Utc};
use salesfloor_core::{
    BioBreakPool, Break, EntityId, Message, Rebuttals, Timestamp,
};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApiError, ApiResult};

/// Distinguish an explicit `null` (`Some(None)`) from an absent field (`None`).
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a date query parameter: RFC 3339, or `YYYY-MM-DD` taken as UTC midnight.
pub fn parse_date_param(field: &str, value: &str) -> ApiResult<Timestamp> {
    let value = value.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::invalid_format(field, "an ISO-8601 date"))
}

// ============================================================================
// AGENTS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CreateAgentRequest {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    /// Ignored when blank
    pub name: Option<String>,
    /// `null` clears the script
    #[serde(default, deserialize_with = "double_option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub custom_script: Option<Option<String>>,
}

// ============================================================================
// BREAKS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StartBreakRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub agent_id: Option<EntityId>,
    /// FIRST, SECOND, LUNCH or BIO
    #[serde(rename = "type")]
    pub break_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EndBreakRequest {
    pub missed: Option<bool>,
}

/// Breaks in the current shift plus the bio-break budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TodaysBreaksResponse {
    pub breaks: Vec<Break>,
    pub bio_break_pool: BioBreakPool,
}

// ============================================================================
// BREAK SCHEDULES
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpsertScheduleRequest {
    pub first_break: Option<String>,
    pub second_break: Option<String>,
    pub lunch_time: Option<String>,
    pub end_of_shift: Option<String>,
    pub alarm_enabled: Option<bool>,
    pub alarm_volume: Option<i32>,
}

// ============================================================================
// PASS-UPS
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreatePassUpRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub agent_id: Option<EntityId>,
    pub ticker: Option<String>,
    pub ticker_price: Option<String>,
    pub lead_name: Option<String>,
    pub interested_in: Option<String>,
    #[serde(rename = "agreedToSMS")]
    pub agreed_to_sms: Option<bool>,
    pub disposition: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub rebuttals: Option<Rebuttals>,
    pub notes: Option<String>,
    /// Defaults to now
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub date: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdatePassUpRequest {
    pub ticker: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub ticker_price: Option<Option<String>>,
    pub lead_name: Option<String>,
    pub interested_in: Option<String>,
    #[serde(rename = "agreedToSMS")]
    pub agreed_to_sms: Option<bool>,
    pub disposition: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub rebuttals: Option<Rebuttals>,
    #[serde(default, deserialize_with = "double_option")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
    pub notes: Option<Option<String>>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub date: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

// ============================================================================
// MESSAGES
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "uuid"))]
    pub agent_id: Option<EntityId>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageResponse {
    pub message: Message,
}

// ============================================================================
// GLOBAL SCRIPT
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PublishScriptRequest {
    pub content: Option<String>,
}

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

/// `?agentId=` proving ownership on pass-up mutations. Left as text; a
/// value that is not a UUID is a failed ownership check, not a bad request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub agent_id: Option<String>,
}

/// `?startDate=&endDate=&limit=` for listing an agent's pass-ups.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassUpListQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
}

/// `?period=daily|weekly|monthly`; anything else reads as daily.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentMessagesQuery {
    pub since: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteQuery {
    pub symbol: Option<String>,
}
