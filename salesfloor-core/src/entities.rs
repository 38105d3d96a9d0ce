//! Entity types persisted by the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::enums::{BreakType, Disposition};
use crate::{EntityId, Timestamp};

// ============================================================================
// AGENT
// ============================================================================

/// A sales floor agent. Names are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
    pub custom_script: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

/// An agent together with its most recent pass-ups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: Agent,
    pub pass_ups: Vec<PassUp>,
}

// ============================================================================
// BREAK
// ============================================================================

/// A break taken by an agent. Open while `end_time` is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Break {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub agent_id: EntityId,
    #[serde(rename = "type")]
    pub break_type: BreakType,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub start_time: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub end_time: Option<Timestamp>,
    pub missed: Option<bool>,
}

impl Break {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }
}

// ============================================================================
// BREAK SCHEDULE
// ============================================================================

/// Per-agent break plan and alarm settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct BreakSchedule {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub agent_id: EntityId,
    pub first_break: String,
    pub second_break: String,
    pub lunch_time: String,
    pub end_of_shift: String,
    pub alarm_enabled: bool,
    pub alarm_volume: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl BreakSchedule {
    pub const DEFAULT_FIRST_BREAK: &'static str = "10:00";
    pub const DEFAULT_SECOND_BREAK: &'static str = "14:00";
    pub const DEFAULT_LUNCH_TIME: &'static str = "12:30";
    pub const DEFAULT_END_OF_SHIFT: &'static str = "17:00";
    pub const DEFAULT_ALARM_ENABLED: bool = true;
    pub const DEFAULT_ALARM_VOLUME: i32 = 70;

    /// A schedule carrying the house defaults.
    pub fn with_defaults(id: EntityId, agent_id: EntityId, now: Timestamp) -> Self {
        Self {
            id,
            agent_id,
            first_break: Self::DEFAULT_FIRST_BREAK.to_string(),
            second_break: Self::DEFAULT_SECOND_BREAK.to_string(),
            lunch_time: Self::DEFAULT_LUNCH_TIME.to_string(),
            end_of_shift: Self::DEFAULT_END_OF_SHIFT.to_string(),
            alarm_enabled: Self::DEFAULT_ALARM_ENABLED,
            alarm_volume: Self::DEFAULT_ALARM_VOLUME,
            updated_at: now,
        }
    }
}

// ============================================================================
// PASS-UP
// ============================================================================

/// Scalar annotation value on a pass-up rebuttal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RebuttalValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Null,
}

/// Free-form rebuttal annotations keyed by name.
pub type Rebuttals = BTreeMap<String, RebuttalValue>;

/// A logged sales-contact outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PassUp {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub agent_id: EntityId,
    pub ticker: String,
    pub ticker_price: Option<String>,
    pub lead_name: String,
    pub interested_in: String,
    #[serde(rename = "agreedToSMS")]
    pub agreed_to_sms: bool,
    pub disposition: Disposition,
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub rebuttals: Rebuttals,
    pub notes: Option<String>,
    /// Bucketing date for stats and the leaderboard.
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub date: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

// ============================================================================
// MESSAGE
// ============================================================================

/// Author summary embedded in every message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MessageAuthor {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub name: String,
}

/// A floor chat message. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub agent_id: EntityId,
    pub content: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    pub agent: MessageAuthor,
}

// ============================================================================
// GLOBAL SCRIPT
// ============================================================================

/// Floor-wide versioned call script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GlobalScript {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "uuid"))]
    pub id: EntityId,
    pub content: String,
    pub version: i32,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_break_serializes_type_field() -> Result<(), serde_json::Error> {
        let b = Break {
            id: Uuid::now_v7(),
            agent_id: Uuid::now_v7(),
            break_type: BreakType::Bio,
            start_time: Utc::now(),
            end_time: None,
            missed: None,
        };
        let json = serde_json::to_value(&b)?;
        assert_eq!(json["type"], "BIO");
        assert!(json["endTime"].is_null());
        assert!(json.get("agentId").is_some());
        Ok(())
    }

    #[test]
    fn test_rebuttals_accept_scalars() -> Result<(), serde_json::Error> {
        let rebuttals: Rebuttals = serde_json::from_str(
            r#"{"price": true, "attempts": 3, "score": 0.5, "note": "callback", "skip": null}"#,
        )?;
        assert_eq!(rebuttals.get("price"), Some(&RebuttalValue::Bool(true)));
        assert_eq!(rebuttals.get("attempts"), Some(&RebuttalValue::Integer(3)));
        assert_eq!(rebuttals.get("score"), Some(&RebuttalValue::Float(0.5)));
        assert_eq!(
            rebuttals.get("note"),
            Some(&RebuttalValue::Text("callback".to_string()))
        );
        assert_eq!(rebuttals.get("skip"), Some(&RebuttalValue::Null));
        Ok(())
    }

    #[test]
    fn test_rebuttals_reject_nested_values() {
        let parsed: Result<Rebuttals, _> = serde_json::from_str(r#"{"nested": {"a": 1}}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_schedule_defaults() {
        let s = BreakSchedule::with_defaults(Uuid::now_v7(), Uuid::now_v7(), Utc::now());
        assert_eq!(s.first_break, "10:00");
        assert_eq!(s.second_break, "14:00");
        assert_eq!(s.lunch_time, "12:30");
        assert_eq!(s.end_of_shift, "17:00");
        assert!(s.alarm_enabled);
        assert_eq!(s.alarm_volume, 70);
    }
}
