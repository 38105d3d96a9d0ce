//! Enum types for sales floor entities

use crate::error::ValidationError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::leaderboard::LeaderboardEntry;
use crate::shift::resolve_local;

// ============================================================================
// ENTITY KIND
// ============================================================================

/// Entity type discriminator used in storage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityKind {
    Agent,
    Break,
    BreakSchedule,
    PassUp,
    Message,
    GlobalScript,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// BREAK TYPE
// ============================================================================

/// Kind of break an agent can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakType {
    First,
    Second,
    Lunch,
    /// Personal break drawn from the per-shift minute budget.
    Bio,
}

impl BreakType {
    pub const ALL: [BreakType; 4] = [
        BreakType::First,
        BreakType::Second,
        BreakType::Lunch,
        BreakType::Bio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BreakType::First => "FIRST",
            BreakType::Second => "SECOND",
            BreakType::Lunch => "LUNCH",
            BreakType::Bio => "BIO",
        }
    }
}

impl fmt::Display for BreakType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BreakType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid("type", format!("Invalid break type '{}'", s))
            })
    }
}

// ============================================================================
// DISPOSITION
// ============================================================================

/// Outcome classification of a pass-up, ordered cold to hot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Disposition {
    #[serde(rename = "WSMSNT")]
    Wsmsnt,
    #[serde(rename = "TIHU")]
    Tihu,
    #[serde(rename = "INT")]
    Int,
    #[serde(rename = "WARM")]
    Warm,
    #[serde(rename = "HOT")]
    Hot,
}

impl Disposition {
    pub const ALL: [Disposition; 5] = [
        Disposition::Wsmsnt,
        Disposition::Tihu,
        Disposition::Int,
        Disposition::Warm,
        Disposition::Hot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Wsmsnt => "WSMSNT",
            Disposition::Tihu => "TIHU",
            Disposition::Int => "INT",
            Disposition::Warm => "WARM",
            Disposition::Hot => "HOT",
        }
    }

    /// HOT, WARM and INT count towards productivity.
    pub fn is_productive(&self) -> bool {
        matches!(self, Disposition::Hot | Disposition::Warm | Disposition::Int)
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Disposition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Disposition::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                ValidationError::invalid(
                    "disposition",
                    format!("Invalid disposition '{}'", s),
                )
            })
    }
}

// ============================================================================
// PERIOD
// ============================================================================

/// Reporting period for stats and the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
        }
    }

    /// Parse a query value; anything unrecognized (or absent) is daily.
    pub fn from_query(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    /// Goal for productive (HOT + WARM + INT) pass-ups in this period.
    pub fn productive_goal(&self) -> u32 {
        match self {
            Period::Daily => 8,
            Period::Weekly => 40,
            Period::Monthly => 100,
        }
    }

    /// Goal for total pass-ups in this period.
    pub fn total_goal(&self) -> u32 {
        match self {
            Period::Daily => 10,
            Period::Weekly => 50,
            Period::Monthly => 120,
        }
    }

    /// Local midnight that opens the window containing `now`.
    ///
    /// Daily starts today, weekly starts on the most recent Sunday and
    /// monthly on the first of the month.
    pub fn window_start<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let today = now.date_naive();
        let start: NaiveDate = match self {
            Period::Daily => today,
            Period::Weekly => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                today.checked_sub_days(chrono::Days::new(back)).unwrap_or(today)
            }
            Period::Monthly => today.with_day(1).unwrap_or(today),
        };
        resolve_local(&now.timezone(), start.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Period::Daily),
            "weekly" => Ok(Period::Weekly),
            "monthly" => Ok(Period::Monthly),
            other => Err(ValidationError::invalid(
                "period",
                format!("Unknown period '{}'", other),
            )),
        }
    }
}

// ============================================================================
// TIE BREAK
// ============================================================================

/// Ordering rule applied to leaderboard entries with equal productivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TieBreak {
    /// productive, then total, then hot, warm, int.
    #[default]
    Full,
    /// productive, then total.
    Total,
    /// productive, then hot, warm, int.
    Temperature,
}

impl TieBreak {
    /// Compare two entries, best first (descending on every key).
    pub fn compare(&self, a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
        let primary = b.productive.cmp(&a.productive);
        let temperature = || {
            b.hot
                .cmp(&a.hot)
                .then_with(|| b.warm.cmp(&a.warm))
                .then_with(|| b.int.cmp(&a.int))
        };
        match self {
            TieBreak::Full => primary
                .then_with(|| b.total.cmp(&a.total))
                .then_with(temperature),
            TieBreak::Total => primary.then_with(|| b.total.cmp(&a.total)),
            TieBreak::Temperature => primary.then_with(temperature),
        }
    }
}

impl FromStr for TieBreak {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(TieBreak::Full),
            "total" => Ok(TieBreak::Total),
            "temperature" => Ok(TieBreak::Temperature),
            other => Err(ValidationError::invalid(
                "tie_break",
                format!("Unknown tie-break rule '{}'", other),
            )),
        }
    }
}
