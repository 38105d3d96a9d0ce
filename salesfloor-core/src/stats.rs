//! Pass-up tallies and goal attainment.

use serde::{Deserialize, Serialize};

use crate::entities::PassUp;
use crate::enums::{Disposition, Period};

/// Per-disposition counts over a set of pass-ups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DispositionCounts {
    pub hot: u32,
    pub warm: u32,
    pub int: u32,
    pub tihu: u32,
    pub wsmsnt: u32,
    pub total: u32,
}

impl DispositionCounts {
    pub fn record(&mut self, disposition: Disposition) {
        match disposition {
            Disposition::Hot => self.hot += 1,
            Disposition::Warm => self.warm += 1,
            Disposition::Int => self.int += 1,
            Disposition::Tihu => self.tihu += 1,
            Disposition::Wsmsnt => self.wsmsnt += 1,
        }
        self.total += 1;
    }

    pub fn tally<'a, I>(pass_ups: I) -> Self
    where
        I: IntoIterator<Item = &'a PassUp>,
    {
        let mut counts = Self::default();
        for p in pass_ups {
            counts.record(p.disposition);
        }
        counts
    }

    /// HOT + WARM + INT.
    pub fn productive(&self) -> u32 {
        self.hot + self.warm + self.int
    }
}

/// Progress towards the period's goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TargetProgress {
    pub productive: u32,
    pub productive_goal: u32,
    pub total_goal: u32,
    /// Not clamped; exceeds 100 once the goal is beaten.
    pub productive_percent: u32,
    pub total_percent: u32,
}

/// Stats for one agent over one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PassUpStats {
    #[serde(flatten)]
    pub counts: DispositionCounts,
    pub target_progress: TargetProgress,
}

impl PassUpStats {
    /// Build stats from the pass-ups already filtered to the period window.
    pub fn for_period<'a, I>(pass_ups: I, period: Period) -> Self
    where
        I: IntoIterator<Item = &'a PassUp>,
    {
        let counts = DispositionCounts::tally(pass_ups);
        let productive = counts.productive();
        let productive_goal = period.productive_goal();
        let total_goal = period.total_goal();

        Self {
            counts,
            target_progress: TargetProgress {
                productive,
                productive_goal,
                total_goal,
                productive_percent: percent_of(productive, productive_goal),
                total_percent: percent_of(counts.total, total_goal),
            },
        }
    }
}

fn percent_of(value: u32, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    (f64::from(value) / f64::from(goal) * 100.0).round() as u32
}
