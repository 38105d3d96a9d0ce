//! Shift clock.
//!
//! The operational shift begins at a fixed wall-clock time every day. The
//! house default is 21:30; some floors roll over at midnight instead.

use chrono::{
    DateTime, FixedOffset, Local, LocalResult, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::enums::Period;
use crate::error::ValidationError;
use crate::Timestamp;

/// Determines the start of the shift containing a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftClock {
    rollover: NaiveTime,
}

impl Default for ShiftClock {
    fn default() -> Self {
        Self {
            rollover: NaiveTime::from_hms_opt(21, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl ShiftClock {
    pub fn new(rollover: NaiveTime) -> Self {
        Self { rollover }
    }

    /// Midnight rollover.
    pub fn midnight() -> Self {
        Self::new(NaiveTime::MIN)
    }

    /// Parse an `HH:MM` rollover time.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map(Self::new)
            .map_err(|e| {
                ValidationError::invalid("shift_rollover", format!("expected HH:MM: {}", e))
            })
    }

    pub fn rollover(&self) -> NaiveTime {
        self.rollover
    }

    /// Start of the shift containing `now`.
    ///
    /// Today's rollover instant if `now` is at or after it, yesterday's
    /// otherwise.
    pub fn shift_start_for<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();
        let todays_rollover = resolve_local(&tz, today.and_time(self.rollover));
        if *now < todays_rollover {
            let yesterday = today.pred_opt().unwrap_or(today);
            resolve_local(&tz, yesterday.and_time(self.rollover))
        } else {
            todays_rollover
        }
    }
}

/// Zone in which wall-clock boundaries (shift rollover, period midnights)
/// are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloorTimeZone {
    /// The server's local zone.
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl FloorTimeZone {
    /// Parse `local` or a `+HH:MM` / `-HH:MM` offset.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        value
            .parse::<FixedOffset>()
            .map(Self::Fixed)
            .map_err(|e| ValidationError::invalid("time_zone", format!("expected +HH:MM: {}", e)))
    }

    /// Shift start for `now`, evaluated in this zone.
    pub fn shift_start(&self, clock: &ShiftClock, now: Timestamp) -> Timestamp {
        match self {
            Self::Local => clock.shift_start_for(&now.with_timezone(&Local)).with_timezone(&Utc),
            Self::Fixed(offset) => clock
                .shift_start_for(&now.with_timezone(offset))
                .with_timezone(&Utc),
        }
    }

    /// Opening instant of the `period` window containing `now`.
    pub fn period_start(&self, period: Period, now: Timestamp) -> Timestamp {
        match self {
            Self::Local => period.window_start(&now.with_timezone(&Local)).with_timezone(&Utc),
            Self::Fixed(offset) => period
                .window_start(&now.with_timezone(offset))
                .with_timezone(&Utc),
        }
    }
}

/// Map a wall-clock time onto `tz`.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are pushed forward past the gap.
pub fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(naive + TimeDelta::hours(1)))
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&naive)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_before_rollover_uses_yesterday() {
        let clock = ShiftClock::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        assert_eq!(
            clock.shift_start_for(&now),
            Utc.with_ymd_and_hms(2026, 10, 18, 21, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_after_rollover_uses_today() {
        let clock = ShiftClock::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 23, 5, 0).unwrap();
        assert_eq!(
            clock.shift_start_for(&now),
            Utc.with_ymd_and_hms(2026, 10, 19, 21, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_exactly_at_rollover_starts_new_shift() {
        let clock = ShiftClock::default();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 21, 30, 0).unwrap();
        assert_eq!(clock.shift_start_for(&now), now);
    }

    #[test]
    fn test_midnight_rollover() {
        let clock = ShiftClock::midnight();
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(
            clock.shift_start_for(&now),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_rollover_is_wall_clock_in_local_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let clock = ShiftClock::default();
        // 20:00 UTC is 22:00 local, past the 21:30 local rollover.
        let now = Utc
            .with_ymd_and_hms(2026, 6, 1, 20, 0, 0)
            .unwrap()
            .with_timezone(&tz);
        assert_eq!(
            clock.shift_start_for(&now),
            tz.with_ymd_and_hms(2026, 6, 1, 21, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_floor_time_zone_fixed_offset() {
        let zone = FloorTimeZone::parse("-05:00").unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 20, 3, 0, 0).unwrap();
        // 03:00 UTC is 22:00 the previous evening at -05:00.
        assert_eq!(
            zone.shift_start(&ShiftClock::default(), now),
            Utc.with_ymd_and_hms(2026, 10, 20, 2, 30, 0).unwrap()
        );
        assert_eq!(
            zone.period_start(Period::Daily, now),
            Utc.with_ymd_and_hms(2026, 10, 19, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_floor_time_zone_parse() {
        assert_eq!(FloorTimeZone::parse("local"), Ok(FloorTimeZone::Local));
        assert_eq!(FloorTimeZone::parse(""), Ok(FloorTimeZone::Local));
        assert_eq!(
            FloorTimeZone::parse("+00:00"),
            Ok(FloorTimeZone::Fixed(FixedOffset::east_opt(0).unwrap()))
        );
        assert!(FloorTimeZone::parse("Mars/Olympus").is_err());
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            ShiftClock::parse("00:00").map(|c| c.rollover()),
            Ok(NaiveTime::MIN)
        );
        assert!(ShiftClock::parse("25:00").is_err());
        assert!(ShiftClock::parse("nine thirty").is_err());
    }

    proptest! {
        #[test]
        fn prop_shift_start_within_last_day(
            secs in 0i64..4_000_000_000,
            hour in 0u32..24,
            minute in 0u32..60,
        ) {
            let clock = ShiftClock::new(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
            let now = Utc.timestamp_opt(secs, 0).unwrap();
            let start = clock.shift_start_for(&now);

            prop_assert!(start <= now);
            prop_assert!(start > now - TimeDelta::hours(24));
            prop_assert_eq!(start.time(), clock.rollover());
            let today = now.date_naive();
            prop_assert!(
                start.date_naive() == today || Some(start.date_naive()) == today.pred_opt()
            );
        }
    }
}
