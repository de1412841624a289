//! Window specifications and their structural validation.
//!
//! A [`TimeRange`] is the single configuration record every resolver call
//! consumes. It is immutable input: nothing here holds state between calls.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::config::TimeRangeConfig;
use crate::error::{Result, WindowError};

/// Shortest month length. No recurring window may last longer than this,
/// otherwise consecutive monthly occurrences could overlap.
pub(crate) const SHORTEST_MONTH_DAYS: u32 = 28;

/// Every possible month length, as the month's last day.
pub(crate) const MONTH_LENGTHS: [u32; 4] = [28, 29, 30, 31];

// ── HourMinute ──────────────────────────────────────────────────────────────

/// A wall-clock time of day with minute precision (`00:00`–`23:59`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HourMinute {
    hour: u32,
    minute: u32,
}

impl HourMinute {
    /// Midnight, `00:00`.
    pub const MIDNIGHT: HourMinute = HourMinute { hour: 0, minute: 0 };

    /// Create a time of day, rejecting hours above 23 and minutes above 59.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(WindowError::InvalidSpec(format!(
                "time of day {hour:02}:{minute:02} is out of range"
            )));
        }
        Ok(Self { hour, minute })
    }

    /// The time of day of `dt`, truncated to the minute.
    pub fn of<T: chrono::TimeZone>(dt: &DateTime<T>) -> Self {
        Self {
            hour: dt.hour(),
            minute: dt.minute(),
        }
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Offset of this time of day from midnight.
    pub(crate) fn since_midnight(&self) -> Duration {
        Duration::minutes(i64::from(self.hour * 60 + self.minute))
    }
}

impl fmt::Display for HourMinute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for HourMinute {
    type Err = WindowError;

    /// Parse `"HH:MM"` (a single-digit hour is accepted).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || WindowError::InvalidSpec(format!("'{s}' is not an HH:MM time of day"));
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour = hour.parse::<u32>().map_err(|_| invalid())?;
        let minute = minute.parse::<u32>().map_err(|_| invalid())?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for HourMinute {
    type Error = WindowError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<HourMinute> for String {
    fn from(hm: HourMinute) -> Self {
        hm.to_string()
    }
}

// ── Frequency ───────────────────────────────────────────────────────────────

/// Cadence parameters of a recurring window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cadence {
    /// Every day from `from` to `to`. Crosses midnight when `to <= from`.
    Daily { from: HourMinute, to: HourMinute },
    /// On each of `weekdays`, from `from` to `to`. Crosses midnight when `to <= from`.
    Weekly {
        weekdays: Vec<Weekday>,
        from: HourMinute,
        to: HourMinute,
    },
    /// Once a week, from `weekday_from` at `from` until `weekday_to` at `to`.
    WeeklyRange {
        weekday_from: Weekday,
        weekday_to: Weekday,
        from: HourMinute,
        to: HourMinute,
    },
    /// Once a month, from day `day_from` at `from` until day `day_to` at `to`.
    ///
    /// Positive days are calendar days. Negative days count back from the
    /// end of the month: `-1` is the last day, `-3` the third-to-last.
    /// When the window starts in one month and ends in the next, `day_to`
    /// is the day of the following month on which the window ends.
    Monthly {
        day_from: i32,
        day_to: i32,
        from: HourMinute,
        to: HourMinute,
    },
}

/// Kind of window: one explicit interval, or a recurring cadence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frequency {
    Fixed,
    Recurring(Cadence),
}

impl Frequency {
    /// Short lowercase name used in logs and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Frequency::Fixed => "fixed",
            Frequency::Recurring(Cadence::Daily { .. }) => "daily",
            Frequency::Recurring(Cadence::Weekly { .. }) => "weekly",
            Frequency::Recurring(Cadence::WeeklyRange { .. }) => "weekly_range",
            Frequency::Recurring(Cadence::Monthly { .. }) => "monthly",
        }
    }
}

// ── TimeRange ───────────────────────────────────────────────────────────────

/// A window specification.
///
/// For [`Frequency::Fixed`], `time_from` and `time_to` are the window itself.
/// For recurring frequencies they are optional validity bounds that clip
/// every occurrence; `None` leaves that side unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TimeRangeConfig", into = "TimeRangeConfig")]
pub struct TimeRange {
    pub frequency: Frequency,
    pub time_from: Option<DateTime<Utc>>,
    pub time_to: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// A one-off window from `from` to `to`.
    pub fn fixed(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            frequency: Frequency::Fixed,
            time_from: Some(from),
            time_to: Some(to),
        }
    }

    /// An unbounded recurring window.
    pub fn recurring(cadence: Cadence) -> Self {
        Self {
            frequency: Frequency::Recurring(cadence),
            time_from: None,
            time_to: None,
        }
    }

    /// Replace the validity bounds.
    pub fn with_bounds(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.time_from = from;
        self.time_to = to;
        self
    }

    /// Reject structurally invalid specifications.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidSpec`] when a fixed window lacks a bound,
    /// the bounds are out of order, or the cadence cannot produce
    /// well-formed, non-overlapping occurrences.
    pub fn validate(&self) -> Result<()> {
        match &self.frequency {
            Frequency::Fixed => {
                let (from, to) = self.fixed_bounds()?;
                check_bounds_order(from, to)
            }
            Frequency::Recurring(cadence) => {
                if let (Some(from), Some(to)) = (self.time_from, self.time_to) {
                    check_bounds_order(from, to)?;
                }
                cadence.validate()
            }
        }
    }
}

impl TimeRange {
    /// Both bounds of a fixed window.
    pub(crate) fn fixed_bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.time_from, self.time_to) {
            (Some(from), Some(to)) => Ok((from, to)),
            _ => Err(WindowError::InvalidSpec(
                "fixed window requires both time_from and time_to".to_string(),
            )),
        }
    }
}

fn check_bounds_order(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<()> {
    if from > to {
        return Err(WindowError::InvalidSpec(format!(
            "time_from {} is after time_to {}",
            from.to_rfc3339(),
            to.to_rfc3339()
        )));
    }
    Ok(())
}

impl Cadence {
    fn validate(&self) -> Result<()> {
        match self {
            Cadence::Daily { from, to } => check_not_empty(from, to),
            Cadence::Weekly { weekdays, from, to } => {
                if weekdays.is_empty() {
                    return Err(WindowError::InvalidSpec(
                        "weekly window requires at least one weekday".to_string(),
                    ));
                }
                check_not_empty(from, to)
            }
            Cadence::WeeklyRange {
                weekday_from,
                weekday_to,
                from,
                to,
            } => {
                if weekday_from == weekday_to && from == to {
                    return Err(WindowError::InvalidSpec(format!(
                        "weekly range window starts and ends on {weekday_from} {from}"
                    )));
                }
                Ok(())
            }
            Cadence::Monthly {
                day_from, day_to, ..
            } => self.validate_monthly(*day_from, *day_to),
        }
    }

    fn validate_monthly(&self, day_from: i32, day_to: i32) -> Result<()> {
        for (name, day) in [("day_from", day_from), ("day_to", day_to)] {
            if !(1..=31).contains(&day) && !(-(SHORTEST_MONTH_DAYS as i32)..=-1).contains(&day) {
                return Err(WindowError::InvalidSpec(format!(
                    "{name} {day} is not a day of month (1..=31, or -28..=-1 from the end)"
                )));
            }
        }
        if day_from < 0 && day_to < 0 && day_to < day_from {
            return Err(WindowError::InvalidSpec(format!(
                "a window ending in the following month needs a positive day_to, got {day_to}"
            )));
        }

        let longest = Duration::days(i64::from(SHORTEST_MONTH_DAYS));
        for last_day in MONTH_LENGTHS {
            if self.start_day_for(last_day).is_none() {
                // Starts on a day this month length doesn't have: no occurrence.
                continue;
            }
            let duration = self.duration_for(last_day);
            if duration <= Duration::zero() {
                return Err(WindowError::InvalidSpec(format!(
                    "window from day {day_from} to day {day_to} is empty or reversed \
                     in a {last_day}-day month"
                )));
            }
            if duration > longest {
                return Err(WindowError::InvalidSpec(format!(
                    "window from day {day_from} to day {day_to} lasts {} days in a \
                     {last_day}-day month, longer than the shortest month",
                    duration.num_days()
                )));
            }
        }
        Ok(())
    }
}

fn check_not_empty(from: &HourMinute, to: &HourMinute) -> Result<()> {
    if from == to {
        return Err(WindowError::InvalidSpec(format!(
            "window from {from} to {to} is empty"
        )));
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn hm(s: &str) -> HourMinute {
        s.parse().unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn monthly(day_from: i32, day_to: i32, from: &str, to: &str) -> TimeRange {
        TimeRange::recurring(Cadence::Monthly {
            day_from,
            day_to,
            from: hm(from),
            to: hm(to),
        })
    }

    // ── HourMinute ──────────────────────────────────────────────────────

    #[test]
    fn test_hour_minute_parses_and_displays() {
        let parsed = hm("09:05");
        assert_eq!(parsed.hour(), 9);
        assert_eq!(parsed.minute(), 5);
        assert_eq!(parsed.to_string(), "09:05");
        assert_eq!(hm("7:30").to_string(), "07:30");
    }

    #[test]
    fn test_hour_minute_rejects_malformed() {
        for bad in ["", "12", "24:00", "12:60", "ab:cd", "12:5", "123:00", "-1:00"] {
            assert!(bad.parse::<HourMinute>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_hour_minute_orders_by_hour_then_minute() {
        assert!(hm("09:59") < hm("10:00"));
        assert!(hm("10:01") > hm("10:00"));
    }

    // ── Fixed validation ────────────────────────────────────────────────

    #[test]
    fn test_fixed_requires_both_bounds() {
        let range = TimeRange {
            frequency: Frequency::Fixed,
            time_from: Some(utc(2023, 1, 1, 0, 0)),
            time_to: None,
        };
        let err = range.validate().unwrap_err().to_string();
        assert!(err.contains("requires both"), "got: {err}");
    }

    #[test]
    fn test_fixed_rejects_reversed_bounds() {
        let range = TimeRange::fixed(utc(2023, 2, 1, 0, 0), utc(2023, 1, 1, 0, 0));
        assert!(matches!(range.validate(), Err(WindowError::InvalidSpec(_))));
    }

    #[test]
    fn test_fixed_accepts_equal_bounds() {
        let at = utc(2023, 1, 1, 0, 0);
        assert!(TimeRange::fixed(at, at).validate().is_ok());
    }

    // ── Recurring validation ────────────────────────────────────────────

    #[test]
    fn test_recurring_rejects_reversed_bounds() {
        let range = TimeRange::recurring(Cadence::Daily {
            from: hm("09:00"),
            to: hm("17:00"),
        })
        .with_bounds(Some(utc(2023, 3, 1, 0, 0)), Some(utc(2023, 2, 1, 0, 0)));
        assert!(range.validate().is_err());
    }

    #[test]
    fn test_recurring_accepts_one_sided_bounds() {
        let range = TimeRange::recurring(Cadence::Daily {
            from: hm("22:00"),
            to: hm("02:00"),
        })
        .with_bounds(None, Some(utc(2023, 2, 1, 0, 0)));
        assert!(range.validate().is_ok());
    }

    #[test]
    fn test_daily_rejects_empty_window() {
        let range = TimeRange::recurring(Cadence::Daily {
            from: hm("09:00"),
            to: hm("09:00"),
        });
        assert!(range.validate().is_err());
    }

    #[test]
    fn test_weekly_requires_weekdays() {
        let range = TimeRange::recurring(Cadence::Weekly {
            weekdays: vec![],
            from: hm("09:00"),
            to: hm("17:00"),
        });
        let err = range.validate().unwrap_err().to_string();
        assert!(err.contains("at least one weekday"), "got: {err}");
    }

    #[test]
    fn test_weekly_range_rejects_empty_window() {
        let range = TimeRange::recurring(Cadence::WeeklyRange {
            weekday_from: Weekday::Fri,
            weekday_to: Weekday::Fri,
            from: hm("18:00"),
            to: hm("18:00"),
        });
        assert!(range.validate().is_err());
    }

    #[test]
    fn test_monthly_accepts_overlapping_window() {
        assert!(monthly(25, 3, "00:00", "00:00").validate().is_ok());
        assert!(monthly(-3, 1, "00:00", "06:00").validate().is_ok());
    }

    #[test]
    fn test_monthly_accepts_window_within_month() {
        assert!(monthly(1, 5, "08:00", "18:00").validate().is_ok());
        assert!(monthly(-3, -1, "00:00", "23:59").validate().is_ok());
        assert!(monthly(20, -1, "00:00", "23:59").validate().is_ok());
    }

    #[test]
    fn test_monthly_rejects_invalid_days() {
        for (from, to) in [(0, 3), (32, 3), (1, 0), (1, 32), (-29, 1)] {
            let err = monthly(from, to, "00:00", "01:00").validate();
            assert!(err.is_err(), "accepted day_from {from} day_to {to}");
        }
    }

    #[test]
    fn test_monthly_rejects_negative_day_to_in_next_month() {
        let err = monthly(-1, -3, "00:00", "00:00").validate().unwrap_err();
        assert!(err.to_string().contains("positive day_to"), "got: {err}");
    }

    #[test]
    fn test_monthly_rejects_window_longer_than_shortest_month() {
        // Starts on the 2nd, ends on the 1st of the next month: 30 days in a 31-day month
        let err = monthly(2, 1, "00:00", "00:00").validate().unwrap_err();
        assert!(err.to_string().contains("shortest month"), "got: {err}");
    }

    #[test]
    fn test_monthly_rejects_reversed_same_day_window() {
        assert!(monthly(5, 5, "18:00", "08:00").validate().is_err());
    }

    #[test]
    fn test_monthly_rejects_mixed_sign_window_crossing_month_end() {
        // Day 27 to third-to-last day: reversed in a 28-day February
        assert!(monthly(27, -3, "00:00", "00:00").validate().is_err());
    }

    #[test]
    fn test_monthly_skips_month_lengths_without_start_day() {
        // The 31st to the 2nd: no occurrence in 28/29/30-day months
        assert!(monthly(31, 2, "10:00", "09:00").validate().is_ok());
    }

    #[test]
    fn test_frequency_names() {
        assert_eq!(Frequency::Fixed.name(), "fixed");
        let monthly = monthly(1, 2, "00:00", "00:00").frequency;
        assert_eq!(monthly.name(), "monthly");
    }
}
