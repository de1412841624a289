//! Month-length-dependent window geometry.
//!
//! A monthly window such as "the last 3 days of the month" starts on a
//! different calendar day depending on how long the month is, and may run
//! into the first days of the following month. Both the window's duration
//! and the cron rule describing its start are therefore pure functions of
//! the month's last day. This module computes them and decides which month's
//! geometry governs a given target instant.
//!
//! The "overlap region" is the part of a window's tail that falls in the
//! month after the one it started in. A target inside it belongs to the
//! occurrence that started in the *previous* month, so that month's length
//! governs.

use chrono::{DateTime, Datelike, Duration, Weekday};
use chrono_tz::Tz;

use crate::calendar::{last_day_of_month, previous_month};
use crate::range::{Cadence, HourMinute};

/// Parameters for locating the occurrence relevant to one target instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowGeometry {
    /// Last day of the governing month.
    pub last_day: u32,
    /// Five-field cron rule whose firings are window starts.
    pub rule: String,
    /// Window duration in the governing month.
    pub duration: Duration,
    /// How far before the target the start search begins.
    pub probe_duration: Duration,
}

impl Cadence {
    /// Whether each occurrence starts in one month and ends in the next.
    pub fn is_month_overlapping(&self) -> bool {
        match self {
            Cadence::Monthly {
                day_from, day_to, ..
            } => (*day_from < 0 && *day_to > 0) || (*day_from > 0 && *day_to > 0 && day_to < day_from),
            _ => false,
        }
    }

    /// Whether `target` lies in the overlap region: before `day_to` at the
    /// window's end time of day.
    pub fn is_inside_overlap(&self, target: &DateTime<Tz>) -> bool {
        let Cadence::Monthly { day_to, to, .. } = self else {
            return false;
        };
        if !self.is_month_overlapping() {
            return false;
        }
        let day = target.day() as i32;
        day < *day_to || (day == *day_to && HourMinute::of(target) < *to)
    }

    /// Calendar day a monthly window starts on in a month ending on
    /// `last_day`, or `None` if that month has no such day.
    ///
    /// Non-monthly cadences have no start day.
    pub fn start_day_for(&self, last_day: u32) -> Option<u32> {
        match self {
            Cadence::Monthly { day_from, .. } if *day_from > 0 => {
                let day = day_from.unsigned_abs();
                (day <= last_day).then_some(day)
            }
            Cadence::Monthly { day_from, .. } => Some(resolve_day(*day_from, last_day)),
            _ => None,
        }
    }

    /// Window duration for a month ending on `last_day`.
    ///
    /// Only monthly cadences depend on `last_day`. Time-of-day windows that
    /// end at or before their start wrap past midnight; weekly ranges wrap
    /// by a week.
    pub fn duration_for(&self, last_day: u32) -> Duration {
        match self {
            Cadence::Daily { from, to } | Cadence::Weekly { from, to, .. } => {
                wrap(to.since_midnight() - from.since_midnight(), Duration::days(1))
            }
            Cadence::WeeklyRange {
                weekday_from,
                weekday_to,
                from,
                to,
            } => {
                let days = weekday_offset(*weekday_from, *weekday_to);
                wrap(
                    Duration::days(days) + to.since_midnight() - from.since_midnight(),
                    Duration::weeks(1),
                )
            }
            Cadence::Monthly {
                day_from,
                day_to,
                from,
                to,
            } => {
                let start = i64::from(resolve_day(*day_from, last_day));
                let days = if self.is_month_overlapping() {
                    i64::from(last_day) - start + i64::from(*day_to)
                } else {
                    i64::from(resolve_day(*day_to, last_day)) - start
                };
                Duration::days(days) + to.since_midnight() - from.since_midnight()
            }
        }
    }

    /// Five-field cron rule firing at every window start, for a month ending
    /// on `last_day`.
    pub fn rule_for(&self, last_day: u32) -> String {
        match self {
            Cadence::Daily { from, .. } => format!("{} {} * * *", from.minute(), from.hour()),
            Cadence::Weekly { weekdays, from, .. } => {
                let days: Vec<String> = weekdays.iter().map(|d| d.to_string()).collect();
                format!("{} {} * * {}", from.minute(), from.hour(), days.join(","))
            }
            Cadence::WeeklyRange {
                weekday_from, from, ..
            } => format!("{} {} * * {}", from.minute(), from.hour(), weekday_from),
            Cadence::Monthly { day_from, from, .. } => format!(
                "{} {} {} * *",
                from.minute(),
                from.hour(),
                resolve_day(*day_from, last_day)
            ),
        }
    }

    /// Like [`rule_for`](Self::rule_for) but pinned to one calendar month.
    pub(crate) fn rule_in_month(&self, last_day: u32, month: u32) -> String {
        match self {
            Cadence::Monthly { day_from, from, .. } => format!(
                "{} {} {} {} *",
                from.minute(),
                from.hour(),
                resolve_day(*day_from, last_day),
                month
            ),
            _ => self.rule_for(last_day),
        }
    }

    /// Whether `start` is a genuine window start for its own month.
    ///
    /// A rule computed for one month length can fire in a month of another
    /// length on a day that is not that month's start day.
    pub(crate) fn starts_on(&self, start: &DateTime<Tz>) -> bool {
        match self {
            Cadence::Monthly { .. } => {
                let last_day = last_day_of_month(start.year(), start.month());
                self.start_day_for(last_day) == Some(start.day())
            }
            _ => true,
        }
    }

    /// Duration of the occurrence starting at `start`.
    pub(crate) fn duration_from(&self, start: &DateTime<Tz>) -> Duration {
        self.duration_for(last_day_of_month(start.year(), start.month()))
    }

    /// Whether `target` is earlier in its month than this month's window start.
    fn precedes_start(&self, target: &DateTime<Tz>, last_day: u32) -> bool {
        let Cadence::Monthly { day_from, from, .. } = self else {
            return false;
        };
        let start_day = resolve_day(*day_from, last_day);
        (target.day(), HourMinute::of(target)) < (start_day, *from)
    }
}

/// Compute the geometry governing `target`.
///
/// Inside the overlap region the previous month's length governs. Outside
/// it, when the target still precedes this month's start, the probe uses the
/// previous occurrence's duration so the search cannot land on an occurrence
/// that already ended.
pub fn geometry_for(cadence: &Cadence, target: &DateTime<Tz>) -> WindowGeometry {
    let (month, year) = (target.month(), target.year());
    let overlapping = cadence.is_month_overlapping();
    let in_overlap = overlapping && cadence.is_inside_overlap(target);

    let (gov_month, gov_year) = if in_overlap {
        previous_month(month, year)
    } else {
        (month, year)
    };
    let last_day = last_day_of_month(gov_year, gov_month);
    let duration = cadence.duration_for(last_day);

    let probe_duration = if overlapping && !in_overlap && cadence.precedes_start(target, last_day)
    {
        let (prev_month, prev_year) = previous_month(month, year);
        cadence.duration_for(last_day_of_month(prev_year, prev_month))
    } else {
        duration
    };

    WindowGeometry {
        last_day,
        rule: cadence.rule_for(last_day),
        duration,
        probe_duration,
    }
}

/// Resolve a signed day-of-month against a month ending on `last_day`.
///
/// Negative days count from the end (`-1` is `last_day`). Positive days past
/// the end are clamped to it.
fn resolve_day(day: i32, last_day: u32) -> u32 {
    if day < 0 {
        (last_day as i32 + day + 1).max(1) as u32
    } else {
        day.unsigned_abs().min(last_day)
    }
}

fn weekday_offset(from: Weekday, to: Weekday) -> i64 {
    (i64::from(to.num_days_from_monday()) - i64::from(from.num_days_from_monday())).rem_euclid(7)
}

fn wrap(duration: Duration, period: Duration) -> Duration {
    if duration <= Duration::zero() {
        duration + period
    } else {
        duration
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
