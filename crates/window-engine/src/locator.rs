//! Turns a cadence into a concrete `[start, end)` occurrence.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use tracing::trace;

use crate::calendar::{last_day_of_month, next_month};
use crate::error::{Result, WindowError};
use crate::geometry::geometry_for;
use crate::range::Cadence;
use crate::rule::RecurrenceEvaluator;

/// Occurrences inspected before giving up on a rule. A monthly cadence
/// starting on the 31st can skip several shorter months in a row.
const MAX_STEPS: usize = 24;

/// Locate the occurrence of `cadence` that contains `target`, or the next
/// one to start after it.
///
/// The search starts at `target` minus the governing duration: the first
/// rule firing after that probe is the start of the occurrence containing
/// `target` if there is one, otherwise the next start. Firings that are not
/// genuine starts for their month, and occurrences that already ended, are
/// stepped over.
///
/// Durations are added as elapsed time. A window spanning a DST change ends
/// that much wall-clock time later or earlier than its `to` time of day, e.g.
/// a 22:00 to 06:00 window in Europe/Berlin on the spring-forward night ends
/// at 07:00 CEST.
pub fn locate_window<E>(
    cadence: &Cadence,
    target: &DateTime<Tz>,
    evaluator: &E,
) -> Result<(DateTime<Tz>, DateTime<Tz>)>
where
    E: RecurrenceEvaluator + ?Sized,
{
    let geometry = geometry_for(cadence, target);
    let probe = *target - geometry.probe_duration;
    trace!(
        rule = %geometry.rule,
        last_day = geometry.last_day,
        probe = %probe.to_rfc3339(),
        "locating window start"
    );

    let mut start = evaluator.next_after(&geometry.rule, &probe)?;
    for _ in 0..MAX_STEPS {
        if !cadence.starts_on(&start) {
            trace!(skipped = %start.to_rfc3339(), "rule fired outside its month geometry");
            start = step(cadence, &geometry.rule, &start, evaluator)?;
            continue;
        }
        let end = start + cadence.duration_from(&start);
        if end <= *target {
            trace!(skipped = %start.to_rfc3339(), "occurrence already ended");
            start = step(cadence, &geometry.rule, &start, evaluator)?;
            continue;
        }
        return Ok((start, end));
    }

    Err(WindowError::RuleExhausted {
        rule: geometry.rule,
        after: probe.to_rfc3339(),
    })
}

/// The next genuine start after `current`.
///
/// Monthly starts move with month length, so each month is searched from
/// its beginning with a rule pinned to that month's own start day. A
/// misfire resolves to the genuine start of its own month, which may come
/// before the misfire; a genuine start moves on to the following month.
fn step<E>(
    cadence: &Cadence,
    rule: &str,
    current: &DateTime<Tz>,
    evaluator: &E,
) -> Result<DateTime<Tz>>
where
    E: RecurrenceEvaluator + ?Sized,
{
    if !matches!(cadence, Cadence::Monthly { .. }) {
        return evaluator.next_after(rule, current);
    }

    let tz = current.timezone();
    let (mut month, mut year) = (current.month(), current.year());
    if cadence.starts_on(current) {
        (month, year) = next_month(month, year);
    }
    for _ in 0..=12 {
        let last_day = last_day_of_month(year, month);
        if let (Some(_), Some(first)) = (
            cadence.start_day_for(last_day),
            NaiveDate::from_ymd_opt(year, month, 1),
        ) {
            // A day early covers any UTC offset; the rule cannot fire
            // outside its month.
            let before =
                tz.from_utc_datetime(&first.and_time(NaiveTime::MIN)) - Duration::days(1);
            let candidate =
                evaluator.next_after(&cadence.rule_in_month(last_day, month), &before)?;
            if (candidate.year(), candidate.month()) == (year, month) {
                return Ok(candidate);
            }
        }
        (month, year) = next_month(month, year);
    }

    Err(WindowError::RuleExhausted {
        rule: rule.to_string(),
        after: current.to_rfc3339(),
    })
}
