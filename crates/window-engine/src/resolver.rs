//! Window resolution entry point.
//!
//! [`resolve_window`] answers two questions about a target instant: is it
//! inside the active window, and when does that state next change.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::error::Result;
use crate::locator::locate_window;
use crate::range::{Frequency, TimeRange};
use crate::rule::{CronEvaluator, RecurrenceEvaluator};

/// Where a target instant stands relative to its window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    /// The next instant at which `is_inside` flips: the window's end when
    /// inside, its start when outside. `None` when no change is ahead (a
    /// fixed window that has already ended, or a recurring one past its
    /// `time_to`).
    pub next_boundary: Option<DateTime<Tz>>,
    /// Whether the target instant is inside the window.
    pub is_inside: bool,
}

impl WindowState {
    fn inside(end: DateTime<Tz>) -> Self {
        Self {
            next_boundary: Some(end),
            is_inside: true,
        }
    }

    fn outside(start: Option<DateTime<Tz>>) -> Self {
        Self {
            next_boundary: start,
            is_inside: false,
        }
    }
}

/// Resolve `range` at `target` using the default cron evaluator.
///
/// # Errors
///
/// Returns [`InvalidSpec`](crate::WindowError::InvalidSpec) if `range` fails
/// validation, or a rule error if a recurrence rule cannot be parsed or
/// evaluated.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use chrono_tz::Tz;
/// use window_engine::{resolve_window, TimeRange};
///
/// let range = TimeRange::fixed(
///     Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2023, 1, 31, 23, 59, 0).unwrap(),
/// );
/// let target = Tz::UTC.with_ymd_and_hms(2023, 1, 15, 12, 0, 0).unwrap();
/// let state = resolve_window(&range, &target).unwrap();
/// assert!(state.is_inside);
/// assert_eq!(
///     state.next_boundary.unwrap().to_rfc3339(),
///     "2023-01-31T23:59:00+00:00"
/// );
/// ```
pub fn resolve_window(range: &TimeRange, target: &DateTime<Tz>) -> Result<WindowState> {
    resolve_window_with(range, target, &CronEvaluator)
}

/// Resolve `range` at `target` with an injected recurrence evaluator.
///
/// Validation runs first; an invalid `range` is rejected before any rule is
/// evaluated. Recurring occurrences are clipped to the range's validity
/// bounds before the containment test. Once `time_to` has cut off every
/// remaining occurrence the state is `(None, false)`.
///
/// # Errors
///
/// Same as [`resolve_window`], plus any error `evaluator` returns.
pub fn resolve_window_with<E>(
    range: &TimeRange,
    target: &DateTime<Tz>,
    evaluator: &E,
) -> Result<WindowState>
where
    E: RecurrenceEvaluator + ?Sized,
{
    range.validate()?;

    let state = match &range.frequency {
        Frequency::Fixed => {
            let (from, to) = range.fixed_bounds()?;
            fixed_window(target, from, to)
        }
        Frequency::Recurring(cadence) => {
            let (start, end) = locate_window(cadence, target, evaluator)?;
            let (start, end) = clip(range, start, end);
            debug!(
                window_start = %start.to_rfc3339(),
                window_end = %end.to_rfc3339(),
                "located recurring window"
            );
            if end <= start || end <= *target {
                // Clipped away by time_to: nothing left ahead of the target
                WindowState::outside(None)
            } else if is_time_in_between(target, &start, &end) {
                WindowState::inside(end)
            } else {
                WindowState::outside(Some(start))
            }
        }
    };

    debug!(
        frequency = range.frequency.name(),
        at = %target.to_rfc3339(),
        is_inside = state.is_inside,
        next_boundary = ?state.next_boundary.map(|b| b.to_rfc3339()),
        "resolved window"
    );
    Ok(state)
}

/// Whether `t` is in `[start, end)`: after the start and before the end, or
/// exactly the start.
pub fn is_time_in_between<T: chrono::TimeZone>(
    t: &DateTime<T>,
    start: &DateTime<T>,
    end: &DateTime<T>,
) -> bool {
    (t > start && t < end) || t == start
}

/// A fixed window includes both its first and its final instant.
fn fixed_window(target: &DateTime<Tz>, from: DateTime<Utc>, to: DateTime<Utc>) -> WindowState {
    let tz = target.timezone();
    let (from, to) = (from.with_timezone(&tz), to.with_timezone(&tz));

    if *target > to {
        WindowState::outside(None)
    } else if *target < from {
        WindowState::outside(Some(from))
    } else {
        WindowState::inside(to)
    }
}

fn clip(range: &TimeRange, start: DateTime<Tz>, end: DateTime<Tz>) -> (DateTime<Tz>, DateTime<Tz>) {
    let tz = start.timezone();
    let start = match range.time_from.map(|from| from.with_timezone(&tz)) {
        Some(from) if start < from => from,
        _ => start,
    };
    let end = match range.time_to.map(|to| to.with_timezone(&tz)) {
        Some(to) if end > to => to,
        _ => end,
    };
    (start, end)
}

// ── Tests ───────────────────────────────────────────────────────────────────
