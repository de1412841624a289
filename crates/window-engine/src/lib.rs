//! # window-engine
//!
//! Deterministic active-window resolution.
//!
//! Given a window specification and a target instant, the engine decides
//! whether the instant is inside the window and when that next changes.
//! Windows are either one-off fixed intervals or recurring cadences whose
//! starts are described by cron rules. Monthly windows anchored near the
//! end of the month adapt to the month's length, and a target in the first
//! days of a month is resolved against the previous month's window when it
//! falls in that window's tail.
//!
//! Every function is pure: no clock access, no I/O, no shared state.
//!
//! ## Modules
//!
//! - [`range`] — window specifications and validation
//! - [`config`] — serialized (JSON) form of a specification
//! - [`calendar`] — month length and month stepping helpers
//! - [`geometry`] — month-length-dependent durations, rules and overlap resolution
//! - [`rule`] — recurrence-rule evaluation (cron)
//! - [`locator`] — concrete occurrence lookup
//! - [`resolver`] — entry point: containment and next boundary
//! - [`error`] — Error types

pub mod calendar;
pub mod config;
pub mod error;
pub mod geometry;
pub mod locator;
pub mod range;
pub mod resolver;
pub mod rule;

pub use config::{FrequencyKind, TimeRangeConfig};
pub use error::WindowError;
pub use geometry::{geometry_for, WindowGeometry};
pub use locator::locate_window;
pub use range::{Cadence, Frequency, HourMinute, TimeRange};
pub use resolver::{is_time_in_between, resolve_window, resolve_window_with, WindowState};
pub use rule::{CronEvaluator, RecurrenceEvaluator};
