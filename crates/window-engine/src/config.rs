//! Serialized form of a window specification.
//!
//! [`TimeRangeConfig`] is the flat record stored in configuration files and
//! sent over the wire. Converting it into a [`TimeRange`] checks that the
//! fields the chosen frequency needs are present; [`TimeRange`] itself
//! (de)serializes through this type.
//!
//! ```json
//! {
//!   "frequency": "monthly",
//!   "time_from": "2023-01-01T00:00:00Z",
//!   "hour_minute_from": "00:00",
//!   "hour_minute_to": "06:00",
//!   "day_from": -3,
//!   "day_to": 1
//! }
//! ```

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;
use crate::range::{Cadence, Frequency, HourMinute, TimeRange};

/// Recognized window kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyKind {
    Fixed,
    Daily,
    Weekly,
    WeeklyRange,
    Monthly,
}

/// Flat, serde-friendly window specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeConfig {
    pub frequency: FrequencyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_minute_from: Option<HourMinute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour_minute_to: Option<HourMinute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weekdays: Vec<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_from: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekday_to: Option<Weekday>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_from: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_to: Option<i32>,
}

impl TimeRangeConfig {
    fn empty(frequency: FrequencyKind) -> Self {
        Self {
            frequency,
            time_from: None,
            time_to: None,
            hour_minute_from: None,
            hour_minute_to: None,
            weekdays: Vec::new(),
            weekday_from: None,
            weekday_to: None,
            day_from: None,
            day_to: None,
        }
    }
}

fn required<T>(value: Option<T>, kind: &str, field: &str) -> Result<T, WindowError> {
    value.ok_or_else(|| WindowError::InvalidSpec(format!("{kind} window requires '{field}'")))
}

impl TryFrom<TimeRangeConfig> for TimeRange {
    type Error = WindowError;

    fn try_from(config: TimeRangeConfig) -> Result<Self, Self::Error> {
        let times = |kind: &str| -> Result<(HourMinute, HourMinute), WindowError> {
            Ok((
                required(config.hour_minute_from, kind, "hour_minute_from")?,
                required(config.hour_minute_to, kind, "hour_minute_to")?,
            ))
        };

        let frequency = match config.frequency {
            FrequencyKind::Fixed => Frequency::Fixed,
            FrequencyKind::Daily => {
                let (from, to) = times("daily")?;
                Frequency::Recurring(Cadence::Daily { from, to })
            }
            FrequencyKind::Weekly => {
                let (from, to) = times("weekly")?;
                Frequency::Recurring(Cadence::Weekly {
                    weekdays: config.weekdays,
                    from,
                    to,
                })
            }
            FrequencyKind::WeeklyRange => {
                let (from, to) = times("weekly_range")?;
                Frequency::Recurring(Cadence::WeeklyRange {
                    weekday_from: required(config.weekday_from, "weekly_range", "weekday_from")?,
                    weekday_to: required(config.weekday_to, "weekly_range", "weekday_to")?,
                    from,
                    to,
                })
            }
            FrequencyKind::Monthly => {
                let (from, to) = times("monthly")?;
                Frequency::Recurring(Cadence::Monthly {
                    day_from: required(config.day_from, "monthly", "day_from")?,
                    day_to: required(config.day_to, "monthly", "day_to")?,
                    from,
                    to,
                })
            }
        };

        Ok(TimeRange {
            frequency,
            time_from: config.time_from,
            time_to: config.time_to,
        })
    }
}

impl From<TimeRange> for TimeRangeConfig {
    fn from(range: TimeRange) -> Self {
        let mut config = match range.frequency {
            Frequency::Fixed => TimeRangeConfig::empty(FrequencyKind::Fixed),
            Frequency::Recurring(Cadence::Daily { from, to }) => TimeRangeConfig {
                hour_minute_from: Some(from),
                hour_minute_to: Some(to),
                ..TimeRangeConfig::empty(FrequencyKind::Daily)
            },
            Frequency::Recurring(Cadence::Weekly { weekdays, from, to }) => TimeRangeConfig {
                hour_minute_from: Some(from),
                hour_minute_to: Some(to),
                weekdays,
                ..TimeRangeConfig::empty(FrequencyKind::Weekly)
            },
            Frequency::Recurring(Cadence::WeeklyRange {
                weekday_from,
                weekday_to,
                from,
                to,
            }) => TimeRangeConfig {
                hour_minute_from: Some(from),
                hour_minute_to: Some(to),
                weekday_from: Some(weekday_from),
                weekday_to: Some(weekday_to),
                ..TimeRangeConfig::empty(FrequencyKind::WeeklyRange)
            },
            Frequency::Recurring(Cadence::Monthly {
                day_from,
                day_to,
                from,
                to,
            }) => TimeRangeConfig {
                hour_minute_from: Some(from),
                hour_minute_to: Some(to),
                day_from: Some(day_from),
                day_to: Some(day_to),
                ..TimeRangeConfig::empty(FrequencyKind::Monthly)
            },
        };
        config.time_from = range.time_from;
        config.time_to = range.time_to;
        config
    }
}
