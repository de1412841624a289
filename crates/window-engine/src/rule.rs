//! Recurrence-rule evaluation.
//!
//! The engine does not interpret cron rules itself. It asks a
//! [`RecurrenceEvaluator`] for the first scheduled instant after a probe
//! point. [`CronEvaluator`] is the default, backed by the `cron` crate.

use std::str::FromStr;

use chrono::DateTime;
use chrono_tz::Tz;
use cron::Schedule;

use crate::error::{Result, WindowError};

/// Maps a rule string and a probe instant to the rule's next firing.
pub trait RecurrenceEvaluator {
    /// The earliest instant strictly after `probe` matched by `rule`.
    ///
    /// # Errors
    ///
    /// [`WindowError::RuleParse`] if `rule` is malformed,
    /// [`WindowError::RuleExhausted`] if it never fires after `probe`.
    fn next_after(&self, rule: &str, probe: &DateTime<Tz>) -> Result<DateTime<Tz>>;
}

impl<F> RecurrenceEvaluator for F
where
    F: Fn(&str, &DateTime<Tz>) -> Result<DateTime<Tz>>,
{
    fn next_after(&self, rule: &str, probe: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        self(rule, probe)
    }
}

/// Evaluates standard five-field cron rules
/// (`minute hour day-of-month month day-of-week`) in the probe's timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct CronEvaluator;

impl RecurrenceEvaluator for CronEvaluator {
    fn next_after(&self, rule: &str, probe: &DateTime<Tz>) -> Result<DateTime<Tz>> {
        let schedule = parse_rule(rule)?;
        schedule
            .after(probe)
            .next()
            .ok_or_else(|| WindowError::RuleExhausted {
                rule: rule.to_string(),
                after: probe.to_rfc3339(),
            })
    }
}

/// Parse a cron rule, accepting five-field rules.
///
/// The `cron` crate requires a leading seconds field, so five-field rules
/// get `0` prepended. Six- and seven-field rules pass through unchanged.
///
/// # Errors
///
/// Returns [`WindowError::RuleParse`] naming the rule as given.
pub fn parse_rule(rule: &str) -> Result<Schedule> {
    Schedule::from_str(&normalize_rule(rule)).map_err(|e| WindowError::RuleParse {
        rule: rule.to_string(),
        reason: e.to_string(),
    })
}

fn normalize_rule(rule: &str) -> String {
    let trimmed = rule.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Tz::UTC.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_normalize_prepends_seconds() {
        assert_eq!(normalize_rule("0 9 * * *"), "0 0 9 * * *");
        assert_eq!(normalize_rule("  30 22 * * Mon  "), "0 30 22 * * Mon");
    }

    #[test]
    fn test_normalize_passes_six_fields_through() {
        assert_eq!(normalize_rule("15 0 9 * * *"), "15 0 9 * * *");
    }

    #[test]
    fn test_next_after_is_strictly_after_probe() {
        let probe = at(2023, 3, 1, 9, 0);
        let next = CronEvaluator.next_after("0 9 * * *", &probe).unwrap();
        assert_eq!(next, at(2023, 3, 2, 9, 0));
    }

    #[test]
    fn test_next_after_day_of_month() {
        let next = CronEvaluator
            .next_after("0 0 26 * *", &at(2023, 2, 10, 0, 0))
            .unwrap();
        assert_eq!(next, at(2023, 2, 26, 0, 0));
    }

    #[test]
    fn test_next_after_skips_months_without_the_day() {
        let next = CronEvaluator
            .next_after("0 0 30 * *", &at(2023, 2, 1, 0, 0))
            .unwrap();
        assert_eq!(next, at(2023, 3, 30, 0, 0));
    }

    #[test]
    fn test_next_after_named_weekdays() {
        // 1 March 2023 is a Wednesday
        let next = CronEvaluator
            .next_after("0 9 * * Mon,Fri", &at(2023, 3, 1, 12, 0))
            .unwrap();
        assert_eq!(next, at(2023, 3, 3, 9, 0));
    }

    #[test]
    fn test_next_after_respects_probe_timezone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let probe = tz.with_ymd_and_hms(2023, 6, 1, 12, 0, 0).unwrap();
        let next = CronEvaluator.next_after("0 9 * * *", &probe).unwrap();
        assert_eq!(next, tz.with_ymd_and_hms(2023, 6, 2, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_rule_names_the_rule() {
        let err = CronEvaluator
            .next_after("not a rule", &at(2023, 1, 1, 0, 0))
            .unwrap_err();
        assert!(matches!(err, WindowError::RuleParse { .. }));
        assert!(err.to_string().contains("'not a rule'"), "got: {err}");
    }

    #[test]
    fn test_closure_evaluator() {
        let fixed = at(2030, 1, 1, 0, 0);
        let evaluator = |_: &str, _: &DateTime<Tz>| -> Result<DateTime<Tz>> { Ok(fixed) };
        assert_eq!(
            evaluator.next_after("ignored", &at(2023, 1, 1, 0, 0)).unwrap(),
            fixed
        );
    }
}
