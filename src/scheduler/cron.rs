//! Five-field cron expression parsing and evaluation
//!
//! Supports the classic `minute hour day-of-month month day-of-week`
//! format with `*`, numbers, ranges (`a-b`), steps (`*/n`, `a-b/n`) and
//! comma lists. Day-of-week accepts 0-7 with both 0 and 7 meaning
//! Sunday. Evaluation follows the vixie-cron rule: when both
//! day-of-month and day-of-week are restricted, matching either is
//! enough.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CronError {
    #[error("cron expression must have 5 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid cron field '{field}': {reason}")]
    Field { field: String, reason: String },
}

/// One parsed field, kept as the sorted set of values it matches
#[derive(Debug, Clone, PartialEq)]
struct CronField {
    values: Vec<u8>,
    /// Whether the source text was unrestricted (`*` or `*/n` with n == 1)
    is_wildcard: bool,
}

impl CronField {
    fn matches(&self, value: u8) -> bool {
        self.values.binary_search(&value).is_ok()
    }

    fn parse(text: &str, min: u8, max: u8) -> Result<Self, CronError> {
        let err = |reason: &str| CronError::Field {
            field: text.to_string(),
            reason: reason.to_string(),
        };

        let mut values = Vec::new();
        for part in text.split(',') {
            let (range_text, step) = match part.split_once('/') {
                Some((r, s)) => {
                    let step: u8 = s.parse().map_err(|_| err("step is not a number"))?;
                    if step == 0 {
                        return Err(err("step must be positive"));
                    }
                    (r, step)
                }
                None => (part, 1),
            };

            let (lo, hi) = if range_text == "*" {
                (min, max)
            } else if let Some((a, b)) = range_text.split_once('-') {
                let lo: u8 = a.parse().map_err(|_| err("range start is not a number"))?;
                let hi: u8 = b.parse().map_err(|_| err("range end is not a number"))?;
                if lo > hi {
                    return Err(err("range start exceeds range end"));
                }
                (lo, hi)
            } else {
                let v: u8 = range_text.parse().map_err(|_| err("not a number"))?;
                (v, v)
            };

            if lo < min || hi > max {
                return Err(err(&format!("value out of range {}-{}", min, max)));
            }

            values.extend((lo..=hi).step_by(step as usize));
        }

        if values.is_empty() {
            return Err(err("empty field"));
        }
        values.sort_unstable();
        values.dedup();

        let is_wildcard = values.len() == (max - min + 1) as usize;
        Ok(Self { values, is_wildcard })
    }
}

/// A parsed five-field cron schedule
#[derive(Debug, Clone, PartialEq)]
pub struct CronSchedule {
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl FromStr for CronSchedule {
    type Err = CronError;

    fn from_str(expr: &str) -> Result<Self, CronError> {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(CronError::FieldCount(fields.len()));
        }

        let mut day_of_week = CronField::parse(fields[4], 0, 7)?;
        // Fold 7 into 0 so Sunday matches either spelling
        if day_of_week.values.last() == Some(&7) {
            day_of_week.values.pop();
            if day_of_week.values.first() != Some(&0) {
                day_of_week.values.insert(0, 0);
            }
            day_of_week.is_wildcard = day_of_week.values.len() == 7;
        }

        Ok(Self {
            minute: CronField::parse(fields[0], 0, 59)?,
            hour: CronField::parse(fields[1], 0, 23)?,
            day_of_month: CronField::parse(fields[2], 1, 31)?,
            month: CronField::parse(fields[3], 1, 12)?,
            day_of_week,
        })
    }
}

impl CronSchedule {
    /// Whether the schedule fires at the given instant (second precision
    /// is ignored; cron resolves to minutes)
    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        if !self.minute.matches(at.minute() as u8)
            || !self.hour.matches(at.hour() as u8)
            || !self.month.matches(at.month() as u8)
        {
            return false;
        }

        let dom = self.day_of_month.matches(at.day() as u8);
        let dow = self
            .day_of_week
            .matches(at.weekday().num_days_from_sunday() as u8);

        // vixie-cron: two restricted day fields combine with OR
        match (self.day_of_month.is_wildcard, self.day_of_week.is_wildcard) {
            (false, false) => dom || dow,
            _ => dom && dow,
        }
    }

    /// The first firing instant strictly after `after`, or None when the
    /// schedule can never fire (e.g. `0 0 31 2 *`)
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = Utc
            .with_ymd_and_hms(
                after.year(),
                after.month(),
                after.day(),
                after.hour(),
                after.minute(),
                0,
            )
            .single()?
            + Duration::minutes(1);

        // Minute walk, bounded past any leap-year cycle
        let limit = candidate + Duration::days(366 * 4 + 1);
        while candidate < limit {
            if self.matches(candidate) {
                return Some(candidate);
            }
            candidate += Duration::minutes(1);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_parse_default_nightly() {
        let schedule: CronSchedule = "0 2 * * *".parse().unwrap();
        assert!(schedule.matches(at(2026, 3, 14, 2, 0)));
        assert!(!schedule.matches(at(2026, 3, 14, 2, 1)));
        assert!(!schedule.matches(at(2026, 3, 14, 3, 0)));
    }

    #[test]
    fn test_parse_rejects_wrong_field_count() {
        assert_eq!(
            "0 2 * *".parse::<CronSchedule>().unwrap_err(),
            CronError::FieldCount(4)
        );
        assert!("".parse::<CronSchedule>().is_err());
        assert!("0 2 * * * *".parse::<CronSchedule>().is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("a b c d e".parse::<CronSchedule>().is_err());
        assert!("60 * * * *".parse::<CronSchedule>().is_err());
        assert!("* 24 * * *".parse::<CronSchedule>().is_err());
        assert!("* * 0 * *".parse::<CronSchedule>().is_err());
        assert!("* * * 13 *".parse::<CronSchedule>().is_err());
        assert!("* * * * 8".parse::<CronSchedule>().is_err());
        assert!("*/0 * * * *".parse::<CronSchedule>().is_err());
        assert!("5-2 * * * *".parse::<CronSchedule>().is_err());
    }

    #[test]
    fn test_steps_and_lists() {
        let schedule: CronSchedule = "*/15 9-17 * * 1,3,5".parse().unwrap();
        // 2026-03-16 is a Monday
        assert!(schedule.matches(at(2026, 3, 16, 9, 0)));
        assert!(schedule.matches(at(2026, 3, 16, 17, 45)));
        assert!(!schedule.matches(at(2026, 3, 16, 9, 10)));
        assert!(!schedule.matches(at(2026, 3, 16, 8, 0)));
        // Tuesday
        assert!(!schedule.matches(at(2026, 3, 17, 9, 0)));
    }

    #[test]
    fn test_sunday_both_spellings() {
        let zero: CronSchedule = "0 0 * * 0".parse().unwrap();
        let seven: CronSchedule = "0 0 * * 7".parse().unwrap();
        // 2026-03-15 is a Sunday
        assert!(zero.matches(at(2026, 3, 15, 0, 0)));
        assert!(seven.matches(at(2026, 3, 15, 0, 0)));
        assert!(!seven.matches(at(2026, 3, 16, 0, 0)));
    }

    #[test]
    fn test_dom_dow_or_rule() {
        // Fires on the 13th of any month OR on any Friday
        let schedule: CronSchedule = "0 0 13 * 5".parse().unwrap();
        // 2026-03-13 is a Friday: both match
        assert!(schedule.matches(at(2026, 3, 13, 0, 0)));
        // 2026-04-13 is a Monday: dom alone matches
        assert!(schedule.matches(at(2026, 4, 13, 0, 0)));
        // 2026-03-20 is a Friday: dow alone matches
        assert!(schedule.matches(at(2026, 3, 20, 0, 0)));
        assert!(!schedule.matches(at(2026, 3, 14, 0, 0)));
    }

    #[test]
    fn test_next_after_same_day() {
        let schedule: CronSchedule = "0 2 * * *".parse().unwrap();
        assert_eq!(
            schedule.next_after(at(2026, 3, 14, 1, 30)),
            Some(at(2026, 3, 14, 2, 0))
        );
    }

    #[test]
    fn test_next_after_rolls_to_next_day() {
        let schedule: CronSchedule = "0 2 * * *".parse().unwrap();
        assert_eq!(
            schedule.next_after(at(2026, 3, 14, 2, 0)),
            Some(at(2026, 3, 15, 2, 0))
        );
    }

    #[test]
    fn test_next_after_is_strictly_later() {
        let schedule: CronSchedule = "* * * * *".parse().unwrap();
        let now = at(2026, 3, 14, 12, 0);
        assert_eq!(schedule.next_after(now), Some(at(2026, 3, 14, 12, 1)));
    }

    #[test]
    fn test_next_after_leap_day() {
        let schedule: CronSchedule = "0 0 29 2 *".parse().unwrap();
        assert_eq!(
            schedule.next_after(at(2026, 1, 1, 0, 0)),
            Some(at(2028, 2, 29, 0, 0))
        );
    }

    #[test]
    fn test_next_after_impossible_date() {
        let schedule: CronSchedule = "0 0 31 2 *".parse().unwrap();
        assert_eq!(schedule.next_after(at(2026, 1, 1, 0, 0)), None);
    }
}
