//! Calendar expression parsing and evaluation.
//!
//! Six whitespace-separated fields, evaluated in local wall-clock time:
//! ```text
//! ┌───────────── second (0-59)
//! │ ┌───────────── minute (0-59)
//! │ │ ┌───────────── hour (0-23)
//! │ │ │ ┌───────────── day of month (1-31)
//! │ │ │ │ ┌───────────── month (1-12)
//! │ │ │ │ │ ┌───────────── day of week (0-7, 0 and 7 = Sunday)
//! │ │ │ │ │ │
//! 0 0 3 2 1 ?
//! ```
//!
//! `?` is accepted in the two day fields and means "no specific value".

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::errors::{ExError, ExErrorKind};

/// Longest stretch searched for a match. Eight years covers a 29 February
/// schedule across a skipped century leap year.
const MAX_SEARCH_DAYS: u32 = 8 * 366;

/// Errors that can occur when parsing calendar expressions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronParseError {
    #[error("Invalid calendar expression: expected 6 fields, got {0}")]
    InvalidFieldCount(usize),
    #[error("Invalid {field} field '{expr}': {reason}")]
    InvalidField {
        field: &'static str,
        expr: String,
        reason: String,
    },
    #[error("Value {value} is out of range [{min}, {max}] for {field}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("Invalid range in {field}: {start}-{end}")]
    InvalidRange {
        field: &'static str,
        start: u32,
        end: u32,
    },
    #[error("Invalid step in {field}: '{step}'")]
    InvalidStep { field: &'static str, step: String },
}

impl From<CronParseError> for ExError {
    fn from(err: CronParseError) -> Self {
        ExError::new(ExErrorKind::InvalidSchedule)
            .with_op("schedule_parse")
            .with_message(err.to_string())
    }
}

/// A single field in a calendar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronField {
    name: &'static str,
    /// The set of valid values for this field.
    values: BTreeSet<u32>,
    min: u32,
    max: u32,
    /// True when written as `*` or `?`.
    unrestricted: bool,
}

impl CronField {
    fn new(name: &'static str, min: u32, max: u32) -> Self {
        Self {
            name,
            values: BTreeSet::new(),
            min,
            max,
            unrestricted: false,
        }
    }

    fn parse(mut self, expr: &str, allow_question: bool) -> Result<Self, CronParseError> {
        if expr == "?" {
            if !allow_question {
                return Err(CronParseError::InvalidField {
                    field: self.name,
                    expr: expr.to_string(),
                    reason: "'?' is only allowed in day-of-month and day-of-week".to_string(),
                });
            }
            self.unrestricted = true;
            self.values = (self.min..=self.max).collect();
            return Ok(self);
        }

        if expr == "*" {
            self.unrestricted = true;
        }

        for part in expr.split(',') {
            self.parse_part(part.trim())?;
        }
        Ok(self)
    }

    fn parse_part(&mut self, part: &str) -> Result<(), CronParseError> {
        // Step values: */5, 0-30/5, 10/15
        let (range_part, step) = match part.split_once('/') {
            Some((range, step_str)) => {
                let step = step_str
                    .parse::<u32>()
                    .map_err(|_| CronParseError::InvalidStep {
                        field: self.name,
                        step: step_str.to_string(),
                    })?;
                if step == 0 {
                    return Err(CronParseError::InvalidStep {
                        field: self.name,
                        step: "0".to_string(),
                    });
                }
                (range, Some(step))
            }
            None => (part, None),
        };

        let (start, end) = if range_part == "*" {
            (self.min, self.max)
        } else if let Some((lo, hi)) = range_part.split_once('-') {
            let start = self.parse_value(lo)?;
            let end = self.parse_value(hi)?;
            if start > end {
                return Err(CronParseError::InvalidRange {
                    field: self.name,
                    start,
                    end,
                });
            }
            (start, end)
        } else {
            let value = self.parse_value(range_part)?;
            // "10/15" means starting at 10, every 15 up to max
            if step.is_some() {
                (value, self.max)
            } else {
                (value, value)
            }
        };

        for bound in [start, end] {
            if bound < self.min || bound > self.max {
                return Err(CronParseError::OutOfRange {
                    field: self.name,
                    value: bound,
                    min: self.min,
                    max: self.max,
                });
            }
        }

        let step = step.unwrap_or(1);
        let mut value = start;
        while value <= end {
            self.values.insert(value);
            match value.checked_add(step) {
                Some(next) => value = next,
                None => break,
            }
        }

        Ok(())
    }

    fn parse_value(&self, raw: &str) -> Result<u32, CronParseError> {
        raw.parse::<u32>()
            .map_err(|_| CronParseError::InvalidField {
                field: self.name,
                expr: raw.to_string(),
                reason: "not a number".to_string(),
            })
    }

    /// Check if a value matches this field.
    pub fn matches(&self, value: u32) -> bool {
        self.values.contains(&value)
    }

    /// Get the next matching value >= given value.
    pub fn next(&self, value: u32) -> Option<u32> {
        self.values.range(value..).next().copied()
    }

    /// Whether the field was written as `*` or `?`.
    pub fn is_unrestricted(&self) -> bool {
        self.unrestricted
    }

    /// Number of matching values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A parsed calendar expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronExpr {
    expr: String,
    pub second: CronField,
    pub minute: CronField,
    pub hour: CronField,
    pub day_of_month: CronField,
    pub month: CronField,
    pub day_of_week: CronField,
}

impl CronExpr {
    /// Parse a calendar expression string.
    pub fn parse(expr: &str) -> Result<Self, CronParseError> {
        let parts: Vec<&str> = expr.split_whitespace().collect();
        if parts.len() != 6 {
            return Err(CronParseError::InvalidFieldCount(parts.len()));
        }

        let second = CronField::new("second", 0, 59).parse(parts[0], false)?;
        let minute = CronField::new("minute", 0, 59).parse(parts[1], false)?;
        let hour = CronField::new("hour", 0, 23).parse(parts[2], false)?;
        let day_of_month = CronField::new("day-of-month", 1, 31).parse(parts[3], true)?;
        let month = CronField::new("month", 1, 12).parse(parts[4], false)?;
        let mut day_of_week = CronField::new("day-of-week", 0, 7).parse(parts[5], true)?;

        // Fold 7 onto 0 so Sunday has a single representation
        if day_of_week.values.remove(&7) {
            day_of_week.values.insert(0);
        }

        Ok(Self {
            expr: parts.join(" "),
            second,
            minute,
            hour,
            day_of_month,
            month,
            day_of_week,
        })
    }

    /// The normalized expression text.
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Check if a local datetime matches this expression.
    pub fn matches(&self, dt: &NaiveDateTime) -> bool {
        self.second.matches(dt.second())
            && self.minute.matches(dt.minute())
            && self.hour.matches(dt.hour())
            && self.month.matches(dt.month())
            && self.day_matches(dt.date())
    }

    /// Day-of-month and day-of-week combine with OR when both are restricted,
    /// otherwise the restricted one (if any) decides.
    fn day_matches(&self, date: NaiveDate) -> bool {
        let dom = self.day_of_month.matches(date.day());
        let dow = self
            .day_of_week
            .matches(date.weekday().num_days_from_sunday());

        match (
            self.day_of_month.is_unrestricted(),
            self.day_of_week.is_unrestricted(),
        ) {
            (false, false) => dom || dow,
            (false, true) => dom,
            (true, false) => dow,
            (true, true) => true,
        }
    }

    /// First matching time strictly after `after`, or `None` if the
    /// expression cannot match (e.g. 30 February).
    pub fn next_after(&self, after: &NaiveDateTime) -> Option<NaiveDateTime> {
        let start = crate::clock::truncate_to_second(*after) + chrono::Duration::seconds(1);

        let mut date = start.date();
        let mut floor = Some(start.time());

        for _ in 0..MAX_SEARCH_DAYS {
            if self.month.matches(date.month()) && self.day_matches(date) {
                let from = floor.unwrap_or(NaiveTime::MIN);
                if let Some(time) = self.first_time_from(from) {
                    return Some(date.and_time(time));
                }
            }
            date = date.succ_opt()?;
            floor = None;
        }

        None
    }

    /// Iterate over the next `count` occurrences after `after`.
    pub fn upcoming(&self, after: &NaiveDateTime, count: usize) -> Vec<NaiveDateTime> {
        let mut out = Vec::with_capacity(count);
        let mut cursor = *after;
        while out.len() < count {
            match self.next_after(&cursor) {
                Some(next) => {
                    out.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        out
    }

    fn first_time_from(&self, from: NaiveTime) -> Option<NaiveTime> {
        for &h in self.hour.values.range(from.hour()..) {
            let same_hour = h == from.hour();
            let min_floor = if same_hour { from.minute() } else { 0 };

            for &m in self.minute.values.range(min_floor..) {
                let same_minute = same_hour && m == from.minute();
                let sec_floor = if same_minute { from.second() } else { 0 };

                if let Some(s) = self.second.next(sec_floor) {
                    return NaiveTime::from_hms_opt(h, m, s);
                }
            }
        }
        None
    }
}

impl FromStr for CronExpr {
    type Err = CronParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CronExpr::parse(s)
    }
}

impl fmt::Display for CronExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}
