// src/comparator.rs - Number, size and date comparison expressions used by filters
use crate::error::{FsError, Result};
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Operator {
    fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_lowercase().as_str() {
            "" | "==" => Operator::Eq,
            "!=" => Operator::Ne,
            "<" | "until" | "before" => Operator::Lt,
            "<=" => Operator::Le,
            ">" | "since" | "after" => Operator::Gt,
            ">=" => Operator::Ge,
            _ => return None,
        })
    }

    pub fn holds<T: Ord>(self, value: T, target: T) -> bool {
        match self {
            Operator::Eq => value == target,
            Operator::Ne => value != target,
            Operator::Lt => value < target,
            Operator::Le => value <= target,
            Operator::Gt => value > target,
            Operator::Ge => value >= target,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
        }
    }
}

/// A numeric test such as `> 10K`, `<= 2` or a bare `3` (meaning `== 3`).
///
/// Suffixes `k`, `m`, `g` scale by powers of 1000; `ki`, `mi`, `gi` by
/// powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberComparison {
    op: Operator,
    target: u64,
}

impl NumberComparison {
    pub fn new(op: Operator, target: u64) -> Self {
        Self { op, target }
    }

    pub fn test(&self, value: u64) -> bool {
        self.op.holds(value, self.target)
    }

    pub fn operator(&self) -> Operator {
        self.op
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Inclusive (min, max) bounds this comparison puts on a depth value.
    /// `!=` cannot be expressed as bounds and yields neither.
    pub fn depth_bounds(&self) -> (Option<usize>, Option<usize>) {
        let t = usize::try_from(self.target).unwrap_or(usize::MAX);
        match self.op {
            Operator::Eq => (Some(t), Some(t)),
            Operator::Ne => (None, None),
            // `< 0` matches nothing; the filter check rejects every entry.
            Operator::Lt => (None, Some(t.saturating_sub(1))),
            Operator::Le => (None, Some(t)),
            Operator::Gt => (Some(t.saturating_add(1)), None),
            Operator::Ge => (Some(t), None),
        }
    }
}

impl FromStr for NumberComparison {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)^\s*(==|!=|[<>]=?)?\s*([0-9]+(?:\.[0-9]+)?)\s*([kmg]i?)?\s*$")
                .expect("number comparison regex is valid")
        });
        let caps = re
            .captures(s)
            .ok_or_else(|| FsError::InvalidComparison(s.to_owned()))?;
        let op = Operator::parse(caps.get(1).map_or("", |m| m.as_str()))
            .ok_or_else(|| FsError::InvalidComparison(s.to_owned()))?;
        let scale: u64 = match caps.get(3).map(|m| m.as_str().to_ascii_lowercase()) {
            None => 1,
            Some(unit) => match unit.as_str() {
                "k" => 1_000,
                "ki" => 1 << 10,
                "m" => 1_000_000,
                "mi" => 1 << 20,
                "g" => 1_000_000_000,
                "gi" => 1 << 30,
                _ => return Err(FsError::InvalidComparison(s.to_owned())),
            },
        };
        let digits = &caps[2];
        let target = if digits.contains('.') {
            let number: f64 = digits
                .parse()
                .map_err(|_| FsError::InvalidComparison(s.to_owned()))?;
            (number * scale as f64) as u64
        } else {
            // Only digits reach here, so parsing fails on overflow alone.
            digits
                .parse::<u64>()
                .unwrap_or(u64::MAX)
                .saturating_mul(scale)
        };
        Ok(Self::new(op, target))
    }
}

impl From<u64> for NumberComparison {
    fn from(target: u64) -> Self {
        Self::new(Operator::Eq, target)
    }
}

impl fmt::Display for NumberComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.op.symbol(), self.target)
    }
}

/// A modification-time test such as `since yesterday`, `< 2024-01-01` or
/// `> 3 days ago`. Compared at one-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateComparison {
    op: Operator,
    target: i64,
}

impl DateComparison {
    pub fn new(op: Operator, target: DateTime<Local>) -> Self {
        Self {
            op,
            target: target.timestamp(),
        }
    }

    pub fn test(&self, value: DateTime<Local>) -> bool {
        self.op.holds(value.timestamp(), self.target)
    }
}

impl FromStr for DateComparison {
    type Err = FsError;

    fn from_str(s: &str) -> Result<Self> {
        static RE: OnceLock<Regex> = OnceLock::new();
        let re = RE.get_or_init(|| {
            Regex::new(r"(?i)^\s*(==|<=|>=|<|>|!=|since|after|until|before)?\s*(.+?)\s*$")
                .expect("date comparison regex is valid")
        });
        let caps = re
            .captures(s)
            .ok_or_else(|| FsError::InvalidComparison(s.to_owned()))?;
        let op = Operator::parse(caps.get(1).map_or("", |m| m.as_str()))
            .ok_or_else(|| FsError::InvalidComparison(s.to_owned()))?;
        let target = parse_date(&caps[2]).ok_or_else(|| FsError::InvalidComparison(s.to_owned()))?;
        Ok(Self::new(op, target))
    }
}

fn parse_date(s: &str) -> Option<DateTime<Local>> {
    let now = Local::now();
    let midnight = |date: NaiveDate| {
        date.and_hms_opt(0, 0, 0)
            .and_then(|naive| Local.from_local_datetime(&naive).earliest())
    };
    match s.to_ascii_lowercase().as_str() {
        "now" => return Some(now),
        "today" => return midnight(now.date_naive()),
        "yesterday" => return midnight(now.date_naive().pred_opt()?),
        "tomorrow" => return midnight(now.date_naive().succ_opt()?),
        _ => {}
    }
    if let Some(ago) = parse_ago(s) {
        return now.checked_sub_signed(ago);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&naive).earliest();
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().and_then(midnight)
}

// "3 days ago", "1 hour ago"
fn parse_ago(s: &str) -> Option<Duration> {
    let mut parts = s.split_whitespace();
    let count: i64 = parts.next()?.parse().ok()?;
    let unit = parts.next()?.to_ascii_lowercase();
    if !parts.next()?.eq_ignore_ascii_case("ago") || parts.next().is_some() {
        return None;
    }
    match unit.trim_end_matches('s') {
        "second" | "sec" => Duration::try_seconds(count),
        "minute" | "min" => Duration::try_minutes(count),
        "hour" => Duration::try_hours(count),
        "day" => Duration::try_days(count),
        "week" => Duration::try_weeks(count),
        _ => None,
    }
}
