//! Time-of-day rendering for event timestamps
//!
//! The zone is an explicit parameter so rendering is deterministic when the
//! caller asks for `utc` or a fixed offset; `local` follows the host clock.

use super::content::is_truthy;
use crate::util::escape_html;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Utc};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const TIME_OF_DAY: &str = "%H:%M:%S";

/// Time zone used to display event timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayZone {
    Utc,
    /// Host time zone
    #[default]
    Local,
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Render a raw `timestamp` field as a time of day
    ///
    /// Returns `None` when the field carries nothing: any falsy value (`null`,
    /// `false`, `0`, `""`) or a blank string. A value that cannot be read as a
    /// point in time is shown verbatim, escaped.
    pub fn format_time_of_day(&self, raw: &Value) -> Option<String> {
        if !is_truthy(Some(raw)) {
            return None;
        }
        let instant = match raw {
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => parse_timestamp(s.trim()),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|millis| millis as i64))
                .and_then(DateTime::from_timestamp_millis),
            _ => None,
        };

        Some(match instant {
            Some(instant) => self.render(instant),
            None => match raw {
                Value::String(s) => escape_html(s),
                other => escape_html(&other.to_string()),
            },
        })
    }

    fn render(&self, instant: DateTime<Utc>) -> String {
        match self {
            Self::Utc => instant.format(TIME_OF_DAY).to_string(),
            Self::Local => instant.with_timezone(&Local).format(TIME_OF_DAY).to_string(),
            Self::Fixed(offset) => instant.with_timezone(offset).format(TIME_OF_DAY).to_string(),
        }
    }
}

/// Accepts RFC 3339 and the common zone-less forms (read as UTC)
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .map(|naive| naive.and_utc())
}

impl FromStr for DisplayZone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "utc" | "z" => return Ok(Self::Utc),
            "local" => return Ok(Self::Local),
            _ => {}
        }

        parse_offset(s)
            .map(Self::Fixed)
            .ok_or_else(|| format!("invalid time zone '{}' (use utc, local or +HH:MM)", s))
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `+HHMM`
fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

impl fmt::Display for DisplayZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utc => f.write_str("utc"),
            Self::Local => f.write_str("local"),
            Self::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}
