use chrono::{NaiveTime, TimeDelta};
use regex::Regex;

/// Countdown widget text: `H:MM:SS`, `.` accepted as separator.
const TIMER_PATTERN: &str = r"([0-3])[:.]([0-5][0-9])[:.]([0-5][0-9])";

/// Status bar clock: `H:MM` or `HH:MM`.
const CLOCK_PATTERN: &str = r"([0-2]?[0-9]):([0-5][0-9])";

/// Parses the first countdown found in OCR text.
pub fn parse_timer(text: &str) -> Option<TimeDelta> {
    let timer_regex = Regex::new(TIMER_PATTERN).ok()?;
    let caps = timer_regex.captures(text)?;

    let hours: i64 = caps[1].parse().ok()?;
    let minutes: i64 = caps[2].parse().ok()?;
    let seconds: i64 = caps[3].parse().ok()?;

    Some(TimeDelta::seconds(hours * 3600 + minutes * 60 + seconds))
}

/// Parses the first wall-clock time found in OCR text.
///
/// Only the first match is considered; an hour of 24 or more makes the
/// whole text unreadable.
pub fn parse_clock(text: &str) -> Option<NaiveTime> {
    let clock_regex = Regex::new(CLOCK_PATTERN).ok()?;
    let caps = clock_regex.captures(text)?;

    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;

    NaiveTime::from_hms_opt(hours, minutes, 0)
}

/// Flattens OCR output to a single line: trims it, turns newlines into
/// spaces and collapses runs of whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
