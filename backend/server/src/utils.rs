use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn normalize_reg_number(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Trimmed, inner whitespace collapsed, lowercased. Used for case-insensitive
/// identity comparison only, never stored.
pub fn normalize_identity(input: &str) -> String {
    WHITESPACE
        .replace_all(input.trim(), " ")
        .into_owned()
        .to_lowercase()
}

pub fn identities_match(claimed: &str, official: &str) -> bool {
    normalize_identity(claimed) == normalize_identity(official)
}

/// RFC 3339, or a naive timestamp taken as UTC.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(deadline) = DateTime::parse_from_rfc3339(raw) {
        return Some(deadline.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

pub fn is_past(deadline: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    deadline.is_some_and(|deadline| now > deadline)
}

/// `votes / total * 100` rounded to one decimal, `0.0` for an empty total.
pub fn percentage(votes: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    (votes as f64 / total as f64 * 1000.0).round() / 10.0
}
