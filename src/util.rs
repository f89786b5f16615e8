use time::format_description::well_known::Rfc3339;
use time::{format_description, OffsetDateTime};

pub fn now_utc_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .expect("RFC3339 formatting for UTC timestamp should never fail")
}

/// Rounded percentage, 0 when the denominator is 0.
pub fn pct(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u32
}

pub fn days_since(iso: &str) -> Option<i64> {
    days_since_at(iso, OffsetDateTime::now_utc())
}

/// Whole days between `iso` and `now`, clamped to >= 0. None when the
/// timestamp does not parse.
pub fn days_since_at(iso: &str, now: OffsetDateTime) -> Option<i64> {
    let then = OffsetDateTime::parse(iso, &Rfc3339).ok()?;
    Some((now - then).whole_days().max(0))
}

/// Human display for stored RFC3339 timestamps. Falls back to the raw string
/// rather than failing on malformed input.
pub fn format_date_time(iso: &str) -> String {
    let Ok(parsed) = OffsetDateTime::parse(iso, &Rfc3339) else {
        return iso.to_string();
    };
    let Ok(display) = format_description::parse("[year]-[month]-[day] [hour]:[minute]") else {
        return iso.to_string();
    };
    parsed.format(&display).unwrap_or_else(|_| iso.to_string())
}

pub fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
