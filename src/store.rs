use rusqlite::Connection;
use serde_json::Value;

use crate::db;
use crate::domain::model::{CheckIn, TrackerState};
use crate::util::now_utc_rfc3339;

/// Current-version document key. Preserved verbatim from the data this tool
/// migrates, including the two legacy generations below.
pub const STORAGE_KEY: &str = "resolution-tracker:v10";

struct LegacySource {
    key: &'static str,
    migrate: fn(&Value) -> Option<TrackerState>,
}

/// Most-recent-legacy first; the first structurally valid result wins.
const LEGACY_SOURCES: [LegacySource; 2] = [
    LegacySource {
        key: "resolution-tracker:v9",
        migrate: migrate_v9,
    },
    LegacySource {
        key: "resolution-tracker:v8",
        migrate: migrate_v8,
    },
];

/// Read the whole tracker document. A malformed document is treated as an
/// absent one: the loader falls through the legacy chain and ultimately to
/// the empty state, never to the caller as an error.
pub fn load(conn: &Connection) -> rusqlite::Result<TrackerState> {
    if let Some(raw) = db::get_slot(conn, STORAGE_KEY)? {
        if let Some(state) = safe_parse(&raw) {
            return Ok(state);
        }
    }

    for source in &LEGACY_SOURCES {
        let Some(raw) = db::get_slot(conn, source.key)? else {
            continue;
        };
        let Some(document) = safe_parse_value(&raw) else {
            continue;
        };
        if let Some(state) = (source.migrate)(&document) {
            return Ok(state);
        }
    }

    Ok(TrackerState::default())
}

/// Serialize the whole aggregate under the current-version key, overwriting
/// unconditionally. Migrated legacy data is only persisted here, on the next
/// natural save.
pub fn save(conn: &Connection, state: &TrackerState) -> rusqlite::Result<()> {
    let raw = serde_json::to_string(state).expect("tracker state serialization should work");
    db::set_slot(conn, STORAGE_KEY, &raw)
}

fn safe_parse(raw: &str) -> Option<TrackerState> {
    serde_json::from_str(raw).ok()
}

fn safe_parse_value(raw: &str) -> Option<Value> {
    serde_json::from_str(raw).ok()
}

fn migrate_v9(document: &Value) -> Option<TrackerState> {
    coerce_legacy_document(document)
}

// v8 documents share the v9 shape; only the key generation differs.
fn migrate_v8(document: &Value) -> Option<TrackerState> {
    coerce_legacy_document(document)
}

/// Legacy resolutions pass through unchanged; legacy check-in records are
/// coerced field-by-field.
fn coerce_legacy_document(document: &Value) -> Option<TrackerState> {
    let map = document.as_object()?;

    let resolutions = match map.get("resolutions") {
        Some(value) => serde_json::from_value(value.clone()).ok()?,
        None => Vec::new(),
    };

    let check_ins = match map.get("checkIns").and_then(Value::as_array) {
        Some(items) => items.iter().map(coerce_legacy_check_in).collect(),
        None => Vec::new(),
    };

    Some(TrackerState {
        resolutions,
        check_ins,
    })
}

fn coerce_legacy_check_in(raw: &Value) -> CheckIn {
    let created_at = raw
        .get("createdAt")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(now_utc_rfc3339);

    let resolution_id = raw
        .get("resolutionId")
        .map(stringify)
        .filter(|id| !id.is_empty());

    let kind = raw
        .get("type")
        .and_then(Value::as_str)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();

    CheckIn {
        id: raw.get("id").map(stringify).unwrap_or_default(),
        created_at,
        text: raw
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        resolution_id,
        kind,
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests;
