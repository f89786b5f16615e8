use super::{load, save, STORAGE_KEY};
use crate::db;
use crate::domain::check_in_type::CheckInType;
use crate::domain::model::{CheckIn, Resolution, Task, TrackerState};
use rusqlite::Connection;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

fn open_memory_db() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory db should open");
    conn.execute_batch(
        "CREATE TABLE slot (key TEXT PRIMARY KEY, value TEXT NOT NULL);
         CREATE TABLE meta (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
    )
    .expect("schema should apply");
    conn
}

fn sample_state() -> TrackerState {
    TrackerState {
        resolutions: vec![Resolution {
            id: "r1".to_string(),
            name: "Read more".to_string(),
            description: String::new(),
            deadline: None,
            tasks: vec![Task {
                id: "t1".to_string(),
                text: "Pick a book".to_string(),
                done: true,
                deadline: None,
                details: None,
            }],
            notes: Vec::new(),
            priority: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }],
        check_ins: vec![CheckIn {
            id: "c1".to_string(),
            created_at: "2025-01-02T00:00:00Z".to_string(),
            text: "Started".to_string(),
            resolution_id: Some("r1".to_string()),
            kind: CheckInType::Daily,
        }],
    }
}

#[test]
fn load_returns_empty_state_when_nothing_is_stored() {
    let conn = open_memory_db();
    let state = load(&conn).expect("load should succeed");
    assert_eq!(state, TrackerState::default());
}

#[test]
fn save_then_load_round_trips() {
    let conn = open_memory_db();
    let state = sample_state();

    save(&conn, &state).expect("save should succeed");
    let loaded = load(&conn).expect("load should succeed");

    assert_eq!(loaded, state);
}

#[test]
fn malformed_current_document_reads_as_empty() {
    let conn = open_memory_db();
    db::set_slot(&conn, STORAGE_KEY, "{not json").expect("set should succeed");

    let state = load(&conn).expect("load should succeed");
    assert_eq!(state, TrackerState::default());
}

#[test]
fn current_document_with_missing_lists_defaults_them() {
    let conn = open_memory_db();
    db::set_slot(&conn, STORAGE_KEY, "{}").expect("set should succeed");

    let state = load(&conn).expect("load should succeed");
    assert!(state.resolutions.is_empty());
    assert!(state.check_ins.is_empty());
}

#[test]
fn legacy_check_ins_are_coerced_field_by_field() {
    let conn = open_memory_db();
    db::set_slot(
        &conn,
        "resolution-tracker:v9",
        r#"{
            "resolutions": [{
                "id": "r1",
                "name": "Old goal",
                "description": "",
                "tasks": [],
                "notes": [],
                "createdAt": "2024-06-01T00:00:00Z"
            }],
            "checkIns": [{"id": 42, "resolutionId": 7}]
        }"#,
    )
    .expect("set should succeed");

    let state = load(&conn).expect("load should succeed");

    assert_eq!(state.resolutions.len(), 1);
    assert_eq!(state.resolutions[0].id, "r1");
    assert_eq!(state.resolutions[0].name, "Old goal");

    let check_in = &state.check_ins[0];
    assert_eq!(check_in.id, "42");
    assert_eq!(check_in.resolution_id.as_deref(), Some("7"));
    assert_eq!(check_in.kind, CheckInType::Daily);
    assert_eq!(check_in.text, "");
    assert!(
        OffsetDateTime::parse(&check_in.created_at, &Rfc3339).is_ok(),
        "missing createdAt should default to a valid timestamp"
    );
}

#[test]
fn v9_wins_over_v8_when_both_are_present() {
    let conn = open_memory_db();
    db::set_slot(
        &conn,
        "resolution-tracker:v9",
        r#"{"resolutions": [], "checkIns": [{"id": "from-v9", "text": "nine"}]}"#,
    )
    .expect("set should succeed");
    db::set_slot(
        &conn,
        "resolution-tracker:v8",
        r#"{"resolutions": [], "checkIns": [{"id": "from-v8", "text": "eight"}]}"#,
    )
    .expect("set should succeed");

    let state = load(&conn).expect("load should succeed");
    assert_eq!(state.check_ins[0].id, "from-v9");
}

#[test]
fn current_key_short_circuits_the_legacy_chain() {
    let conn = open_memory_db();
    save(&conn, &TrackerState::default()).expect("save should succeed");
    db::set_slot(
        &conn,
        "resolution-tracker:v9",
        r#"{"resolutions": [], "checkIns": [{"id": "legacy"}]}"#,
    )
    .expect("set should succeed");

    let state = load(&conn).expect("load should succeed");
    assert!(state.check_ins.is_empty());
}

#[test]
fn malformed_legacy_source_falls_through_to_the_next_one() {
    let conn = open_memory_db();
    db::set_slot(&conn, "resolution-tracker:v9", "[1, 2, 3]").expect("set should succeed");
    db::set_slot(
        &conn,
        "resolution-tracker:v8",
        r#"{"checkIns": [{"id": "v8", "text": "still here", "type": "Win"}]}"#,
    )
    .expect("set should succeed");

    let state = load(&conn).expect("load should succeed");
    assert_eq!(state.check_ins.len(), 1);
    assert_eq!(state.check_ins[0].id, "v8");
    assert_eq!(state.check_ins[0].kind, CheckInType::Win);
}

#[test]
fn migration_is_not_written_back_until_the_next_save() {
    let conn = open_memory_db();
    db::set_slot(
        &conn,
        "resolution-tracker:v9",
        r#"{"resolutions": [], "checkIns": [{"id": "c1", "text": "hello"}]}"#,
    )
    .expect("set should succeed");

    let migrated = load(&conn).expect("load should succeed");
    assert_eq!(
        db::get_slot(&conn, STORAGE_KEY).expect("get should succeed"),
        None
    );

    save(&conn, &migrated).expect("save should succeed");
    let raw = db::get_slot(&conn, STORAGE_KEY)
        .expect("get should succeed")
        .expect("current key should now exist");
    assert!(raw.contains("\"c1\""));
}
