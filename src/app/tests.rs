use super::{App, AppError};
use crate::db;
use crate::domain::check_in_type::CheckInType;
use crate::session::TaskRowDraft;
use std::path::PathBuf;
use uuid::Uuid;

fn unique_workspace() -> PathBuf {
    let root = std::env::temp_dir().join(format!("resolute-app-test-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&root).expect("temp workspace should be creatable");
    root
}

fn open_app(root: &PathBuf) -> App {
    let db_path = root.join(".resolute/tracker.sqlite");
    App::open(db_path.to_str().expect("utf8 path")).expect("app should open")
}

fn task_rows(texts: &[&str]) -> Vec<TaskRowDraft> {
    texts
        .iter()
        .map(|text| TaskRowDraft {
            text: text.to_string(),
            ..TaskRowDraft::default()
        })
        .collect()
}

#[test]
fn create_resolution_persists_across_reopen() {
    let root = unique_workspace();

    let created = {
        let mut app = open_app(&root);
        app.create_resolution(
            "Run a marathon",
            Some("Train steadily"),
            Some("2025-10-01"),
            task_rows(&["Buy shoes", "First 5k"]),
        )
        .expect("create should succeed")
    };
    assert_eq!(created.task_total, 2);
    assert_eq!(created.task_done, 0);

    let mut app = open_app(&root);
    let listed = app.list_resolutions(None);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Run a marathon");
    assert_eq!(listed[0].deadline.as_deref(), Some("2025-10-01"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rejected_create_leaves_the_list_unchanged() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let err = app
        .create_resolution("   ", None, None, task_rows(&["a task"]))
        .expect_err("empty name should be rejected");
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(err.to_string(), "Resolution Name is required.");
    assert!(app.list_resolutions(None).is_empty());

    let err = app
        .create_resolution("Goal", None, None, Vec::new())
        .expect_err("missing tasks should be rejected");
    assert_eq!(err.to_string(), "Add at least 1 task.");
    assert!(app.list_resolutions(None).is_empty());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn toggling_a_task_updates_completion_and_persists() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let created = app
        .create_resolution("Goal", None, None, task_rows(&["a", "b"]))
        .expect("create should succeed");
    let detail = app.show_resolution(&created.id).expect("detail");
    let task_id = detail.tasks[0].id.clone();

    let toggled = app
        .toggle_task(&created.id, &task_id)
        .expect("toggle should succeed");
    assert!(toggled.done);

    drop(app);
    let mut app = open_app(&root);
    let listed = app.list_resolutions(None);
    assert_eq!(listed[0].task_done, 1);
    assert_eq!(listed[0].task_completion, 50);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn deleting_a_resolution_leaves_its_check_ins_dangling() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let created = app
        .create_resolution("Goal", None, None, task_rows(&["a"]))
        .expect("create should succeed");
    app.add_check_in(Some("progress"), None, Some(&created.id), false)
        .expect("check-in should succeed");

    app.delete_resolution(&created.id)
        .expect("delete should succeed");
    assert!(app.list_resolutions(None).is_empty());

    let check_ins = app.list_check_ins(None, None, None);
    assert_eq!(check_ins.len(), 1);
    assert_eq!(check_ins[0].resolution_name, "Resolution (deleted)");

    let missing = app.delete_resolution(&created.id);
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn deleting_a_task_detaches_its_notes() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let created = app
        .create_resolution("Goal", None, None, task_rows(&["a"]))
        .expect("create should succeed");
    let task_id = app.show_resolution(&created.id).expect("detail").tasks[0]
        .id
        .clone();

    app.add_note(&created.id, "attached note", Some(&task_id))
        .expect("note should succeed");
    app.delete_task(&created.id, &task_id)
        .expect("delete should succeed");

    let detail = app.show_resolution(&created.id).expect("detail");
    assert!(detail.tasks.is_empty());
    assert_eq!(detail.notes.len(), 1);
    assert_eq!(detail.notes[0].task_label, "General");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn check_in_filters_compose_with_and_semantics() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let created = app
        .create_resolution("Marathon", None, None, task_rows(&["a"]))
        .expect("create should succeed");
    app.add_check_in(Some("foo"), Some(CheckInType::Daily), Some(&created.id), false)
        .expect("check-in should succeed");
    app.add_check_in(Some("foo"), Some(CheckInType::Weekly), Some(&created.id), false)
        .expect("check-in should succeed");
    app.add_check_in(Some("bar"), Some(CheckInType::Daily), None, false)
        .expect("check-in should succeed");

    let matched = app.list_check_ins(None, Some(CheckInType::Daily), Some(&created.id));
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].text, "foo");
    assert_eq!(matched[0].resolution_name, "Marathon");

    let by_name = app.list_check_ins(Some("marathon"), None, None);
    assert_eq!(by_name.len(), 2);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn template_check_in_uses_the_template_body() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let view = app
        .add_check_in(None, Some(CheckInType::Blocked), None, true)
        .expect("template check-in should succeed");
    assert_eq!(view.kind, CheckInType::Blocked);
    assert!(view.text.contains("What are you blocked on?"));

    let err = app.add_check_in(Some("text"), None, None, true);
    assert!(matches!(err, Err(AppError::InvalidArgument(_))));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn stats_reflect_completion_and_nudge_state() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let stats = app.stats();
    assert_eq!(stats.overall.total_goals, 0);
    assert_eq!(stats.days_since_last_check_in, None);
    assert!(!stats.needs_nudge);

    let created = app
        .create_resolution("Goal", None, None, task_rows(&["a"]))
        .expect("create should succeed");
    let task_id = app.show_resolution(&created.id).expect("detail").tasks[0]
        .id
        .clone();
    app.toggle_task(&created.id, &task_id)
        .expect("toggle should succeed");
    app.add_check_in(Some("done for today"), None, None, false)
        .expect("check-in should succeed");

    let stats = app.stats();
    assert_eq!(stats.overall.total_goals, 1);
    assert_eq!(stats.overall.completed_goals, 1);
    assert_eq!(stats.overall.goal_completion, 100);
    assert_eq!(stats.days_since_last_check_in, Some(0));
    assert!(!stats.needs_nudge);
    assert_eq!(
        stats.latest_check_in.expect("latest").text,
        "done for today"
    );

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn legacy_document_is_migrated_on_open() {
    let root = unique_workspace();
    let db_path = root.join(".resolute/tracker.sqlite");
    std::fs::create_dir_all(db_path.parent().expect("db path has a parent"))
        .expect("db dir should be creatable");
    let raw_path = db_path.to_str().expect("utf8 path");

    {
        let conn = db::open_connection(raw_path).expect("db should open");
        db::set_slot(
            &conn,
            "resolution-tracker:v9",
            r#"{
                "resolutions": [{
                    "id": "r1",
                    "name": "Carried over",
                    "description": "",
                    "tasks": [],
                    "notes": [],
                    "createdAt": "2024-01-01T00:00:00Z"
                }],
                "checkIns": [{"id": 1}]
            }"#,
        )
        .expect("seed should succeed");
    }

    let mut app = App::open(raw_path).expect("app should open");
    let listed = app.list_resolutions(None);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Carried over");

    let check_ins = app.list_check_ins(None, None, None);
    assert_eq!(check_ins.len(), 1);
    assert_eq!(check_ins[0].id, "1");
    assert_eq!(check_ins[0].kind, CheckInType::Daily);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn edit_commands_require_a_field_and_apply_atomically() {
    let root = unique_workspace();
    let mut app = open_app(&root);

    let created = app
        .create_resolution("Old", Some("desc"), None, task_rows(&["a"]))
        .expect("create should succeed");

    let err = app.edit_resolution(&created.id, None, None);
    assert!(matches!(err, Err(AppError::InvalidArgument(_))));

    let updated = app
        .edit_resolution(&created.id, Some("New".to_string()), None)
        .expect("edit should succeed");
    assert_eq!(updated.name, "New");
    assert_eq!(updated.description, "desc");

    let err = app
        .edit_resolution(&created.id, Some("   ".to_string()), None)
        .expect_err("empty name should be rejected");
    assert_eq!(err.to_string(), "Resolution name can't be empty.");
    assert_eq!(app.list_resolutions(None)[0].name, "New");

    let _ = std::fs::remove_dir_all(root);
}
