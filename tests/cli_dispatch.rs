use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use uuid::Uuid;

fn unique_workspace(prefix: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("{prefix}-{}", Uuid::now_v7()));
    std::fs::create_dir_all(&path).expect("workspace should be creatable");
    path
}

fn run_reso(db_path: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_reso"))
        .arg("-d")
        .arg(db_path)
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("reso should run")
}

fn run_ok(db_path: &Path, args: &[&str]) -> String {
    let output = run_reso(db_path, args);
    assert!(
        output.status.success(),
        "reso {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be utf8")
}

fn json_ok(db_path: &Path, args: &[&str]) -> Value {
    serde_json::from_str(&run_ok(db_path, args)).expect("output should be json")
}

#[test]
fn create_list_show_round_trip() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(
        &db,
        &[
            "new",
            "Run a marathon",
            "--desc",
            "Train steadily",
            "--deadline",
            "2025-10-01",
            "-t",
            "Buy shoes",
            "-t",
            "First 5k",
        ],
    );

    let listed = json_ok(&db, &["ls", "--json"]);
    let resolutions = listed.as_array().expect("array");
    assert_eq!(resolutions.len(), 1);
    assert_eq!(resolutions[0]["name"], "Run a marathon");
    assert_eq!(resolutions[0]["taskTotal"], 2);
    assert_eq!(resolutions[0]["taskDone"], 0);
    assert_eq!(resolutions[0]["nextTask"]["text"], "Buy shoes");

    let id = resolutions[0]["id"].as_str().expect("id").to_string();
    let detail = json_ok(&db, &["show", &id, "--json"]);
    assert_eq!(detail["tasks"].as_array().expect("tasks").len(), 2);
    assert_eq!(detail["deadline"], "2025-10-01");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn task_toggle_moves_completion_and_next_task() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(&db, &["new", "Goal", "-t", "first", "-t", "second"]);
    let listed = json_ok(&db, &["ls", "--json"]);
    let res_id = listed[0]["id"].as_str().expect("id").to_string();
    let detail = json_ok(&db, &["show", &res_id, "--json"]);
    let first_task = detail["tasks"][0]["id"].as_str().expect("task id").to_string();

    let toggled = run_ok(&db, &["task", "toggle", &res_id, &first_task]);
    assert!(toggled.starts_with("[x]"));

    let listed = json_ok(&db, &["ls", "--json"]);
    assert_eq!(listed[0]["taskDone"], 1);
    assert_eq!(listed[0]["taskCompletion"], 50);
    assert_eq!(listed[0]["nextTask"]["text"], "second");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn check_in_flow_with_filters_and_stats() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(&db, &["new", "Marathon", "-t", "train"]);
    let listed = json_ok(&db, &["ls", "--json"]);
    let res_id = listed[0]["id"].as_str().expect("id").to_string();

    run_ok(
        &db,
        &["checkin", "new", "went for a run", "-t", "daily", "-r", &res_id],
    );
    run_ok(&db, &["checkin", "new", "weekly recap", "-t", "weekly"]);

    let all = json_ok(&db, &["checkin", "ls", "--json"]);
    assert_eq!(all.as_array().expect("array").len(), 2);
    // newest first
    assert_eq!(all[0]["text"], "weekly recap");

    let filtered = json_ok(&db, &["checkin", "ls", "--json", "-t", "daily", "-r", &res_id]);
    let filtered = filtered.as_array().expect("array");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["resolutionName"], "Marathon");

    let stats = json_ok(&db, &["stats", "--json"]);
    assert_eq!(stats["overall"]["totalGoals"], 1);
    assert_eq!(stats["daysSinceLastCheckIn"], 0);
    assert_eq!(stats["needsNudge"], false);
    assert_eq!(stats["latestCheckIn"]["text"], "weekly recap");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn validation_failures_exit_nonzero_and_change_nothing() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    let output = run_reso(&db, &["new", "   ", "-t", "a task"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Resolution Name is required."));

    let output = run_reso(&db, &["new", "Goal"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Add at least 1 task."));

    let listed = json_ok(&db, &["ls", "--json"]);
    assert!(listed.as_array().expect("array").is_empty());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn rm_with_yes_cascades_but_keeps_check_ins() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(&db, &["new", "Goal", "-t", "a"]);
    let listed = json_ok(&db, &["ls", "--json"]);
    let res_id = listed[0]["id"].as_str().expect("id").to_string();
    run_ok(&db, &["checkin", "new", "progress", "-r", &res_id]);

    run_ok(&db, &["rm", &res_id, "-y"]);

    let listed = json_ok(&db, &["ls", "--json"]);
    assert!(listed.as_array().expect("array").is_empty());

    let check_ins = json_ok(&db, &["checkin", "ls", "--json"]);
    assert_eq!(check_ins[0]["resolutionName"], "Resolution (deleted)");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn template_command_prints_the_template_body() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    let body = run_ok(&db, &["checkin", "template", "blocked"]);
    assert!(body.contains("What are you blocked on?"));

    let output = run_reso(&db, &["checkin", "template", "monthly"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid check-in type"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn template_check_in_uses_the_template_text() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(&db, &["checkin", "new", "-t", "win", "--template"]);
    let check_ins = json_ok(&db, &["checkin", "ls", "--json"]);
    assert_eq!(check_ins[0]["type"], "Win");
    assert!(check_ins[0]["text"]
        .as_str()
        .expect("text")
        .contains("What did you accomplish?"));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn notes_detach_when_their_task_is_deleted() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    run_ok(&db, &["new", "Goal", "-t", "a", "-t", "b"]);
    let listed = json_ok(&db, &["ls", "--json"]);
    let res_id = listed[0]["id"].as_str().expect("id").to_string();
    let detail = json_ok(&db, &["show", &res_id, "--json"]);
    let task_id = detail["tasks"][0]["id"].as_str().expect("task id").to_string();

    run_ok(&db, &["note", "add", &res_id, "attached", "--task", &task_id]);
    let detail = json_ok(&db, &["show", &res_id, "--json"]);
    assert!(detail["notes"][0]["taskLabel"]
        .as_str()
        .expect("label")
        .starts_with("Task: "));

    run_ok(&db, &["task", "rm", &res_id, &task_id, "-y"]);
    let detail = json_ok(&db, &["show", &res_id, "--json"]);
    assert_eq!(detail["notes"][0]["taskLabel"], "General");

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn completions_generate_for_bash() {
    let root = unique_workspace("reso-dispatch");
    let db = root.join("tracker.sqlite");

    let script = run_ok(&db, &["completions", "bash"]);
    assert!(script.contains("reso"));

    let _ = std::fs::remove_dir_all(root);
}
