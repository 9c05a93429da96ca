use std::path::PathBuf;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("planboard-{nanos}-{file_name}"))
}

fn write_snapshot(file_name: &str) -> PathBuf {
    let path = temp_path(file_name);
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {"id": 3, "name": "Report", "month": "2024-09", "status": "IN_PROGRESS",
             "progress": 60, "currentEndDate": "2024-09-10", "currentDelay": 5, "extensions": 2,
             "assignee": {"id": "u1", "name": "Finance"}, "description": "Quarterly figures"},
            {"_id": "31", "name": "Report", "month": "2024-09", "status": "PENDING",
             "parentTask": {"id": 3}, "currentDeadline": "2024-09-17",
             "executors": [{"id": 7, "name": "An"}]},
            {"id": 32, "name": "Report", "month": "2024-09", "status": "COMPLETED",
             "parentTask": 3, "currentEndDate": "2024-09-12"}
        ],
        "actions": [
            {"id": 10, "taskId": 3, "name": "Draft", "status": "COMPLETED", "progress": 100,
             "executor": {"id": 7, "name": "An"}, "deadline": "2024-09-05"},
            {"id": 11, "task": 3, "name": "Review", "status": "IN_PROGRESS", "progress": 0.5,
             "executor": {"id": 8, "name": "Binh"}},
            {"id": 12, "taskId": 31, "name": "Collect", "executor": {"id": 7, "name": "An"}}
        ]
    });
    std::fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
    path
}

fn run(snapshot: &PathBuf, args: &[&str]) -> Output {
    let exe = env!("CARGO_BIN_EXE_planboard");
    Command::new(exe)
        .args(args)
        .env("PLANBOARD_SNAPSHOT_PATH", snapshot)
        .env("PLANBOARD_CONFIG_PATH", temp_path("no-config.json"))
        .env("PLANBOARD_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run planboard")
}

#[test]
fn show_plain_text_lists_actions_and_children() {
    let snapshot = write_snapshot("cli-show.json");
    let output = run(&snapshot, &["show", "3"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Report (3)"));
    assert!(stdout.contains("Progress: 60%"));
    assert!(stdout.contains("Assignee: Finance"));
    assert!(stdout.contains("Due: 2024-09-10"));
    assert!(stdout.contains("Delay: 5 days, extended 2 times"));
    assert!(stdout.contains("Description: Quarterly figures"));
    assert!(stdout.contains("Actions: 2 (1 completed, 1 in progress, 0 pending, average 75.0%)"));
    assert!(stdout.contains("Draft"));
    assert!(stdout.contains("Delegated tasks:"));
    assert!(stdout.contains("31"));
}

#[test]
fn show_json_has_summary() {
    let snapshot = write_snapshot("cli-show-json.json");
    let output = run(&snapshot, &["show", " 3 ", "--json"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["task"]["id"], "3");
    assert_eq!(detail["summary"]["completion_rate"], 50.0);
    assert_eq!(detail["actions"].as_array().unwrap().len(), 2);
    assert_eq!(detail["children"].as_array().unwrap().len(), 2);
    assert_eq!(detail["children"][0]["currentEndDate"], "2024-09-17");
}

#[test]
fn show_missing_task_is_not_found() {
    let snapshot = write_snapshot("cli-show-missing.json");
    let output = run(&snapshot, &["show", "99"]);
    std::fs::remove_file(&snapshot).ok();

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: not_found - task 99 not found"));
}

#[test]
fn actions_filters_by_executor() {
    let snapshot = write_snapshot("cli-actions.json");
    let output = run(&snapshot, &["actions", "--executor", "7", "--json"]);
    let none = run(&snapshot, &["actions", "--executor", "42"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let actions: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = actions
        .as_array()
        .unwrap()
        .iter()
        .map(|action| action["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Draft", "Collect"]);

    assert!(none.status.success());
    assert!(String::from_utf8_lossy(&none.stdout).contains("No actions for 42."));
}

#[test]
fn notify_reports_deadline_risks_only() {
    let snapshot = write_snapshot("cli-notify.json");
    let output = run(&snapshot, &["notify", "--today", "2024-09-15", "--json"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["notified"], serde_json::json!(["3", "31"]));
    assert_eq!(report["failures"], serde_json::json!([]));
}

#[test]
fn notify_plain_text_counts_notifications() {
    let snapshot = write_snapshot("cli-notify-plain.json");
    let output = run(&snapshot, &["notify", "--today", "2024-09-15"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Notified: Report (3) overdue by 5 days"));
    assert!(stdout.contains("Notified: Report (31) approaching deadline in 2 days"));
    assert!(stdout.contains("2 notifications sent"));
}

#[test]
fn notify_without_wait_exits_after_reporting() {
    let snapshot = write_snapshot("cli-notify-nowait.json");
    let output = run(&snapshot, &["notify", "--today", "2024-09-15", "--wait", "0", "--json"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["notified"], serde_json::json!(["3", "31"]));
}

#[test]
fn snapshot_with_null_names_and_float_counts_loads() {
    let snapshot = temp_path("cli-lenient.json");
    std::fs::write(
        &snapshot,
        r#"[{"id": 1, "name": null, "month": "2024-09", "currentDelay": 2.0, "extensions": 1.0,
             "executors": [{"id": 7, "name": null}]},
            {"id": 2, "name": "Audit", "month": "2024-09"}]"#,
    )
    .unwrap();
    let output = run(&snapshot, &["show", "1", "--json"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["task"]["name"], "");
    assert_eq!(detail["task"]["currentDelay"], 2);
    assert_eq!(detail["task"]["extensions"], 1);
}

#[test]
fn bare_task_array_snapshot_is_accepted() {
    let snapshot = temp_path("cli-bare.json");
    std::fs::write(
        &snapshot,
        r#"[{"id": 1, "name": "Audit", "month": "2024-09", "status": "Hoàn thành"}]"#,
    )
    .unwrap();
    let output = run(&snapshot, &["show", "1", "--json"]);
    std::fs::remove_file(&snapshot).ok();

    assert!(output.status.success());
    let detail: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(detail["task"]["status"], "COMPLETED");
    assert_eq!(detail["summary"]["total"], 0);
}

#[test]
fn unknown_command_is_invalid_input() {
    let snapshot = temp_path("cli-unknown.json");
    let output = run(&snapshot, &["archive"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("ERROR: invalid_input - "));
}
