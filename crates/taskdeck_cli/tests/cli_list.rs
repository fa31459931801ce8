use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_store_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{name}"))
}

fn write_store(dir: &PathBuf, tasks: serde_json::Value) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("todos.json"), serde_json::to_string(&tasks).unwrap()).unwrap();
}

fn taskdeck(dir: &PathBuf, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_taskdeck"))
        .args(args)
        .env("TASKDECK_STORE_PATH", dir)
        .env("TASKDECK_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run taskdeck")
}

fn seeded_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 1756380000002i64,
            "text": "newest",
            "completed": false,
            "priority": "high",
            "createdAt": 1756380000002i64
        },
        {
            "id": 1756380000001i64,
            "text": "done already",
            "completed": true,
            "priority": "low",
            "createdAt": 1756380000001i64,
            "deadline": null,
            "notificationId": null
        }
    ])
}

#[test]
fn list_json_preserves_stored_order() {
    let dir = temp_store_dir("list-json");
    write_store(&dir, seeded_tasks());

    let output = taskdeck(&dir, &["list", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tasks: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 2);
    assert_eq!(tasks[0]["text"], "newest");
    assert_eq!(tasks[1]["text"], "done already");
}

#[test]
fn list_pending_filters_completed_tasks() {
    let dir = temp_store_dir("list-pending");
    write_store(&dir, seeded_tasks());

    let output = taskdeck(&dir, &["list", "--pending", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let tasks: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
    assert_eq!(tasks[0]["text"], "newest");
}

#[test]
fn list_table_shows_task_fields() {
    let dir = temp_store_dir("list-table");
    write_store(&dir, seeded_tasks());

    let output = taskdeck(&dir, &["list"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("newest"));
    assert!(stdout.contains("completed"));
    assert!(stdout.contains("high"));
}

#[test]
fn list_on_missing_store_is_empty() {
    let dir = temp_store_dir("list-missing");

    let output = taskdeck(&dir, &["list", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}

#[test]
fn list_on_corrupt_store_falls_back_to_empty() {
    let dir = temp_store_dir("list-corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("todos.json"), "{ not json ").unwrap();

    let output = taskdeck(&dir, &["list", "--json"]);
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "[]");
}
