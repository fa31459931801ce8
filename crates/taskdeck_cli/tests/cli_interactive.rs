use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_store_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskdeck-{nanos}-{name}"))
}

fn run_interactive(dir: &PathBuf, script: &str) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_taskdeck"))
        .env("TASKDECK_STORE_PATH", dir)
        .env("TASKDECK_DISABLE_NOTIFICATIONS", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn taskdeck");

    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(script.as_bytes())
        .unwrap();
    child.wait_with_output().expect("failed to wait for taskdeck")
}

#[test]
fn interactive_add_and_exit() {
    let dir = temp_store_dir("interactive-add");

    let output = run_interactive(&dir, "add \"Buy milk\"\nexit\n");

    let stored = std::fs::read_to_string(dir.join("todos.json")).unwrap();
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));
    let tasks: serde_json::Value = serde_json::from_str(&stored).unwrap();
    assert_eq!(tasks[0]["text"], "Buy milk");
}

#[test]
fn interactive_reports_bad_command_and_continues() {
    let dir = temp_store_dir("interactive-bad");

    let output = run_interactive(&dir, "frobnicate\nadd \"Buy milk\"\nquit\n");
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR:"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));
}

#[test]
fn interactive_unterminated_quote_is_reported() {
    let dir = temp_store_dir("interactive-quote");

    let output = run_interactive(&dir, "add \"Buy milk\nexit\n");
    std::fs::remove_dir_all(&dir).ok();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unterminated quote"));
}
