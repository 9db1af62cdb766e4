use std::process::Command;

fn run_cmd(args: &[&str]) -> std::process::Output {
    let dir = tempfile::tempdir().unwrap();
    Command::new(env!("CARGO_BIN_EXE_luno"))
        .args(args)
        .env("LUNO_DATA_DIR", dir.path())
        .env("LUNO_SOCKET_PATH", dir.path().join("missing.sock"))
        .env("LUNO_ENV_PATH", dir.path().join("missing.env"))
        .output()
        .expect("Failed to run command")
}

#[test]
fn test_invalid_theme_rejected() {
    let output = run_cmd(&["settings", "theme", "purple"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid value"));
}

#[test]
fn test_search_requires_word() {
    let output = run_cmd(&["search"]);
    assert!(!output.status.success());
}

#[test]
fn test_search_without_daemon_reports_connection_error() {
    let output = run_cmd(&["search", "run"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("daemon socket not found"));
}

#[test]
fn test_settings_theme_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_luno"))
            .args(args)
            .env("LUNO_DATA_DIR", dir.path())
            .env("LUNO_ENV_PATH", dir.path().join("missing.env"))
            .output()
            .expect("Failed to run command")
    };

    let output = run(&["settings", "theme", "light"]);
    assert!(output.status.success());

    let output = run(&["settings", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("theme=light"));
    assert!(stdout.contains("shortcut=Ctrl+Shift+L"));
}

#[test]
fn test_history_empty_on_fresh_data_dir() {
    let output = run_cmd(&["history", "list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No lookups yet"));
}
