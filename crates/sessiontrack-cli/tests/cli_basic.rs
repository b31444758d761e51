//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary with HOME pointed at a temp directory and
//! verify outputs and the session store it writes.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_sessiontrack"))
        .args(args)
        .env("HOME", home)
        .env_remove("SESSIONTRACK_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes()).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "advisor.break_interval"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_config_set_persists() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "advisor.session_timeout", "90"], None);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "advisor.session_timeout"], None);
    assert_eq!(stdout.trim(), "90");
}

#[test]
fn test_config_set_rejects_invalid_value() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "advisor.break_interval", "0"], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_track_start_stop_completes_session() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["track", "--session", "s1", "--title", "Docs", "--duration", "60"],
        Some("start\nstatus\nstop\nquit\n"),
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"TimerStarted\""));
    assert!(stdout.contains("\"type\":\"TimerStopped\""));

    let (stdout, _, code) = run_cli(home.path(), &["session", "list", "--json"], None);
    assert_eq!(code, 0);
    let sessions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sessions[0]["id"], "s1");
    assert_eq!(sessions[0]["status"], "Completed");
    assert!(sessions[0]["duration"].as_u64().unwrap() >= 60);
}

#[test]
fn test_session_add_twice_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["session", "add", "s1"], None);
    assert_eq!(code, 0);
    let (_, stderr, code) = run_cli(home.path(), &["session", "add", "s1"], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_track_quit_while_running_keeps_interval() {
    let home = tempfile::tempdir().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_sessiontrack"))
        .args(["track", "--session", "p1", "--duration", "100"])
        .env("HOME", home.path())
        .env_remove("SESSIONTRACK_ENV")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    let mut pipe = child.stdin.take().expect("stdin is piped");
    pipe.write_all(b"start\n").expect("write stdin");
    pipe.flush().expect("flush stdin");
    std::thread::sleep(std::time::Duration::from_secs(3));
    pipe.write_all(b"quit\n").expect("write stdin");
    drop(pipe);

    let output = child.wait_with_output().expect("wait for CLI");
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"type\":\"TimerPaused\""));

    let (stdout, _, code) = run_cli(home.path(), &["session", "list", "--json"], None);
    assert_eq!(code, 0);
    let sessions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(sessions[0]["id"], "p1");
    assert!(sessions[0]["duration"].as_u64().unwrap() > 100);
}
