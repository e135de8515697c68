//! CLI arg handling tests for the hostwatch client.
use assert_cmd::Command;

#[test]
fn help_prints_usage_and_exits_zero() {
    let out = Command::cargo_bin("hostwatch")
        .unwrap()
        .arg("--help")
        .output()
        .expect("run hostwatch --help");
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("Usage:"), "{text}");
    assert!(text.contains("ws://127.0.0.1:8080/ws"), "{text}");
}

#[test]
fn rejects_non_websocket_url() {
    Command::cargo_bin("hostwatch")
        .unwrap()
        .arg("http://127.0.0.1:8080/ws")
        .assert()
        .failure();
}
