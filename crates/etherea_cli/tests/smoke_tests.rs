//! CLI smoke tests: verify basic binary behavior.

use std::io::Write;
use std::process::{Command, Stdio};

fn cli_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_etherea"))
}

#[test]
fn test_help_flag() {
    let output = cli_bin().arg("--help").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage"),
        "Expected usage info in --help output"
    );
}

#[test]
fn test_version_flag() {
    let output = cli_bin().arg("--version").output().expect("failed to run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("etherea"),
        "Expected binary name in --version output"
    );
}

#[test]
fn test_stdin_feed_prints_final_vector() {
    let mut child = cli_bin()
        .arg("--config")
        .arg("/tmp/nonexistent_etherea_config_12345.toml")
        .arg("--no-store")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        writeln!(stdin, r#"{{"typing": {{"intensity": 1.0, "variance": 0.0}}}}"#).unwrap();
        writeln!(stdin, "not json").unwrap();
        writeln!(stdin, r#"{{"pattern": {{"repetition": true}}}}"#).unwrap();
    }
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let last = stdout.lines().last().expect("no output");
    let vector: serde_json::Value = serde_json::from_str(last).expect("final line is JSON");
    for key in ["focus", "stress", "energy", "curiosity", "flow"] {
        let v = vector[key].as_f64().expect(key);
        assert!((0.0..=1.0).contains(&v), "{} out of range: {}", key, v);
    }
    assert!(vector["focus"].as_f64().unwrap() > 0.5);
}
