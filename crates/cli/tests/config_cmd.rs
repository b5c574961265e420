use assert_cmd::Command;

#[test]
fn config_command_prints_resolved_settings() {
    let mut cmd = Command::cargo_bin("folio").unwrap();
    let assert = cmd.arg("config").assert().success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("environment:"));
    assert!(stdout.contains("import: every 3600s"));
}
