//! Drives the `pulse` binary end to end.

use assert_cmd::Command;

fn pulse() -> Command {
    let mut cmd = Command::cargo_bin("pulse").expect("pulse binary");
    cmd.env("PULSE_CONFIG_DIR", std::env::temp_dir().join("pulse-cli-no-config"))
        .env("RUST_LOG", "off");
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn list_prints_every_case() {
    let output = pulse().arg("list").assert().success().get_output().clone();
    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(lines.len(), 36);
    assert_eq!(lines.first(), Some(&"books/create"));
    assert_eq!(lines.last(), Some(&"roles/delete"));
}

#[test]
fn list_filters_by_resource() {
    let output = pulse()
        .args(["list", "--resource", "roles"])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&output);

    assert!(stdout.lines().all(|line| line.starts_with("roles/")));
    assert!(stdout.contains("roles/create-blank-type"));
    assert!(stdout.contains("roles/create-missing-type"));
}

#[test]
fn unknown_resource_is_rejected() {
    let output = pulse()
        .args(["list", "--resource", "authors"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown resource 'authors'"));
}

#[test]
fn run_against_fake_service_passes() {
    let handle = pulse_fake_service::spawn().expect("fake service");
    let output = pulse()
        .args(["run", "--resource", "books", "--base-url", handle.base_url()])
        .assert()
        .success()
        .get_output()
        .clone();
    let stdout = stdout_of(&output);

    assert!(stdout.contains("PASS books/create"));
    assert!(stdout.trim_end().ends_with("18 passed, 0 failed, 18 total"));
    assert_eq!(handle.live_records(), 0);
}

#[test]
fn failing_run_exits_non_zero() {
    let handle = pulse_fake_service::spawn_with_faults(pulse_fake_service::Faults {
        keep_deleted_in_listing: true,
        ..Default::default()
    })
    .expect("fake service");
    let output = pulse()
        .args(["run", "--case", "delete", "--base-url", handle.base_url()])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stdout = stdout_of(&output);

    assert!(stdout.contains("FAIL books/delete"));
    assert!(stdout.contains("FAIL roles/delete"));
}

#[test]
fn filter_matching_nothing_fails() {
    pulse()
        .args(["run", "--case", "no-such-case", "--base-url", "http://127.0.0.1:9"])
        .assert()
        .failure();
}
