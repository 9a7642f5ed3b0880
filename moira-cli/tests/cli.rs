use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Nothing listens on the discard port; every request fails fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api";

fn moira_dumper() -> Command {
    let mut cmd = Command::cargo_bin("moira-dumper").expect("moira-dumper binary");
    cmd.env_remove("MOIRA_API")
        .env_remove("MOIRA_TIMEOUT_SECS")
        .env_remove("RUST_LOG")
        .args(["--api", UNREACHABLE_API, "--timeout-secs", "1"]);
    cmd
}

#[test]
fn unknown_action_is_a_usage_error() {
    moira_dumper()
        .args(["--action", "sync"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'sync'"));
}

#[test]
fn dump_requires_a_directory() {
    moira_dumper()
        .args(["--action", "dump"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("directory must not be empty"));
}

#[test]
fn apply_requires_file_or_directory() {
    moira_dumper()
        .args(["--action", "apply"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file must not be empty"));
}

#[test]
fn apply_rejects_file_and_directory_together() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("tags.yml");
    fs::write(&file, "type: tag\n").unwrap();

    moira_dumper()
        .args(["--action", "apply", "--file"])
        .arg(&file)
        .arg("--directory")
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not both"));
}

#[test]
fn apply_of_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    moira_dumper()
        .args(["--action", "apply", "--file"])
        .arg(tmp.path().join("missing.yml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn apply_of_directory_as_file_fails() {
    let tmp = TempDir::new().unwrap();
    moira_dumper()
        .args(["--action", "apply", "--file"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a file"));
}

#[test]
fn unreachable_api_fails_dump_without_creating_output() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("dump");

    moira_dumper()
        .args(["--action", "dump", "--directory"])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("dump to"));
    assert!(!out.exists(), "nothing is written when a fetch fails");
}

#[test]
fn tag_file_applies_without_contacting_the_api() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("tags.yml");
    fs::write(&file, "type: tag\nlist:\n- db\n").unwrap();

    moira_dumper()
        .args(["--action", "apply", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Tags are created automatically together with triggers",
        ));
}

#[test]
fn unsupported_document_type_is_skipped_with_a_warning() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("dashboard.yml");
    fs::write(&file, "type: dashboard\nname: overview\n").unwrap();

    moira_dumper()
        .args(["--action", "apply", "--file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("unsupported type 'dashboard'"));
}

#[test]
fn directory_apply_reports_each_file_and_fails_at_the_end() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a-tags.yml"), "type: tag\nlist:\n- db\n").unwrap();
    fs::write(
        tmp.path().join("b-trigger.yml"),
        "type: trigger\nname: cpu-high\ntrigger_type: rising\n",
    )
    .unwrap();
    fs::write(tmp.path().join("c-other.yml"), "type: dashboard\n").unwrap();

    moira_dumper()
        .args(["--action", "apply", "--directory"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stdout(
            predicate::str::contains("Tags are created automatically")
                .and(predicate::str::contains("b-trigger.yml"))
                .and(predicate::str::contains("unsupported type 'dashboard'")),
        )
        .stderr(predicate::str::contains("1 of 3 files failed to apply"));
}

#[test]
fn single_dash_long_flags_are_accepted() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("tags.yml");
    fs::write(&file, "type: tag\nlist:\n- db\n").unwrap();

    moira_dumper()
        .args(["-action", "apply", "-file"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Tags are created automatically together with triggers",
        ));
}

#[test]
fn help_lists_the_flags() {
    Command::cargo_bin("moira-dumper")
        .expect("moira-dumper binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--api")
                .and(predicate::str::contains("--action"))
                .and(predicate::str::contains("--directory"))
                .and(predicate::str::contains("--dry-run")),
        );
}
