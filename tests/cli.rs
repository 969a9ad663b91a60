#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn cli(data: &Path) -> Command {
    let mut cmd = Command::cargo_bin("traumarota-cli").unwrap();
    cmd.arg("--data-dir").arg(data);
    cmd
}

#[test]
fn week_view_from_builtin_rules() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["week", "--number", "1", "--today", "2025-08-13", "--mode", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Week 1 (cycle 1) 11 Aug - 15 Aug"))
        .stdout(predicate::str::contains("Mon 11 Aug: 6/4 surplus"))
        .stdout(predicate::str::contains("  on call: Iain Packham"));
}

#[test]
fn leave_is_stored_and_listed() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args([
            "leave-add",
            "--name",
            "Bill Harries",
            "--start",
            "2025/08/14",
            "--end",
            "2025-08-14",
        ])
        .assert()
        .success();

    cli(dir.path())
        .arg("leave-list")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Bill Harries | 2025-08-14 → 2025-08-14 | Annual leave",
        ));

    // jeudi : Bill Harries tient le bloc, le jour devient critique
    cli(dir.path())
        .args(["check", "--today", "2025-08-11", "--weeks", "1"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("2025-08-14 week 1"))
        .stdout(predicate::str::contains("Bill Harries"));
}

#[test]
fn check_passes_on_quiet_week() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args(["check", "--today", "2025-08-11", "--weeks", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: no critical days"));
}

#[test]
fn override_changes_rotation_holder() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args([
            "override-set",
            "--rotation",
            "packhamClarke",
            "--date",
            "2025-08-13",
            "--name",
            "Damian Clarke",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "packhamClarke 2025-08-11: Damian Clarke (revision 1)",
        ));

    cli(dir.path())
        .args(["week", "--number", "1", "--today", "2025-08-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  on call: Damian Clarke"));

    cli(dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("overrides packhamClarke: 1"))
        .stdout(predicate::str::contains("overrides revision: 1"));
}

#[test]
fn override_rejects_unknown_rotation() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args([
            "override-set",
            "--rotation",
            "nope",
            "--date",
            "2025-08-13",
            "--name",
            "Damian Clarke",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown rotation"));
}

#[test]
fn swap_by_date_and_removal() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args([
            "swap-add",
            "--date",
            "2025-08-19",
            "--today",
            "2025-08-11",
            "--original",
            "Original",
            "--with",
            "Sam Jonas",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("swap 1-1 recorded"));

    cli(dir.path())
        .arg("swap-list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Week 2 day 1: Original → Sam Jonas"));

    cli(dir.path())
        .args(["swap-remove", "--week", "2", "--day", "1"])
        .assert()
        .success();

    cli(dir.path())
        .args(["swap-add", "--week", "0", "--day", "1", "--original", "A", "--with", "B"])
        .assert()
        .failure();
}

#[test]
fn calendar_writes_exports() {
    let dir = tempdir().unwrap();
    let json = dir.path().join("horizon.json");
    let csv = dir.path().join("horizon.csv");
    cli(dir.path())
        .args(["calendar", "--today", "2025-08-11", "--weeks", "3"])
        .arg("--out-json")
        .arg(&json)
        .arg("--out-csv")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("Week  3 (Cycle 3) 25 Aug - 29 Aug"));
    assert!(json.exists());
    assert!(csv.exists());
}

#[test]
fn exchange_swaps_on_call_between_two_days() {
    let dir = tempdir().unwrap();
    cli(dir.path())
        .args([
            "swap-exchange",
            "--date1",
            "2025-08-11",
            "--surgeon1",
            "Iain Packham",
            "--date2",
            "2025-08-12",
            "--surgeon2",
            "Matilda Powell-Bowns",
            "--today",
            "2025-08-11",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("swaps 0-0 and 0-1 recorded"));

    cli(dir.path())
        .args(["week", "--number", "1", "--today", "2025-08-11", "--mode", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Mon 11 Aug: 6/4 surplus\n  on call: Matilda Powell-Bowns\n",
        ))
        .stdout(predicate::str::contains(
            "Tue 12 Aug: 6/4 surplus\n  on call: Iain Packham\n",
        ));

    cli(dir.path())
        .args([
            "swap-exchange",
            "--date1",
            "2025-08-11",
            "--surgeon1",
            "A",
            "--date2",
            "2025-08-11",
            "--surgeon2",
            "B",
            "--today",
            "2025-08-11",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("two different days"));
}
