#![forbid(unsafe_code)]
use chrono::NaiveDate;
use std::fs;
use tempfile::tempdir;
use traumarota::io::{export_horizon_csv, export_horizon_json, import_leave_csv, parse_date};
use traumarota::model::Ledgers;
use traumarota::{Planner, PlannerOptions, RuleTable, WeekStaffing};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn parse_date_accepts_slashes() {
    assert_eq!(parse_date("2025-08-11").unwrap(), d(2025, 8, 11));
    assert_eq!(parse_date(" 2025/08/11 ").unwrap(), d(2025, 8, 11));
    assert!(parse_date("11/08/2025").is_err());
    assert!(parse_date("2025-02-30").is_err());
}

#[test]
fn import_leave_from_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("leave.csv");
    fs::write(
        &path,
        "name,start_date,end_date,reason\n\
         Mike Kelly,2025-08-12,2025-08-14,Study leave\n\
         Bill Harries,2025/09/01,2025/09/05,\n",
    )
    .unwrap();

    let entries = import_leave_csv(&path).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "Mike Kelly");
    assert_eq!(entries[0].reason, "Study leave");
    assert_eq!(entries[1].start_date, d(2025, 9, 1));
    assert_eq!(entries[1].reason, "Leave");
}

#[test]
fn import_rejects_bad_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("leave.csv");
    fs::write(&path, "name,start_date,end_date\n ,2025-08-12,2025-08-14\n").unwrap();
    assert!(import_leave_csv(&path).is_err());

    fs::write(&path, "name,start_date,end_date\nMike Kelly,soon,2025-08-14\n").unwrap();
    assert!(import_leave_csv(&path).is_err());
}

#[test]
fn export_horizon_files() {
    let rules = RuleTable::builtin().unwrap();
    let ledgers = Ledgers::default();
    let opts = PlannerOptions {
        horizon_weeks: 2,
        ..PlannerOptions::default()
    };
    let planner = Planner::new(&rules, &ledgers, opts).unwrap();
    let weeks = planner.build_horizon(d(2025, 8, 11));

    let dir = tempdir().unwrap();
    let json_path = dir.path().join("horizon.json");
    let csv_path = dir.path().join("horizon.csv");
    export_horizon_json(&json_path, &weeks).unwrap();
    export_horizon_csv(&csv_path, &weeks).unwrap();

    let back: Vec<WeekStaffing> = serde_json::from_slice(&fs::read(&json_path).unwrap()).unwrap();
    assert_eq!(back, weeks);

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 11);
    assert_eq!(
        lines[0],
        "week,date,cycle_week,on_call,available,present,capacity_pct,band,status,on_leave"
    );
    assert_eq!(lines[1], "1,2025-08-11,1,Iain Packham,6,6,30,critical,surplus,");
    assert!(lines[6].starts_with("2,2025-08-18,2,"));
}
