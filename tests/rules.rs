#![forbid(unsafe_code)]
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tempfile::tempdir;
use traumarota::model::ConsultantId;
use traumarota::rules::{export_rules_json, OnCallRule, PriorityDuty};
use traumarota::{load_rules_from_file, RoleRef, RuleTable};

#[test]
fn builtin_table_is_valid() {
    let rules = RuleTable::builtin().unwrap();
    assert_eq!(rules.consultants.len(), 20);
    assert_eq!(rules.cycle.length_weeks, 4);
    assert_eq!(rules.rotations.len(), 2);
    assert!(rules.is_known_reason("Annual leave"));
    assert!(!rules.is_known_reason("Holiday"));
    assert_eq!(rules.consultant_by_initials("SG").unwrap().name, "Selina Graham");
    assert_eq!(rules.consultant_names().first(), Some(&"Alasdair Bott"));
    assert!(matches!(
        rules.weekly.friday.on_call,
        OnCallRule::Fixed(RoleRef::WeekendRota)
    ));
}

#[test]
fn export_then_load_gives_same_table() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    let rules = RuleTable::builtin().unwrap();
    export_rules_json(&path, &rules).unwrap();

    let loaded = load_rules_from_file(&path).unwrap();
    assert_eq!(loaded.consultants, rules.consultants);
    assert_eq!(loaded.weekend_rota, rules.weekend_rota);
    assert_eq!(
        serde_json::to_value(&loaded).unwrap(),
        serde_json::to_value(&rules).unwrap()
    );
}

#[test]
fn load_rejects_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rules.json");
    std::fs::write(&path, r#"{"consultants": []}"#).unwrap();
    assert!(load_rules_from_file(&path).is_err());
    assert!(load_rules_from_file(dir.path().join("missing.json")).is_err());
}

#[test]
fn zero_length_cycle_is_rejected() {
    let mut rules = RuleTable::builtin().unwrap();
    rules.cycle.length_weeks = 0;
    assert!(rules.validate().is_err());
}

#[test]
fn cycle_anchor_must_be_monday() {
    let mut rules = RuleTable::builtin().unwrap();
    rules.cycle.anchor = NaiveDate::from_ymd_opt(2025, 8, 12).unwrap();
    assert!(rules.validate().is_err());
}

#[test]
fn duplicate_initials_are_rejected() {
    let mut rules = RuleTable::builtin().unwrap();
    rules.consultants[1].initials = "LH".into();
    assert!(rules.validate().is_err());
}

#[test]
fn unknown_references_are_rejected() {
    let mut rules = RuleTable::builtin().unwrap();
    rules.rotations[0].pattern[2] = ConsultantId::new("nobody");
    assert!(rules.validate().is_err());

    let mut rules = RuleTable::builtin().unwrap();
    rules.weekly.tuesday.flexible.push(RoleRef::Rotation("nope".into()));
    assert!(rules.validate().is_err());

    let mut rules = RuleTable::builtin().unwrap();
    rules.consultants[3]
        .maternity_cover
        .as_mut()
        .unwrap()
        .covered_by = ConsultantId::new("nobody");
    assert!(rules.validate().is_err());
}

#[test]
fn on_call_cycle_weeks_must_fit_cycle() {
    let mut rules = RuleTable::builtin().unwrap();
    let mut table = BTreeMap::new();
    table.insert(5, RoleRef::Consultant(ConsultantId::new("mike-kelly")));
    rules.weekly.monday.on_call = OnCallRule::ByCycleWeek(table);
    assert!(rules.validate().is_err());
}

#[test]
fn priority_duty_must_be_on_weekday() {
    let mut rules = RuleTable::builtin().unwrap();
    rules.priority_duties.push(PriorityDuty {
        day: 5,
        duty: "Theatre 1".into(),
        candidates: vec![ConsultantId::new("mike-kelly")],
    });
    assert!(rules.validate().is_err());

    let mut rules = RuleTable::builtin().unwrap();
    rules.priority_duties[0].candidates.clear();
    assert!(rules.validate().is_err());
}
